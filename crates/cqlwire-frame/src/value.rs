//! Column types and typed cell values of protocol v1.

use std::fmt;
use std::net::IpAddr;

use bytes::Bytes;

use crate::error::DecodeError;
use crate::primitives::{ip_addr, read_raw, read_short, read_short_bytes, read_string, DecodeResult};

/// A column type as announced in result metadata (`[option]`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnType {
    /// Server-side class name of a custom type.
    Custom(String),
    Ascii,
    Bigint,
    Blob,
    Boolean,
    Counter,
    Decimal,
    Double,
    Float,
    Int,
    Text,
    Timestamp,
    Uuid,
    Varchar,
    Varint,
    Timeuuid,
    Inet,
    List(Box<ColumnType>),
    Map(Box<ColumnType>, Box<ColumnType>),
    Set(Box<ColumnType>),
}

impl ColumnType {
    /// Read an `[option]`: a `[short]` id followed by its type-specific value.
    pub fn decode(buf: &mut Bytes) -> DecodeResult<Self> {
        let id = read_short(buf)?;
        let column_type = match id {
            0x0000 => ColumnType::Custom(read_string(buf)?),
            0x0001 => ColumnType::Ascii,
            0x0002 => ColumnType::Bigint,
            0x0003 => ColumnType::Blob,
            0x0004 => ColumnType::Boolean,
            0x0005 => ColumnType::Counter,
            0x0006 => ColumnType::Decimal,
            0x0007 => ColumnType::Double,
            0x0008 => ColumnType::Float,
            0x0009 => ColumnType::Int,
            0x000a => ColumnType::Text,
            0x000b => ColumnType::Timestamp,
            0x000c => ColumnType::Uuid,
            0x000d => ColumnType::Varchar,
            0x000e => ColumnType::Varint,
            0x000f => ColumnType::Timeuuid,
            0x0010 => ColumnType::Inet,
            0x0020 => ColumnType::List(Box::new(Self::decode(buf)?)),
            0x0021 => {
                let key = Self::decode(buf)?;
                let value = Self::decode(buf)?;
                ColumnType::Map(Box::new(key), Box::new(value))
            }
            0x0022 => ColumnType::Set(Box::new(Self::decode(buf)?)),
            other => {
                return Err(DecodeError::UnknownCode {
                    what: "column type",
                    value: i32::from(other),
                })
            }
        };
        Ok(column_type)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Custom(class) => write!(f, "'{class}'"),
            ColumnType::Ascii => f.write_str("ascii"),
            ColumnType::Bigint => f.write_str("bigint"),
            ColumnType::Blob => f.write_str("blob"),
            ColumnType::Boolean => f.write_str("boolean"),
            ColumnType::Counter => f.write_str("counter"),
            ColumnType::Decimal => f.write_str("decimal"),
            ColumnType::Double => f.write_str("double"),
            ColumnType::Float => f.write_str("float"),
            ColumnType::Int => f.write_str("int"),
            ColumnType::Text => f.write_str("text"),
            ColumnType::Timestamp => f.write_str("timestamp"),
            ColumnType::Uuid => f.write_str("uuid"),
            ColumnType::Varchar => f.write_str("varchar"),
            ColumnType::Varint => f.write_str("varint"),
            ColumnType::Timeuuid => f.write_str("timeuuid"),
            ColumnType::Inet => f.write_str("inet"),
            ColumnType::List(inner) => write!(f, "list<{inner}>"),
            ColumnType::Map(key, value) => write!(f, "map<{key}, {value}>"),
            ColumnType::Set(inner) => write!(f, "set<{inner}>"),
        }
    }
}

/// A decoded, non-null cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    BigInt(i64),
    Blob(Bytes),
    Boolean(bool),
    /// Unscaled two's-complement big-endian integer with its scale.
    Decimal { scale: i32, unscaled: Bytes },
    Double(f64),
    Float(f32),
    Int(i32),
    /// Milliseconds since the Unix epoch.
    Timestamp(i64),
    Uuid(u128),
    /// Two's-complement big-endian integer of arbitrary width.
    Varint(Bytes),
    Inet(IpAddr),
    List(Vec<Value>),
    Set(Vec<Value>),
    Map(Vec<(Value, Value)>),
    Custom(Bytes),
}

impl Value {
    /// Decode the raw bytes of one cell according to its column type.
    pub fn decode(column_type: &ColumnType, raw: Bytes) -> DecodeResult<Self> {
        let value = match column_type {
            ColumnType::Ascii | ColumnType::Text | ColumnType::Varchar => Value::Text(
                String::from_utf8(raw.to_vec())
                    .map_err(|_| DecodeError::InvalidUtf8 { what: "text cell" })?,
            ),
            ColumnType::Bigint | ColumnType::Counter => Value::BigInt(i64::from_be_bytes(
                fixed(&raw, column_type)?,
            )),
            ColumnType::Timestamp => Value::Timestamp(i64::from_be_bytes(fixed(&raw, column_type)?)),
            ColumnType::Blob => Value::Blob(raw),
            ColumnType::Boolean => {
                let [byte] = fixed(&raw, column_type)?;
                Value::Boolean(byte != 0)
            }
            ColumnType::Decimal => {
                let mut raw = raw;
                let scale = read_raw(&mut raw, 4, "decimal scale")?;
                Value::Decimal {
                    scale: i32::from_be_bytes([scale[0], scale[1], scale[2], scale[3]]),
                    unscaled: raw,
                }
            }
            ColumnType::Double => Value::Double(f64::from_be_bytes(fixed(&raw, column_type)?)),
            ColumnType::Float => Value::Float(f32::from_be_bytes(fixed(&raw, column_type)?)),
            ColumnType::Int => Value::Int(i32::from_be_bytes(fixed(&raw, column_type)?)),
            ColumnType::Uuid | ColumnType::Timeuuid => {
                Value::Uuid(u128::from_be_bytes(fixed(&raw, column_type)?))
            }
            ColumnType::Varint => Value::Varint(raw),
            ColumnType::Inet => Value::Inet(ip_addr(&raw)?),
            ColumnType::List(inner) => Value::List(decode_elements(inner, raw)?),
            ColumnType::Set(inner) => Value::Set(decode_elements(inner, raw)?),
            ColumnType::Map(key_type, value_type) => {
                let mut raw = raw;
                let count = read_short(&mut raw)? as usize;
                let mut entries = Vec::with_capacity(count);
                for _ in 0..count {
                    let key = Self::decode(key_type, read_short_bytes(&mut raw)?)?;
                    let value = Self::decode(value_type, read_short_bytes(&mut raw)?)?;
                    entries.push((key, value));
                }
                Value::Map(entries)
            }
            ColumnType::Custom(_) => Value::Custom(raw),
        };
        Ok(value)
    }
}

// Collections are a [short] count of [short bytes] elements in v1.
fn decode_elements(element_type: &ColumnType, mut raw: Bytes) -> DecodeResult<Vec<Value>> {
    let count = read_short(&mut raw)? as usize;
    (0..count)
        .map(|_| Value::decode(element_type, read_short_bytes(&mut raw)?))
        .collect()
}

fn fixed<const N: usize>(raw: &[u8], column_type: &ColumnType) -> DecodeResult<[u8; N]> {
    raw.try_into().map_err(|_| {
        DecodeError::Malformed(format!(
            "{column_type} cell must be {N} bytes, got {}",
            raw.len()
        ))
    })
}
