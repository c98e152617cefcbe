//! Decoded response bodies and their v1 decoders.

use std::collections::BTreeMap;
use std::net::SocketAddr;

use bytes::Bytes;

use crate::consistency::Consistency;
use crate::error::DecodeError;
use crate::primitives::{
    read_byte, read_bytes, read_consistency, read_inet, read_int, read_length, read_short_bytes,
    read_string, read_string_multimap, DecodeResult,
};
use crate::value::{ColumnType, Value};

/// A fully decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Error(ErrorResponse),
    Ready,
    /// Authenticator class name the server requires credentials for.
    Authenticate(String),
    /// Options the server supports (`CQL_VERSION`, `COMPRESSION`, ...).
    Supported(BTreeMap<String, Vec<String>>),
    Result(ResultResponse),
    Event(Event),
}

impl Response {
    /// Short human-readable kind, e.g. `RESULT/ROWS`.
    pub fn kind(&self) -> &'static str {
        match self {
            Response::Error(_) => "ERROR",
            Response::Ready => "READY",
            Response::Authenticate(_) => "AUTHENTICATE",
            Response::Supported(_) => "SUPPORTED",
            Response::Result(ResultResponse::Void) => "RESULT/VOID",
            Response::Result(ResultResponse::Rows(_)) => "RESULT/ROWS",
            Response::Result(ResultResponse::SetKeyspace(_)) => "RESULT/SET_KEYSPACE",
            Response::Result(ResultResponse::Prepared(_)) => "RESULT/PREPARED",
            Response::Result(ResultResponse::SchemaChange(_)) => "RESULT/SCHEMA_CHANGE",
            Response::Event(_) => "EVENT",
        }
    }
}

/// Server-side error with its protocol code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    pub code: i32,
    pub message: String,
    pub details: Option<ErrorDetails>,
}

impl ErrorResponse {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }
}

/// Extra fields carried by some error codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorDetails {
    Unavailable {
        consistency: Consistency,
        required: i32,
        alive: i32,
    },
    WriteTimeout {
        consistency: Consistency,
        received: i32,
        block_for: i32,
        write_type: String,
    },
    ReadTimeout {
        consistency: Consistency,
        received: i32,
        block_for: i32,
        data_present: bool,
    },
    AlreadyExists {
        keyspace: String,
        table: String,
    },
    Unprepared {
        id: Bytes,
    },
}

pub const UNAVAILABLE: i32 = 0x1000;
pub const WRITE_TIMEOUT: i32 = 0x1100;
pub const READ_TIMEOUT: i32 = 0x1200;
pub const ALREADY_EXISTS: i32 = 0x2400;
pub const UNPREPARED: i32 = 0x2500;

/// Body of a RESULT response, refined by its `[int]` kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultResponse {
    Void,
    Rows(Rows),
    SetKeyspace(String),
    Prepared(Prepared),
    SchemaChange(SchemaChange),
}

/// Rows and the metadata describing their columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Rows {
    pub metadata: ResultMetadata,
    pub rows: Vec<Row>,
}

/// One row of cells in column order; `None` is a null cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub values: Vec<Option<Value>>,
}

impl Row {
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index).and_then(Option::as_ref)
    }
}

/// Column specifications of a rows or prepared result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultMetadata {
    pub columns: Vec<ColumnSpec>,
}

impl ResultMetadata {
    /// Position of the column named `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.name == name)
    }

    /// Specification of the column named `name`.
    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|column| column.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub keyspace: String,
    pub table: String,
    pub name: String,
    pub column_type: ColumnType,
}

impl ColumnSpec {
    pub fn new(
        keyspace: impl Into<String>,
        table: impl Into<String>,
        name: impl Into<String>,
        column_type: ColumnType,
    ) -> Self {
        Self {
            keyspace: keyspace.into(),
            table: table.into(),
            name: name.into(),
            column_type,
        }
    }
}

/// A prepared statement id and its bound-variable metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prepared {
    pub id: Bytes,
    pub metadata: ResultMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaChange {
    /// `CREATED`, `UPDATED` or `DROPPED`.
    pub change: String,
    pub keyspace: String,
    /// Empty when the change concerns the keyspace itself.
    pub table: String,
}

/// A server-pushed event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    TopologyChange { change: String, node: SocketAddr },
    StatusChange { change: String, node: SocketAddr },
    SchemaChange(SchemaChange),
}

const RESULT_VOID: i32 = 0x0001;
const RESULT_ROWS: i32 = 0x0002;
const RESULT_SET_KEYSPACE: i32 = 0x0003;
const RESULT_PREPARED: i32 = 0x0004;
const RESULT_SCHEMA_CHANGE: i32 = 0x0005;

const GLOBAL_TABLES_SPEC: i32 = 0x0001;

pub(crate) fn decode_error(buf: &mut Bytes) -> DecodeResult<ErrorResponse> {
    let code = read_int(buf)?;
    let message = read_string(buf)?;
    let details = match code {
        UNAVAILABLE => Some(ErrorDetails::Unavailable {
            consistency: read_consistency(buf)?,
            required: read_int(buf)?,
            alive: read_int(buf)?,
        }),
        WRITE_TIMEOUT => Some(ErrorDetails::WriteTimeout {
            consistency: read_consistency(buf)?,
            received: read_int(buf)?,
            block_for: read_int(buf)?,
            write_type: read_string(buf)?,
        }),
        READ_TIMEOUT => Some(ErrorDetails::ReadTimeout {
            consistency: read_consistency(buf)?,
            received: read_int(buf)?,
            block_for: read_int(buf)?,
            data_present: read_byte(buf)? != 0,
        }),
        ALREADY_EXISTS => Some(ErrorDetails::AlreadyExists {
            keyspace: read_string(buf)?,
            table: read_string(buf)?,
        }),
        UNPREPARED => Some(ErrorDetails::Unprepared {
            id: read_short_bytes(buf)?,
        }),
        _ => None,
    };
    Ok(ErrorResponse {
        code,
        message,
        details,
    })
}

pub(crate) fn decode_authenticate(buf: &mut Bytes) -> DecodeResult<String> {
    read_string(buf)
}

pub(crate) fn decode_supported(buf: &mut Bytes) -> DecodeResult<BTreeMap<String, Vec<String>>> {
    read_string_multimap(buf)
}

pub(crate) fn decode_result(buf: &mut Bytes) -> DecodeResult<ResultResponse> {
    let kind = read_int(buf)?;
    let result = match kind {
        RESULT_VOID => ResultResponse::Void,
        RESULT_ROWS => ResultResponse::Rows(decode_rows(buf)?),
        RESULT_SET_KEYSPACE => ResultResponse::SetKeyspace(read_string(buf)?),
        RESULT_PREPARED => ResultResponse::Prepared(Prepared {
            id: read_short_bytes(buf)?,
            metadata: decode_metadata(buf)?,
        }),
        RESULT_SCHEMA_CHANGE => ResultResponse::SchemaChange(decode_schema_change(buf)?),
        other => {
            return Err(DecodeError::UnknownCode {
                what: "result kind",
                value: other,
            })
        }
    };
    Ok(result)
}

pub(crate) fn decode_event(buf: &mut Bytes) -> DecodeResult<Event> {
    let event_type = read_string(buf)?;
    let event = match event_type.as_str() {
        "TOPOLOGY_CHANGE" => Event::TopologyChange {
            change: read_string(buf)?,
            node: read_inet(buf)?,
        },
        "STATUS_CHANGE" => Event::StatusChange {
            change: read_string(buf)?,
            node: read_inet(buf)?,
        },
        "SCHEMA_CHANGE" => Event::SchemaChange(decode_schema_change(buf)?),
        other => {
            return Err(DecodeError::Malformed(format!(
                "unknown event type {other:?}"
            )))
        }
    };
    Ok(event)
}

fn decode_schema_change(buf: &mut Bytes) -> DecodeResult<SchemaChange> {
    Ok(SchemaChange {
        change: read_string(buf)?,
        keyspace: read_string(buf)?,
        table: read_string(buf)?,
    })
}

fn decode_metadata(buf: &mut Bytes) -> DecodeResult<ResultMetadata> {
    let flags = read_int(buf)?;
    let count = read_length(buf, "column count")?;
    let global = if flags & GLOBAL_TABLES_SPEC != 0 {
        Some((read_string(buf)?, read_string(buf)?))
    } else {
        None
    };

    let mut columns = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        let (keyspace, table) = match &global {
            Some((keyspace, table)) => (keyspace.clone(), table.clone()),
            None => (read_string(buf)?, read_string(buf)?),
        };
        let name = read_string(buf)?;
        let column_type = ColumnType::decode(buf)?;
        columns.push(ColumnSpec {
            keyspace,
            table,
            name,
            column_type,
        });
    }
    Ok(ResultMetadata { columns })
}

fn decode_rows(buf: &mut Bytes) -> DecodeResult<Rows> {
    let metadata = decode_metadata(buf)?;
    let count = read_length(buf, "row count")?;
    let mut rows = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        let values = metadata
            .columns
            .iter()
            .map(|column| {
                read_bytes(buf)?
                    .map(|raw| Value::decode(&column.column_type, raw))
                    .transpose()
            })
            .collect::<DecodeResult<Vec<_>>>()?;
        rows.push(Row { values });
    }
    Ok(Rows { metadata, rows })
}
