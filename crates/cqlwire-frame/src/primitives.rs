//! Readers for the protocol's body notation (`[int]`, `[string]`, `[bytes]`, ...).
//!
//! Every reader checks the remaining length first and fails with
//! [`DecodeError::Truncated`] instead of panicking.

use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use bytes::{Buf, Bytes};

use crate::consistency::Consistency;
use crate::error::DecodeError;

pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

fn ensure(buf: &Bytes, needed: usize, what: &'static str) -> DecodeResult<()> {
    if buf.remaining() < needed {
        return Err(DecodeError::Truncated {
            what,
            needed,
            available: buf.remaining(),
        });
    }
    Ok(())
}

pub fn read_byte(buf: &mut Bytes) -> DecodeResult<u8> {
    ensure(buf, 1, "byte")?;
    Ok(buf.get_u8())
}

pub fn read_short(buf: &mut Bytes) -> DecodeResult<u16> {
    ensure(buf, 2, "short")?;
    Ok(buf.get_u16())
}

pub fn read_int(buf: &mut Bytes) -> DecodeResult<i32> {
    ensure(buf, 4, "int")?;
    Ok(buf.get_i32())
}

/// Split `len` raw bytes off the front.
pub fn read_raw(buf: &mut Bytes, len: usize, what: &'static str) -> DecodeResult<Bytes> {
    ensure(buf, len, what)?;
    Ok(buf.split_to(len))
}

fn utf8(raw: Bytes, what: &'static str) -> DecodeResult<String> {
    String::from_utf8(raw.to_vec()).map_err(|_| DecodeError::InvalidUtf8 { what })
}

/// `[string]`: a `[short]` length followed by UTF-8 bytes.
pub fn read_string(buf: &mut Bytes) -> DecodeResult<String> {
    let len = read_short(buf)? as usize;
    let raw = read_raw(buf, len, "string")?;
    utf8(raw, "string")
}

/// `[bytes]`: an `[int]` length followed by that many bytes; negative means null.
pub fn read_bytes(buf: &mut Bytes) -> DecodeResult<Option<Bytes>> {
    let len = read_int(buf)?;
    if len < 0 {
        return Ok(None);
    }
    read_raw(buf, len as usize, "bytes").map(Some)
}

/// `[short bytes]`: a `[short]` length followed by that many bytes.
pub fn read_short_bytes(buf: &mut Bytes) -> DecodeResult<Bytes> {
    let len = read_short(buf)? as usize;
    read_raw(buf, len, "short bytes")
}

/// `[string list]`: a `[short]` count followed by that many `[string]`s.
pub fn read_string_list(buf: &mut Bytes) -> DecodeResult<Vec<String>> {
    let count = read_short(buf)? as usize;
    (0..count).map(|_| read_string(buf)).collect()
}

/// `[string multimap]`: a `[short]` count of `[string]` keys, each with a `[string list]`.
pub fn read_string_multimap(buf: &mut Bytes) -> DecodeResult<BTreeMap<String, Vec<String>>> {
    let count = read_short(buf)? as usize;
    let mut map = BTreeMap::new();
    for _ in 0..count {
        let key = read_string(buf)?;
        let values = read_string_list(buf)?;
        map.insert(key, values);
    }
    Ok(map)
}

/// `[consistency]`: a `[short]` level code.
pub fn read_consistency(buf: &mut Bytes) -> DecodeResult<Consistency> {
    Consistency::try_from(read_short(buf)?)
}

/// Raw IPv4 or IPv6 address bytes of exactly 4 or 16 bytes.
pub fn ip_addr(raw: &[u8]) -> DecodeResult<IpAddr> {
    match raw.len() {
        4 => Ok(IpAddr::V4(Ipv4Addr::new(raw[0], raw[1], raw[2], raw[3]))),
        16 => {
            let mut octets = [0u8; 16];
            octets.copy_from_slice(raw);
            Ok(IpAddr::V6(Ipv6Addr::from(octets)))
        }
        n => Err(DecodeError::Malformed(format!(
            "inet address must be 4 or 16 bytes, got {n}"
        ))),
    }
}

/// `[inet]`: a `[byte]` address size, the address, then an `[int]` port.
pub fn read_inet(buf: &mut Bytes) -> DecodeResult<SocketAddr> {
    let size = read_byte(buf)? as usize;
    let raw = read_raw(buf, size, "inet address")?;
    let ip = ip_addr(&raw)?;
    let port = read_int(buf)?;
    let port = u16::try_from(port)
        .map_err(|_| DecodeError::Malformed(format!("inet port {port} out of range")))?;
    Ok(SocketAddr::new(ip, port))
}

/// An `[int]` that must be a non-negative count or length.
pub fn read_length(buf: &mut Bytes, what: &'static str) -> DecodeResult<usize> {
    let value = read_int(buf)?;
    usize::try_from(value)
        .map_err(|_| DecodeError::Malformed(format!("negative {what} {value}")))
}

#[cfg(test)]
mod tests {
    use bytes::{BufMut, BytesMut};

    use super::*;

    #[test]
    fn reads_string() {
        let mut raw = BytesMut::new();
        raw.put_u16(5);
        raw.put_slice(b"hello");
        raw.put_u8(0xff);
        let mut buf = raw.freeze();

        assert_eq!(read_string(&mut buf).unwrap(), "hello");
        assert_eq!(buf.len(), 1);
    }

    #[test]
    fn truncated_string_reports_lengths() {
        let mut buf = Bytes::from_static(&[0x00, 0x05, b'h', b'i']);
        let err = read_string(&mut buf).unwrap_err();
        assert_eq!(
            err,
            DecodeError::Truncated {
                what: "string",
                needed: 5,
                available: 2
            }
        );
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let mut buf = Bytes::from_static(&[0x00, 0x02, 0xc3, 0x28]);
        assert_eq!(
            read_string(&mut buf).unwrap_err(),
            DecodeError::InvalidUtf8 { what: "string" }
        );
    }

    #[test]
    fn negative_bytes_length_is_null() {
        let mut buf = Bytes::from_static(&[0xff, 0xff, 0xff, 0xff]);
        assert_eq!(read_bytes(&mut buf).unwrap(), None);
        assert!(buf.is_empty());
    }

    #[test]
    fn reads_string_multimap() {
        let mut raw = BytesMut::new();
        raw.put_u16(1);
        raw.put_u16(11);
        raw.put_slice(b"CQL_VERSION");
        raw.put_u16(2);
        raw.put_u16(5);
        raw.put_slice(b"3.0.0");
        raw.put_u16(5);
        raw.put_slice(b"3.1.0");
        let mut buf = raw.freeze();

        let map = read_string_multimap(&mut buf).unwrap();
        assert_eq!(map["CQL_VERSION"], vec!["3.0.0", "3.1.0"]);
    }

    #[test]
    fn reads_ipv4_inet() {
        let mut buf = Bytes::from_static(&[4, 10, 0, 0, 1, 0x00, 0x00, 0x23, 0x52]);
        let addr = read_inet(&mut buf).unwrap();
        assert_eq!(addr, "10.0.0.1:9042".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn rejects_odd_inet_size() {
        let mut buf = Bytes::from_static(&[3, 1, 2, 3, 0, 0, 0, 0]);
        assert!(matches!(
            read_inet(&mut buf),
            Err(DecodeError::Malformed(_))
        ));
    }

    #[test]
    fn reads_consistency() {
        let mut buf = Bytes::from_static(&[0x00, 0x04]);
        assert_eq!(read_consistency(&mut buf).unwrap(), Consistency::Quorum);

        let mut buf = Bytes::from_static(&[0x00, 0x42]);
        assert!(matches!(
            read_consistency(&mut buf),
            Err(DecodeError::UnknownCode { what: "consistency", value: 0x42 })
        ));
    }
}
