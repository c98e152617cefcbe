use bytes::{Buf, BufMut, BytesMut};
use tracing::trace;

use crate::config::FrameConfig;
use crate::error::{FrameError, Result};
use crate::opcode::Opcode;

/// Fixed header: version (1) + flags (1) + stream (1) + opcode (1) + length (4) = 8 bytes.
pub const HEADER_LENGTH: usize = 8;

/// Direction bit of the version byte; set on frames sent by the server.
pub const RESPONSE_DIRECTION: u8 = 0x80;

const VERSION_MASK: u8 = 0x7f;

/// A decoded response frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Protocol version with the direction bit stripped.
    pub protocol_version: u8,
    /// Raw flags byte. Stored, not interpreted.
    pub flags: u8,
    /// Correlates the response with the request that produced it.
    pub stream_id: u8,
    /// Selects the body decoder.
    pub opcode: Opcode,
    /// Exact number of body bytes following the header.
    pub body_length: usize,
}

impl FrameHeader {
    /// Write this header in wire form, direction bit set.
    ///
    /// `body_length` must fit the wire's signed 32-bit length, as every
    /// decoded header does.
    pub fn encode(&self, dst: &mut BytesMut) {
        debug_assert!(
            i32::try_from(self.body_length).is_ok(),
            "body length {} does not fit a frame header",
            self.body_length
        );
        dst.reserve(HEADER_LENGTH);
        dst.put_u8(self.protocol_version | RESPONSE_DIRECTION);
        dst.put_u8(self.flags);
        dst.put_u8(self.stream_id);
        dst.put_u8(self.opcode.into());
        dst.put_u32(self.body_length as u32);
    }
}

/// Decode a frame header from the front of `src`.
///
/// Wire format:
/// ```text
/// ┌───────────┬─────────┬──────────┬──────────┬──────────────┐
/// │ Version   │ Flags   │ Stream   │ Opcode   │ Length       │
/// │ (1B, bit7 │ (1B)    │ (1B)     │ (1B)     │ (4B BE)      │
/// │ = resp.)  │         │          │          │              │
/// └───────────┴─────────┴──────────┴──────────┴──────────────┘
/// ```
///
/// Returns `Ok(None)` while fewer than [`HEADER_LENGTH`] bytes are buffered.
/// Consumes exactly [`HEADER_LENGTH`] bytes on success and nothing otherwise,
/// including on error.
pub fn decode_header(src: &mut BytesMut, config: &FrameConfig) -> Result<Option<FrameHeader>> {
    if src.len() < HEADER_LENGTH {
        trace!(buffered = src.len(), "header incomplete");
        return Ok(None);
    }

    let version = src[0];
    if version & RESPONSE_DIRECTION == 0 {
        return Err(FrameError::RequestFrame(version));
    }
    let protocol_version = version & VERSION_MASK;
    if protocol_version != config.protocol_version {
        return Err(FrameError::UnsupportedVersion {
            found: protocol_version,
            expected: config.protocol_version,
        });
    }

    let flags = src[1];
    let stream_id = src[2];
    let opcode = Opcode::try_from(src[3])?;

    let declared = i32::from_be_bytes([src[4], src[5], src[6], src[7]]);
    let body_length =
        usize::try_from(declared).map_err(|_| FrameError::InvalidBodyLength(declared))?;
    if body_length > config.max_body_length {
        return Err(FrameError::BodyTooLarge {
            size: body_length,
            max: config.max_body_length,
        });
    }

    src.advance(HEADER_LENGTH);

    Ok(Some(FrameHeader {
        protocol_version,
        flags,
        stream_id,
        opcode,
        body_length,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_bytes(version: u8, opcode: u8, length: i32) -> BytesMut {
        let mut buf = BytesMut::new();
        buf.put_u8(version);
        buf.put_u8(0);
        buf.put_u8(3);
        buf.put_u8(opcode);
        buf.put_i32(length);
        buf
    }

    #[test]
    fn decodes_complete_header() {
        let mut buf = header_bytes(0x81, 0x02, 0);
        let header = decode_header(&mut buf, &FrameConfig::default())
            .unwrap()
            .unwrap();

        assert_eq!(header.protocol_version, 1);
        assert_eq!(header.stream_id, 3);
        assert_eq!(header.opcode, Opcode::Ready);
        assert_eq!(header.body_length, 0);
        assert!(buf.is_empty());
    }

    #[test]
    fn partial_header_is_left_untouched() {
        let full = header_bytes(0x81, 0x02, 0);
        for len in 0..HEADER_LENGTH {
            let mut buf = BytesMut::from(&full[..len]);
            assert!(decode_header(&mut buf, &FrameConfig::default())
                .unwrap()
                .is_none());
            assert_eq!(buf.len(), len);
        }
    }

    #[test]
    fn rejects_request_direction() {
        let mut buf = header_bytes(0x01, 0x02, 0);
        let err = decode_header(&mut buf, &FrameConfig::default()).unwrap_err();
        assert!(matches!(err, FrameError::RequestFrame(0x01)));
        assert_eq!(buf.len(), HEADER_LENGTH);
    }

    #[test]
    fn rejects_other_protocol_versions() {
        let mut buf = header_bytes(0x82, 0x02, 0);
        let err = decode_header(&mut buf, &FrameConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            FrameError::UnsupportedVersion {
                found: 2,
                expected: 1
            }
        ));
    }

    #[test]
    fn rejects_unknown_opcode_without_body() {
        let mut buf = header_bytes(0x81, 0x05, 1024);
        let err = decode_header(&mut buf, &FrameConfig::default()).unwrap_err();
        assert!(matches!(err, FrameError::UnsupportedOpcode(0x05)));
    }

    #[test]
    fn rejects_negative_length() {
        let mut buf = header_bytes(0x81, 0x08, -1);
        let err = decode_header(&mut buf, &FrameConfig::default()).unwrap_err();
        assert!(matches!(err, FrameError::InvalidBodyLength(-1)));
    }

    #[test]
    fn rejects_oversized_body() {
        let mut buf = header_bytes(0x81, 0x08, 1024);
        let config = FrameConfig {
            max_body_length: 16,
            ..FrameConfig::default()
        };
        let err = decode_header(&mut buf, &config).unwrap_err();
        assert!(matches!(
            err,
            FrameError::BodyTooLarge {
                size: 1024,
                max: 16
            }
        ));
    }

    #[test]
    fn encode_sets_direction_bit() {
        let header = FrameHeader {
            protocol_version: 1,
            flags: 0,
            stream_id: 9,
            opcode: Opcode::Result,
            body_length: 4,
        };
        let mut buf = BytesMut::new();
        header.encode(&mut buf);
        assert_eq!(&buf[..], &[0x81, 0x00, 0x09, 0x08, 0x00, 0x00, 0x00, 0x04]);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "does not fit a frame header")]
    fn encode_rejects_unrepresentable_length() {
        let header = FrameHeader {
            protocol_version: 1,
            flags: 0,
            stream_id: 1,
            opcode: Opcode::Result,
            body_length: i32::MAX as usize + 1,
        };
        header.encode(&mut BytesMut::new());
    }
}
