//! Opcode to body-decoder dispatch.
//!
//! Adding a response kind means adding a variant here and a decoder in
//! [`crate::response`]; the assembler never changes.

use std::fmt;

use bytes::Bytes;
use tracing::trace;

use crate::error::{FrameError, Result};
use crate::response::{
    decode_authenticate, decode_error, decode_event, decode_result, decode_supported, Response,
};

/// Response opcodes with a body decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    Error = 0x00,
    Ready = 0x02,
    Authenticate = 0x03,
    Supported = 0x06,
    Result = 0x08,
    Event = 0x0c,
}

impl Opcode {
    /// All recognized response opcodes.
    pub const ALL: [Opcode; 6] = [
        Opcode::Error,
        Opcode::Ready,
        Opcode::Authenticate,
        Opcode::Supported,
        Opcode::Result,
        Opcode::Event,
    ];

    /// Protocol name of the opcode.
    pub fn name(self) -> &'static str {
        match self {
            Opcode::Error => "ERROR",
            Opcode::Ready => "READY",
            Opcode::Authenticate => "AUTHENTICATE",
            Opcode::Supported => "SUPPORTED",
            Opcode::Result => "RESULT",
            Opcode::Event => "EVENT",
        }
    }

    /// Decode a complete body with this opcode's decoder.
    ///
    /// `body` holds exactly the bytes the header declared.
    pub fn decode_body(self, mut body: Bytes) -> Result<Response> {
        let len = body.len();
        let response = match self {
            Opcode::Error => decode_error(&mut body).map(Response::Error),
            Opcode::Ready => Ok(Response::Ready),
            Opcode::Authenticate => decode_authenticate(&mut body).map(Response::Authenticate),
            Opcode::Supported => decode_supported(&mut body).map(Response::Supported),
            Opcode::Result => decode_result(&mut body).map(Response::Result),
            Opcode::Event => decode_event(&mut body).map(Response::Event),
        }
        .map_err(|source| FrameError::Decode {
            opcode: self,
            source,
        })?;

        if !body.is_empty() {
            trace!(opcode = %self, len, trailing = body.len(), "ignoring trailing body bytes");
        }
        Ok(response)
    }
}

impl TryFrom<u8> for Opcode {
    type Error = FrameError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0x00 => Ok(Opcode::Error),
            0x02 => Ok(Opcode::Ready),
            0x03 => Ok(Opcode::Authenticate),
            0x06 => Ok(Opcode::Supported),
            0x08 => Ok(Opcode::Result),
            0x0c => Ok(Opcode::Event),
            other => Err(FrameError::UnsupportedOpcode(other)),
        }
    }
}

impl From<Opcode> for u8 {
    fn from(opcode: Opcode) -> Self {
        opcode as u8
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeError;

    #[test]
    fn recognized_opcodes_roundtrip_through_u8() {
        for opcode in Opcode::ALL {
            assert_eq!(Opcode::try_from(u8::from(opcode)).unwrap(), opcode);
        }
    }

    #[test]
    fn request_opcodes_are_unsupported() {
        // STARTUP, CREDENTIALS, OPTIONS, QUERY, PREPARE, EXECUTE, REGISTER
        for op in [0x01u8, 0x04, 0x05, 0x07, 0x09, 0x0a, 0x0b, 0x0d, 0xff] {
            assert!(matches!(
                Opcode::try_from(op),
                Err(FrameError::UnsupportedOpcode(found)) if found == op
            ));
        }
    }

    #[test]
    fn ready_ignores_body() {
        let response = Opcode::Ready.decode_body(Bytes::new()).unwrap();
        assert_eq!(response, Response::Ready);
    }

    #[test]
    fn decoder_failure_names_opcode() {
        let err = Opcode::Authenticate
            .decode_body(Bytes::from_static(&[0x00]))
            .unwrap_err();
        match err {
            FrameError::Decode { opcode, source } => {
                assert_eq!(opcode, Opcode::Authenticate);
                assert!(matches!(source, DecodeError::Truncated { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
