use crate::opcode::Opcode;

/// Errors raised by the frame layer.
///
/// Every variant is fatal for the byte stream it was raised on: the
/// connection's read path cannot resynchronize after any of them.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The direction bit of the version byte is clear, so this is a request frame.
    #[error("request frames are not supported (version byte {0:#04x})")]
    RequestFrame(u8),

    /// The masked protocol version is not the one this decoder speaks.
    #[error("unsupported protocol version {found} (expected {expected})")]
    UnsupportedVersion { found: u8, expected: u8 },

    /// The header opcode has no body decoder.
    #[error("the operation {0:#04x} is not supported")]
    UnsupportedOpcode(u8),

    /// The header declared a negative body length.
    #[error("invalid body length {0}")]
    InvalidBodyLength(i32),

    /// The header declared a body larger than the configured maximum.
    #[error("body too large ({size} bytes, max {max})")]
    BodyTooLarge { size: usize, max: usize },

    /// A body decoder rejected a well-framed body.
    #[error("failed to decode {opcode} body: {source}")]
    Decode {
        opcode: Opcode,
        #[source]
        source: DecodeError,
    },

    /// Bytes were fed to a frame that already holds its response.
    #[error("frame is already complete")]
    AlreadyComplete,

    /// A previous feed failed and left the frame unusable.
    #[error("frame assembly already failed")]
    Poisoned,

    /// An I/O error occurred while reading frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended before a complete frame was received.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,
}

/// Errors raised while decoding the notation inside a frame body.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("truncated {what}: needed {needed} bytes, {available} available")]
    Truncated {
        what: &'static str,
        needed: usize,
        available: usize,
    },

    #[error("{what} is not valid UTF-8")]
    InvalidUtf8 { what: &'static str },

    #[error("unknown {what} {value:#06x}")]
    UnknownCode { what: &'static str, value: i32 },

    #[error("{0}")]
    Malformed(String),
}

pub type Result<T> = std::result::Result<T, FrameError>;
