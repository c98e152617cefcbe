//! Response frame assembly for the CQL binary protocol (v1).
//!
//! Every frame sent by the server is framed with:
//! - A 1-byte version whose top bit marks the response direction
//! - A 1-byte flags field
//! - A 1-byte stream id correlating the response with its request
//! - A 1-byte opcode selecting the body decoder
//! - A 4-byte big-endian body length
//!
//! Bytes can arrive in any chunking; [`ResponseFrame`] consumes exactly one
//! frame and leaves the rest of the buffer for the next one.

pub mod assembler;
#[cfg(feature = "async")]
pub mod codec;
pub mod config;
pub mod consistency;
pub mod error;
pub mod header;
pub mod opcode;
pub mod primitives;
pub mod reader;
pub mod response;
pub mod value;

pub use assembler::{FrameState, ResponseFrame};
#[cfg(feature = "async")]
pub use codec::ResponseCodec;
pub use config::{FrameConfig, DEFAULT_MAX_BODY_LENGTH, PROTOCOL_VERSION};
pub use consistency::Consistency;
pub use error::{DecodeError, FrameError, Result};
pub use header::{decode_header, FrameHeader, HEADER_LENGTH};
pub use opcode::Opcode;
pub use reader::ResponseReader;
pub use response::{
    ColumnSpec, ErrorDetails, ErrorResponse, Event, Prepared, Response, ResultMetadata,
    ResultResponse, Row, Rows, SchemaChange,
};
pub use value::{ColumnType, Value};
