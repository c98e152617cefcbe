//! Incremental assembly of one response frame.
//!
//! A [`ResponseFrame`] moves through three states as bytes arrive:
//!
//! ```text
//! HeaderPending ──(8 bytes)──▶ BodyPending ──(body_length bytes)──▶ Complete
//! ```
//!
//! The byte buffer is owned by the caller's read path and lent to every
//! call, so bytes past the end of this frame stay where the next frame
//! will find them.

use bytes::BytesMut;
use tracing::{debug, trace, warn};

use crate::config::FrameConfig;
use crate::error::{FrameError, Result};
use crate::header::{decode_header, FrameHeader, HEADER_LENGTH};
use crate::response::Response;

/// Assembly state of a single frame.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameState {
    /// Fewer than [`HEADER_LENGTH`] bytes have been seen.
    HeaderPending,
    /// Header decoded; waiting for `body_length` body bytes.
    BodyPending(FrameHeader),
    /// Body decoded.
    Complete(FrameHeader, Response),
    /// A frame-layer error was raised; the stream cannot be resumed.
    /// Keeps the header if it had been decoded.
    Failed(Option<FrameHeader>),
}

impl FrameState {
    /// Try the `HeaderPending → BodyPending` transition.
    pub fn try_header(src: &mut BytesMut, config: &FrameConfig) -> Result<FrameState> {
        Ok(match decode_header(src, config)? {
            Some(header) => {
                debug!(
                    stream_id = header.stream_id,
                    opcode = %header.opcode,
                    body_length = header.body_length,
                    "frame header decoded"
                );
                FrameState::BodyPending(header)
            }
            None => FrameState::HeaderPending,
        })
    }

    /// Try the `BodyPending → Complete` transition.
    ///
    /// Splits exactly `header.body_length` bytes off `src`; anything after
    /// them is left in place.
    pub fn try_body(header: FrameHeader, src: &mut BytesMut) -> Result<FrameState> {
        if src.len() < header.body_length {
            trace!(
                stream_id = header.stream_id,
                buffered = src.len(),
                body_length = header.body_length,
                "body incomplete"
            );
            return Ok(FrameState::BodyPending(header));
        }

        let body = src.split_to(header.body_length).freeze();
        let response = header.opcode.decode_body(body)?;
        debug!(
            stream_id = header.stream_id,
            kind = response.kind(),
            surplus = src.len(),
            "frame complete"
        );
        Ok(FrameState::Complete(header, response))
    }
}

/// One response frame, assembled from bytes fed in arbitrary chunks.
///
/// A new instance is needed for every frame on the stream.
#[derive(Debug)]
pub struct ResponseFrame {
    state: FrameState,
    config: FrameConfig,
}

impl Default for ResponseFrame {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseFrame {
    /// Create an empty frame with default configuration.
    pub fn new() -> Self {
        Self::with_config(FrameConfig::default())
    }

    /// Create an empty frame with explicit configuration.
    pub fn with_config(config: FrameConfig) -> Self {
        Self {
            state: FrameState::HeaderPending,
            config,
        }
    }

    /// Append `chunk` to `src` and advance as far as the buffered bytes allow.
    ///
    /// Returns whether the frame is complete. Feeding a complete frame is an
    /// error and leaves `src` untouched.
    pub fn feed(&mut self, src: &mut BytesMut, chunk: &[u8]) -> Result<bool> {
        match self.state {
            FrameState::Complete(..) => return Err(FrameError::AlreadyComplete),
            FrameState::Failed(_) => return Err(FrameError::Poisoned),
            _ => {}
        }
        src.extend_from_slice(chunk);
        self.advance(src)
    }

    /// Advance over bytes already in `src`, e.g. surplus left by the previous frame.
    ///
    /// Returns whether the frame is complete.
    pub fn advance(&mut self, src: &mut BytesMut) -> Result<bool> {
        let state = std::mem::replace(&mut self.state, FrameState::Failed(None));
        let (next, header) = match state {
            FrameState::HeaderPending => match FrameState::try_header(src, &self.config) {
                Ok(FrameState::BodyPending(header)) => {
                    (FrameState::try_body(header, src), Some(header))
                }
                other => (other, None),
            },
            FrameState::BodyPending(header) => (FrameState::try_body(header, src), Some(header)),
            complete @ FrameState::Complete(..) => (Ok(complete), None),
            FrameState::Failed(header) => {
                self.state = FrameState::Failed(header);
                return Err(FrameError::Poisoned);
            }
        };

        match next {
            Ok(next) => {
                self.state = next;
                Ok(self.is_complete())
            }
            Err(err) => {
                warn!(
                    stream_id = header.map(|header| header.stream_id),
                    error = %err,
                    "frame assembly failed"
                );
                self.state = FrameState::Failed(header);
                Err(err)
            }
        }
    }

    /// Current assembly state.
    pub fn state(&self) -> &FrameState {
        &self.state
    }

    /// The decoded header, once available. Survives a failed body decode.
    pub fn header(&self) -> Option<&FrameHeader> {
        match &self.state {
            FrameState::BodyPending(header)
            | FrameState::Complete(header, _)
            | FrameState::Failed(Some(header)) => Some(header),
            FrameState::HeaderPending | FrameState::Failed(None) => None,
        }
    }

    pub fn stream_id(&self) -> Option<u8> {
        self.header().map(|header| header.stream_id)
    }

    /// Always [`HEADER_LENGTH`].
    pub fn header_length(&self) -> usize {
        HEADER_LENGTH
    }

    pub fn body_length(&self) -> Option<usize> {
        self.header().map(|header| header.body_length)
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.state, FrameState::Complete(..))
    }

    /// The decoded response, once complete.
    pub fn response(&self) -> Option<&Response> {
        match &self.state {
            FrameState::Complete(_, response) => Some(response),
            _ => None,
        }
    }

    /// Take the decoded response, if complete.
    pub fn into_response(self) -> Option<Response> {
        self.into_parts().map(|(_, response)| response)
    }

    /// Take the header and decoded response, if complete.
    pub fn into_parts(self) -> Option<(FrameHeader, Response)> {
        match self.state {
            FrameState::Complete(header, response) => Some((header, response)),
            _ => None,
        }
    }
}
