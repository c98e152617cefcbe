//! `tokio_util` codec over [`ResponseFrame`] (requires the `async` feature).

use bytes::BytesMut;
use tokio_util::codec::Decoder;

use crate::assembler::ResponseFrame;
use crate::config::FrameConfig;
use crate::error::{FrameError, Result};

/// Decodes a byte stream into completed response frames.
///
/// The frame in progress is kept between calls; `FramedRead` owns the
/// buffer and hands it back with every new read.
#[derive(Debug)]
pub struct ResponseCodec {
    current: ResponseFrame,
    config: FrameConfig,
}

impl ResponseCodec {
    pub fn new() -> Self {
        Self::with_config(FrameConfig::default())
    }

    pub fn with_config(config: FrameConfig) -> Self {
        Self {
            current: ResponseFrame::with_config(config.clone()),
            config,
        }
    }
}

impl Default for ResponseCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for ResponseCodec {
    type Item = ResponseFrame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<ResponseFrame>> {
        if !self.current.advance(src)? {
            return Ok(None);
        }
        let next = ResponseFrame::with_config(self.config.clone());
        Ok(Some(std::mem::replace(&mut self.current, next)))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<ResponseFrame>> {
        match self.decode(src)? {
            Some(frame) => Ok(Some(frame)),
            None if src.is_empty() && self.current.header().is_none() => Ok(None),
            None => Err(FrameError::ConnectionClosed),
        }
    }
}
