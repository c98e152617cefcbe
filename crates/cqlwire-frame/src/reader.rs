use std::io::{ErrorKind, Read};

use bytes::BytesMut;

use crate::assembler::ResponseFrame;
use crate::config::FrameConfig;
use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Reads complete response frames from any `Read` stream.
///
/// Handles partial reads internally. Bytes belonging to the next frame are
/// kept across calls, so several frames delivered by one read come out one
/// at a time. A frame in progress survives a `WouldBlock` or `TimedOut`
/// read; any other error ends the stream and later calls return
/// [`FrameError::Poisoned`].
pub struct ResponseReader<T> {
    inner: T,
    buf: BytesMut,
    current: ResponseFrame,
    failed: bool,
    config: FrameConfig,
}

impl<T: Read> ResponseReader<T> {
    /// Create a new reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            current: ResponseFrame::with_config(config.clone()),
            failed: false,
            config,
        }
    }

    /// Read the next complete frame (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached.
    pub fn read_frame(&mut self) -> Result<ResponseFrame> {
        self.read_next()?.ok_or(FrameError::ConnectionClosed)
    }

    /// Read the next complete frame, or `None` if the stream ends cleanly
    /// on a frame boundary.
    ///
    /// EOF in the middle of a frame is `Err(FrameError::ConnectionClosed)`.
    pub fn read_next(&mut self) -> Result<Option<ResponseFrame>> {
        if self.failed {
            return Err(FrameError::Poisoned);
        }
        self.next_frame().map_err(|err| {
            if !is_resumable(&err) {
                self.failed = true;
            }
            err
        })
    }

    fn next_frame(&mut self) -> Result<Option<ResponseFrame>> {
        if self.current.advance(&mut self.buf)? {
            return Ok(Some(self.take_current()));
        }

        let mut chunk = [0u8; READ_CHUNK_SIZE];
        loop {
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                if self.buf.is_empty() && self.current.header().is_none() {
                    return Ok(None);
                }
                return Err(FrameError::ConnectionClosed);
            }

            if self.current.feed(&mut self.buf, &chunk[..read])? {
                return Ok(Some(self.take_current()));
            }
        }
    }

    fn take_current(&mut self) -> ResponseFrame {
        let next = ResponseFrame::with_config(self.config.clone());
        std::mem::replace(&mut self.current, next)
    }

    /// Whether an earlier error ended the stream.
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    /// Bytes read from the stream but not yet part of a returned frame.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

fn is_resumable(err: &FrameError) -> bool {
    matches!(
        err,
        FrameError::Io(io) if matches!(io.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut)
    )
}
