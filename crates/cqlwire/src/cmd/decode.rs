use std::io::{self, Cursor, Read};
use std::path::Path;

use cqlwire_client::{transform, Consistency, Request};
use cqlwire_frame::{FrameConfig, ResponseReader};
use tracing::{debug, info};

use crate::cmd::DecodeArgs;
use crate::exit::{frame_error, io_error, CliError, CliResult, DATA_INVALID, INTERNAL, SUCCESS};
use crate::output::{print_frames, FrameOutput, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let raw = read_input(&args.input)?;
    let bytes = if args.hex { parse_hex(&raw)? } else { raw };
    debug!(bytes = bytes.len(), "decoding capture");

    let mut config = FrameConfig::default();
    if let Some(max) = args.max_body_length {
        config.max_body_length = max;
    }
    let request = match args.query {
        Some(cql) => Request::query(cql, Consistency::One),
        None => Request::Options,
    };

    let chunk_size = usize::try_from(args.chunk_size).unwrap_or(usize::MAX);
    let mut reader = ResponseReader::with_config(Chunked::new(Cursor::new(bytes), chunk_size), config);
    let mut frames = Vec::new();

    let result = loop {
        if args.count.is_some_and(|limit| frames.len() >= limit) {
            break Ok(());
        }
        match reader.read_next() {
            Ok(Some(frame)) => {
                let Some((header, response)) = frame.into_parts() else {
                    break Err(CliError::new(INTERNAL, "reader returned an incomplete frame"));
                };
                let outcome = transform(&request, response.clone());
                frames.push(FrameOutput::new(&header, &response, &outcome));
            }
            Ok(None) => break Ok(()),
            Err(err) => break Err(frame_error("decode failed", err)),
        }
    };

    print_frames(&frames, format);
    info!(frames = frames.len(), trailing = reader.buffered(), "decode finished");
    result.map(|()| SUCCESS)
}

fn read_input(path: &Path) -> CliResult<Vec<u8>> {
    if path.as_os_str() == "-" {
        let mut buf = Vec::new();
        io::stdin()
            .read_to_end(&mut buf)
            .map_err(|err| io_error("read stdin", err))?;
        return Ok(buf);
    }
    std::fs::read(path).map_err(|err| io_error(&format!("read {}", path.display()), err))
}

fn parse_hex(text: &[u8]) -> CliResult<Vec<u8>> {
    let digits: Vec<u8> = text
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    hex::decode(digits).map_err(|err| CliError::new(DATA_INVALID, format!("invalid hex input: {err}")))
}

/// Caps every read at `limit` bytes, so frames arrive split the way a slow
/// socket would deliver them.
struct Chunked<R> {
    inner: R,
    limit: usize,
}

impl<R> Chunked<R> {
    fn new(inner: R, limit: usize) -> Self {
        Self {
            inner,
            limit: limit.max(1),
        }
    }
}

impl<R: Read> Read for Chunked<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let len = buf.len().min(self.limit);
        self.inner.read(&mut buf[..len])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_ignores_whitespace() {
        let bytes = parse_hex(b"81 00 01 02\n00000000\n").unwrap();
        assert_eq!(bytes, vec![0x81, 0x00, 0x01, 0x02, 0, 0, 0, 0]);
    }

    #[test]
    fn bad_hex_is_invalid_data() {
        let err = parse_hex(b"8").unwrap_err();
        assert_eq!(err.code, DATA_INVALID);
        let err = parse_hex(b"zz").unwrap_err();
        assert_eq!(err.code, DATA_INVALID);
    }

    #[test]
    fn chunked_caps_each_read() {
        let mut reader = Chunked::new(Cursor::new(vec![1u8, 2, 3, 4, 5]), 2);
        let mut buf = [0u8; 8];
        assert_eq!(reader.read(&mut buf).unwrap(), 2);
        assert_eq!(reader.read(&mut buf).unwrap(), 2);
        assert_eq!(reader.read(&mut buf).unwrap(), 1);
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn byte_at_a_time_decodes_pipelined_frames() {
        let wire = parse_hex(b"8100010200000000 8100020800000004 00000001").unwrap();
        let mut reader = ResponseReader::new(Chunked::new(Cursor::new(wire), 1));

        let first = reader.read_next().unwrap().unwrap();
        let second = reader.read_next().unwrap().unwrap();
        assert_eq!(first.stream_id(), Some(1));
        assert_eq!(second.stream_id(), Some(2));
        assert!(reader.read_next().unwrap().is_none());
    }

    #[test]
    fn missing_file_is_usage_error() {
        let err = read_input(Path::new("/nonexistent/cqlwire/capture.bin")).unwrap_err();
        assert_eq!(err.code, crate::exit::USAGE);
    }
}
