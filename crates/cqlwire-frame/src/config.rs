/// Protocol version spoken by the decoders in this crate.
pub const PROTOCOL_VERSION: u8 = 1;

/// Default maximum body length: 256 MiB, the server-side frame ceiling.
pub const DEFAULT_MAX_BODY_LENGTH: usize = 256 * 1024 * 1024;

/// Configuration for frame assembly.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Largest body a header may declare. Default: 256 MiB.
    pub max_body_length: usize,
    /// Protocol version expected after the direction bit is stripped.
    pub protocol_version: u8,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_body_length: DEFAULT_MAX_BODY_LENGTH,
            protocol_version: PROTOCOL_VERSION,
        }
    }
}
