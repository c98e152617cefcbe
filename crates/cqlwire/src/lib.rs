//! Response-side wire protocol layer for CQL binary protocol clients.
//!
//! # Crate Structure
//!
//! - [`frame`]: Incremental frame assembly and response body decoding
//! - [`client`]: Request runner turning responses into outcomes (behind `client` feature)

/// Re-export frame types.
pub mod frame {
    pub use cqlwire_frame::*;
}

/// Re-export client types (requires `client` feature).
#[cfg(feature = "client")]
pub mod client {
    pub use cqlwire_client::*;
}
