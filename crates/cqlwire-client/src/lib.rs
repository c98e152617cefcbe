//! Client-facing side of the CQL binary protocol.
//!
//! A [`RequestRunner`] sends a [`Request`] over anything implementing
//! [`Connection`] and turns the decoded response into an [`Outcome`], or a
//! [`QueryError`] carrying the server's code, message and the failing query.

pub mod connection;
pub mod error;
pub mod outcome;
pub mod request;
pub mod runner;

pub use connection::Connection;
pub use error::{ClientError, ConnectionError, QueryError, Result};
pub use outcome::{
    AuthenticationRequired, KeyspaceChanged, Outcome, PreparedStatement, QueryResult,
};
pub use request::Request;
pub use runner::{transform, RequestRunner, RunnerConfig};

pub use cqlwire_frame::Consistency;
