use std::fmt;
use std::time::Duration;

use cqlwire_frame::{ErrorDetails, FrameError};

/// A server-reported error for a request.
///
/// Carries the query text when the failed request was a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryError {
    pub code: i32,
    pub message: String,
    pub cql: Option<String>,
    pub details: Option<ErrorDetails>,
}

impl QueryError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            cql: None,
            details: None,
        }
    }

    /// Attach the text of the query that failed.
    pub fn with_cql(mut self, cql: impl Into<String>) -> Self {
        self.cql = Some(cql.into());
        self
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (error code {:#06x})", self.message, self.code)?;
        if let Some(cql) = &self.cql {
            write!(f, " for query {cql:?}")?;
        }
        Ok(())
    }
}

impl std::error::Error for QueryError {}

/// Failures of the connection itself, as opposed to errors reported by the server.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// The response stream could not be decoded.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// An I/O error occurred on the connection.
    #[error("connection I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The connection closed before a response arrived.
    #[error("connection closed")]
    Closed,

    /// The request was canceled before a response arrived.
    #[error("request canceled")]
    Canceled,
}

/// Errors returned by [`crate::RequestRunner::execute`].
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The server answered with an error response.
    #[error("query failed: {0}")]
    Query(#[from] QueryError),

    /// The connection failed; passed through as the connection reported it.
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// No response arrived within the configured request timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

impl ClientError {
    /// The server error, if this is one.
    pub fn as_query_error(&self) -> Option<&QueryError> {
        match self {
            ClientError::Query(err) => Some(err),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_error_display_includes_query() {
        let err = QueryError::new(0xbad, "Bork").with_cql("SELECT * FROM everything");
        assert_eq!(
            err.to_string(),
            "Bork (error code 0x0bad) for query \"SELECT * FROM everything\""
        );
    }

    #[test]
    fn connection_errors_display_transparently() {
        let err = ClientError::from(ConnectionError::Closed);
        assert_eq!(err.to_string(), "connection closed");
        assert!(err.as_query_error().is_none());
    }
}
