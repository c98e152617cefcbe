use std::collections::BTreeMap;

use bytes::Bytes;
use cqlwire_frame::Consistency;

/// Request opcode: STARTUP.
pub const OPCODE_STARTUP: u8 = 0x01;
/// Request opcode: CREDENTIALS.
pub const OPCODE_CREDENTIALS: u8 = 0x04;
/// Request opcode: OPTIONS.
pub const OPCODE_OPTIONS: u8 = 0x05;
/// Request opcode: QUERY.
pub const OPCODE_QUERY: u8 = 0x07;
/// Request opcode: PREPARE.
pub const OPCODE_PREPARE: u8 = 0x09;
/// Request opcode: EXECUTE.
pub const OPCODE_EXECUTE: u8 = 0x0a;
/// Request opcode: REGISTER.
pub const OPCODE_REGISTER: u8 = 0x0b;

/// A request as handed to a [`crate::Connection`].
///
/// Encoding is the connection's business; the runner only reads the
/// query text back out when it has to explain a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Startup {
        cql_version: String,
        compression: Option<String>,
    },
    Credentials(BTreeMap<String, String>),
    Options,
    Query {
        cql: String,
        consistency: Consistency,
    },
    Prepare {
        cql: String,
    },
    Execute {
        id: Bytes,
        values: Vec<Option<Bytes>>,
        consistency: Consistency,
    },
    Register {
        events: Vec<String>,
    },
}

impl Request {
    /// A QUERY request.
    pub fn query(cql: impl Into<String>, consistency: Consistency) -> Self {
        Request::Query {
            cql: cql.into(),
            consistency,
        }
    }

    /// A PREPARE request.
    pub fn prepare(cql: impl Into<String>) -> Self {
        Request::Prepare { cql: cql.into() }
    }

    /// A STARTUP request for CQL 3.0.0 without compression.
    pub fn startup() -> Self {
        Request::Startup {
            cql_version: "3.0.0".to_string(),
            compression: None,
        }
    }

    /// Query text, for QUERY requests only.
    pub fn query_text(&self) -> Option<&str> {
        match self {
            Request::Query { cql, .. } => Some(cql),
            _ => None,
        }
    }

    pub fn opcode(&self) -> u8 {
        match self {
            Request::Startup { .. } => OPCODE_STARTUP,
            Request::Credentials(_) => OPCODE_CREDENTIALS,
            Request::Options => OPCODE_OPTIONS,
            Request::Query { .. } => OPCODE_QUERY,
            Request::Prepare { .. } => OPCODE_PREPARE,
            Request::Execute { .. } => OPCODE_EXECUTE,
            Request::Register { .. } => OPCODE_REGISTER,
        }
    }
}
