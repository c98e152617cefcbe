use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use cqlwire_client::{Outcome, QueryError};
use cqlwire_frame::{Event, FrameHeader, Response, ResultResponse};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// One decoded frame as printed by `decode`.
#[derive(Debug, Serialize)]
pub struct FrameOutput {
    pub stream_id: u8,
    pub opcode: &'static str,
    pub body_length: usize,
    pub kind: &'static str,
    pub detail: String,
    pub outcome: String,
}

impl FrameOutput {
    pub fn new(
        header: &FrameHeader,
        response: &Response,
        outcome: &Result<Outcome, QueryError>,
    ) -> Self {
        Self {
            stream_id: header.stream_id,
            opcode: header.opcode.name(),
            body_length: header.body_length,
            kind: response.kind(),
            detail: describe_response(response),
            outcome: describe_outcome(outcome),
        }
    }
}

pub fn print_frames(frames: &[FrameOutput], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            for frame in frames {
                println!(
                    "{}",
                    serde_json::to_string(frame).unwrap_or_else(|_| "{}".to_string())
                );
            }
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["STREAM", "OPCODE", "LENGTH", "KIND", "DETAIL", "OUTCOME"]);
            for frame in frames {
                table.add_row(vec![
                    frame.stream_id.to_string(),
                    frame.opcode.to_string(),
                    frame.body_length.to_string(),
                    frame.kind.to_string(),
                    frame.detail.clone(),
                    frame.outcome.clone(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for frame in frames {
                println!(
                    "stream={} opcode={} length={} kind={} detail={:?} outcome={:?}",
                    frame.stream_id,
                    frame.opcode,
                    frame.body_length,
                    frame.kind,
                    frame.detail,
                    frame.outcome
                );
            }
        }
    }
}

fn describe_response(response: &Response) -> String {
    match response {
        Response::Error(error) => format!("{:#06x} {}", error.code, error.message),
        Response::Ready | Response::Result(ResultResponse::Void) => String::new(),
        Response::Authenticate(class) => class.clone(),
        Response::Supported(options) => options
            .iter()
            .map(|(key, values)| format!("{key}={}", values.join(",")))
            .collect::<Vec<_>>()
            .join(" "),
        Response::Result(ResultResponse::Rows(rows)) => {
            let columns = rows
                .metadata
                .columns
                .iter()
                .map(|column| format!("{} {}", column.name, column.column_type))
                .collect::<Vec<_>>()
                .join(", ");
            format!("{} rows ({columns})", rows.rows.len())
        }
        Response::Result(ResultResponse::SetKeyspace(keyspace)) => keyspace.clone(),
        Response::Result(ResultResponse::Prepared(prepared)) => format!(
            "id={} ({} bound columns)",
            hex::encode(&prepared.id),
            prepared.metadata.columns.len()
        ),
        Response::Result(ResultResponse::SchemaChange(change))
        | Response::Event(Event::SchemaChange(change)) => {
            format!("{} {}.{}", change.change, change.keyspace, change.table)
        }
        Response::Event(Event::TopologyChange { change, node })
        | Response::Event(Event::StatusChange { change, node }) => format!("{change} {node}"),
    }
}

fn describe_outcome(outcome: &Result<Outcome, QueryError>) -> String {
    match outcome {
        Ok(Outcome::Rows(result)) => format!("rows({})", result.len()),
        Ok(Outcome::Void) => "void".to_string(),
        Ok(Outcome::Prepared(statement)) => format!("prepared({})", hex::encode(statement.id())),
        Ok(Outcome::AuthenticationRequired(required)) => {
            format!("authentication required ({})", required.authentication_class)
        }
        Ok(Outcome::KeyspaceChanged(changed)) => format!("keyspace changed ({})", changed.keyspace),
        Err(err) => format!("error: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use cqlwire_client::{transform, Request};
    use cqlwire_frame::{Consistency, ErrorResponse, Opcode};

    use super::*;

    #[test]
    fn error_frames_show_query_context() {
        let header = FrameHeader {
            protocol_version: 1,
            flags: 0,
            stream_id: 2,
            opcode: Opcode::Error,
            body_length: 10,
        };
        let response = Response::Error(ErrorResponse::new(0xbad, "Bork"));
        let request = Request::query("SELECT * FROM everything", Consistency::One);
        let outcome = transform(&request, response.clone());

        let out = FrameOutput::new(&header, &response, &outcome);
        assert_eq!(out.opcode, "ERROR");
        assert_eq!(out.detail, "0x0bad Bork");
        assert!(out.outcome.contains("SELECT * FROM everything"));
    }
}
