use std::time::Duration;

use cqlwire_frame::{Prepared, Response, ResultResponse, Rows};
use tracing::debug;

use crate::connection::Connection;
use crate::error::{ClientError, QueryError, Result};
use crate::outcome::{
    AuthenticationRequired, KeyspaceChanged, Outcome, PreparedStatement, QueryResult,
};
use crate::request::Request;

/// Configuration for [`RequestRunner`].
#[derive(Debug, Clone, Default)]
pub struct RunnerConfig {
    /// Upper bound on waiting for a response. Default: none.
    ///
    /// Enforced with `tokio::time::timeout`, so when set, `execute` must be
    /// polled inside a Tokio runtime with the time driver enabled; it panics
    /// otherwise. Without a timeout the runner works on any executor.
    pub request_timeout: Option<Duration>,
}

/// Sends requests and turns their responses into [`Outcome`]s or errors.
#[derive(Debug, Clone, Default)]
pub struct RequestRunner {
    config: RunnerConfig,
}

impl RequestRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RunnerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Send `request` over `connection` and transform the response.
    ///
    /// Connection failures are returned as [`ClientError::Connection`]
    /// unchanged; server errors become [`ClientError::Query`].
    pub async fn execute<C: Connection>(
        &self,
        connection: &C,
        request: &Request,
    ) -> Result<Outcome> {
        debug!(opcode = request.opcode(), "sending request");
        let response = match self.config.request_timeout {
            Some(limit) => tokio::time::timeout(limit, connection.send_request(request))
                .await
                .map_err(|_| ClientError::Timeout(limit))??,
            None => connection.send_request(request).await?,
        };
        transform(request, response).map_err(ClientError::from)
    }
}

/// Map a response onto the outcome of `request`.
///
/// Response kinds with no client-facing meaning resolve to [`Outcome::Void`].
pub fn transform(request: &Request, response: Response) -> std::result::Result<Outcome, QueryError> {
    let outcome = match response {
        Response::Result(ResultResponse::Rows(Rows { metadata, rows })) => {
            Outcome::Rows(QueryResult::new(metadata, rows))
        }
        Response::Result(ResultResponse::Void) => Outcome::Void,
        Response::Result(ResultResponse::Prepared(Prepared { id, metadata })) => {
            Outcome::Prepared(PreparedStatement::new(id, metadata))
        }
        Response::Authenticate(authentication_class) => {
            Outcome::AuthenticationRequired(AuthenticationRequired {
                authentication_class,
            })
        }
        Response::Result(ResultResponse::SetKeyspace(keyspace)) => {
            Outcome::KeyspaceChanged(KeyspaceChanged { keyspace })
        }
        Response::Error(error) => {
            let mut query_error = QueryError::new(error.code, error.message);
            query_error.details = error.details;
            if let Some(cql) = request.query_text() {
                query_error = query_error.with_cql(cql);
            }
            debug!(code = query_error.code, "request failed");
            return Err(query_error);
        }
        other => {
            debug!(kind = other.kind(), "no outcome for response, resolving to void");
            Outcome::Void
        }
    };
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use bytes::Bytes;
    use cqlwire_frame::{
        ColumnSpec, ColumnType, Consistency, ErrorResponse, Event, ResultMetadata, Row,
        SchemaChange, Value,
    };

    use super::*;
    use crate::error::ConnectionError;

    struct StubConnection {
        response: Mutex<Option<std::result::Result<Response, ConnectionError>>>,
        sent: Mutex<Vec<Request>>,
    }

    impl StubConnection {
        fn answering(response: Response) -> Self {
            Self::resolving(Ok(response))
        }

        fn resolving(response: std::result::Result<Response, ConnectionError>) -> Self {
            Self {
                response: Mutex::new(Some(response)),
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    impl Connection for StubConnection {
        async fn send_request(
            &self,
            request: &Request,
        ) -> std::result::Result<Response, ConnectionError> {
            self.sent.lock().unwrap().push(request.clone());
            self.response
                .lock()
                .unwrap()
                .take()
                .expect("stub answers one request")
        }
    }

    struct NeverAnswers;

    impl Connection for NeverAnswers {
        async fn send_request(
            &self,
            _request: &Request,
        ) -> std::result::Result<Response, ConnectionError> {
            std::future::pending().await
        }
    }

    fn metadata() -> ResultMetadata {
        ResultMetadata {
            columns: vec![
                ColumnSpec::new("my_keyspace", "my_table", "my_column", ColumnType::Int),
                ColumnSpec::new(
                    "my_keyspace",
                    "my_table",
                    "my_other_column",
                    ColumnType::Text,
                ),
            ],
        }
    }

    fn rows_response() -> Response {
        let rows = [(11, "hello"), (22, "foo"), (33, "bar")]
            .into_iter()
            .map(|(id, text)| Row {
                values: vec![Some(Value::Int(id)), Some(Value::Text(text.to_string()))],
            })
            .collect();
        Response::Result(ResultResponse::Rows(Rows {
            metadata: metadata(),
            rows,
        }))
    }

    fn request() -> Request {
        Request::Options
    }

    async fn run(response: Response, request: &Request) -> Result<Outcome> {
        let connection = StubConnection::answering(response);
        RequestRunner::new().execute(&connection, request).await
    }

    #[tokio::test]
    async fn executes_the_request() {
        let connection = StubConnection::answering(rows_response());
        let request = Request::query("SELECT * FROM my_table", Consistency::One);
        RequestRunner::new()
            .execute(&connection, &request)
            .await
            .unwrap();
        assert_eq!(connection.sent.lock().unwrap().as_slice(), &[request]);
    }

    #[tokio::test]
    async fn transforms_rows_to_query_result() {
        let Outcome::Rows(result) = run(rows_response(), &request()).await.unwrap() else {
            panic!("expected rows");
        };
        assert_eq!(result.len(), 3);
        assert_eq!(result.metadata().columns.len(), 2);
        let ids: Vec<_> = result.iter().map(|row| row.get(0).cloned()).collect();
        assert_eq!(
            ids,
            vec![
                Some(Value::Int(11)),
                Some(Value::Int(22)),
                Some(Value::Int(33))
            ]
        );
        assert_eq!(
            result.value(2, "my_other_column"),
            Some(&Value::Text("bar".to_string()))
        );
        assert_eq!(result.value(0, "missing"), None);
    }

    #[tokio::test]
    async fn transforms_void_to_nothing() {
        let outcome = run(Response::Result(ResultResponse::Void), &request())
            .await
            .unwrap();
        assert!(outcome.is_void());
    }

    #[tokio::test]
    async fn transforms_prepared_to_statement() {
        let response = Response::Result(ResultResponse::Prepared(Prepared {
            id: Bytes::from_static(&[0x2a]),
            metadata: metadata(),
        }));
        let Outcome::Prepared(statement) = run(response, &request()).await.unwrap() else {
            panic!("expected prepared statement");
        };
        assert_eq!(&statement.id()[..], &[0x2a_u8]);
        assert_eq!(
            statement.column("my_column"),
            Some(&ColumnSpec::new(
                "my_keyspace",
                "my_table",
                "my_column",
                ColumnType::Int
            ))
        );
    }

    #[tokio::test]
    async fn transforms_authenticate_to_authentication_required() {
        let outcome = run(
            Response::Authenticate("TheAuthenticator".to_string()),
            &request(),
        )
        .await
        .unwrap();
        assert_eq!(
            outcome,
            Outcome::AuthenticationRequired(AuthenticationRequired {
                authentication_class: "TheAuthenticator".to_string()
            })
        );
    }

    #[tokio::test]
    async fn transforms_set_keyspace_to_keyspace_changed() {
        let outcome = run(
            Response::Result(ResultResponse::SetKeyspace("some_keyspace".to_string())),
            &request(),
        )
        .await
        .unwrap();
        assert_eq!(
            outcome,
            Outcome::KeyspaceChanged(KeyspaceChanged {
                keyspace: "some_keyspace".to_string()
            })
        );
    }

    #[tokio::test]
    async fn error_response_fails_with_query_error() {
        let err = run(
            Response::Error(ErrorResponse::new(0xbad, "Bork")),
            &request(),
        )
        .await
        .unwrap_err();
        let query_error = err.as_query_error().expect("query error");
        assert_eq!(query_error.code, 0xbad);
        assert_eq!(query_error.message, "Bork");
        assert_eq!(query_error.cql, None);
    }

    #[tokio::test]
    async fn query_error_carries_query_text() {
        let request = Request::query("SELECT * FROM everything", Consistency::All);
        let err = run(Response::Error(ErrorResponse::new(0xbad, "Bork")), &request)
            .await
            .unwrap_err();
        match err {
            ClientError::Query(query_error) => {
                assert_eq!(query_error.code, 0xbad);
                assert_eq!(query_error.message, "Bork");
                assert_eq!(query_error.cql.as_deref(), Some("SELECT * FROM everything"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn prepare_errors_have_no_query_text() {
        let request = Request::prepare("SELECT * FROM everything");
        let err = run(Response::Error(ErrorResponse::new(0x2000, "syntax")), &request)
            .await
            .unwrap_err();
        assert_eq!(err.as_query_error().and_then(|e| e.cql.clone()), None);
    }

    #[tokio::test]
    async fn other_responses_resolve_to_void() {
        let others = [
            Response::Ready,
            Response::Supported(BTreeMap::new()),
            Response::Result(ResultResponse::SchemaChange(SchemaChange {
                change: "CREATED".to_string(),
                keyspace: "ks".to_string(),
                table: String::new(),
            })),
            Response::Event(Event::SchemaChange(SchemaChange {
                change: "DROPPED".to_string(),
                keyspace: "ks".to_string(),
                table: "t".to_string(),
            })),
        ];
        for response in others {
            assert!(run(response, &request()).await.unwrap().is_void());
        }
    }

    #[tokio::test]
    async fn connection_errors_pass_through() {
        let connection = StubConnection::resolving(Err(ConnectionError::Canceled));
        let err = RequestRunner::new()
            .execute(&connection, &request())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Connection(ConnectionError::Canceled)
        ));
    }

    #[test]
    fn runs_without_a_runtime_when_no_timeout_is_set() {
        use std::future::Future;
        use std::task::{Context, Poll, Waker};

        let connection = StubConnection::answering(Response::Result(ResultResponse::Void));
        let runner = RequestRunner::new();
        let request = request();
        let mut future = std::pin::pin!(runner.execute(&connection, &request));
        let mut cx = Context::from_waker(Waker::noop());
        match future.as_mut().poll(&mut cx) {
            Poll::Ready(outcome) => assert!(outcome.unwrap().is_void()),
            Poll::Pending => panic!("stub answers without suspending"),
        }
    }

    #[tokio::test]
    async fn times_out_when_configured() {
        let runner = RequestRunner::with_config(RunnerConfig {
            request_timeout: Some(Duration::from_millis(10)),
        });
        let err = runner.execute(&NeverAnswers, &request()).await.unwrap_err();
        assert!(matches!(err, ClientError::Timeout(limit) if limit == Duration::from_millis(10)));
    }
}
