use std::future::Future;

use cqlwire_frame::Response;

use crate::error::ConnectionError;
use crate::request::Request;

/// The capability the runner needs from a connection: send one request and
/// resolve to its decoded response.
///
/// Stream id allocation and correlating responses with requests are left
/// to the implementation.
pub trait Connection: Send + Sync {
    fn send_request(
        &self,
        request: &Request,
    ) -> impl Future<Output = Result<Response, ConnectionError>> + Send;
}
