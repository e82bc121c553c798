use http::{Request, Response};
use thiserror::Error;

/// An enumeration of potential errors related to the HTTP client.
#[derive(Error, Debug)]
pub enum HttpClientError {
    /// The request could not be delivered or no response was obtained.
    #[error("transport error: `{0}`")]
    TransportError(String),
    /// A response was obtained but it could not be read.
    #[error("invalid response: `{0}`")]
    InvalidResponse(String),
}

/// The `HttpClient` trait defines the interface to send requests to the remote services.
///
/// Responses with status codes outside the 2XX range are returned as regular responses, only
/// failures below the HTTP layer are reported as errors.
pub trait HttpClient {
    fn send(&self, request: Request<Vec<u8>>) -> Result<Response<Vec<u8>>, HttpClientError>;
}
