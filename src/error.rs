use crate::http::client::HttpClientError;
use thiserror::Error;
use tracing::error;

/// Classification of every failure that can happen while signing, fetching a token or calling
/// the Classic API. Public operations log it and return `None`.
#[derive(Error, Debug, PartialEq)]
pub enum CallError {
    #[error("transport failure: `{0}`")]
    Transport(String),
    #[error("unsuccessful status code {status}: `{body}`")]
    Status { status: u16, body: String },
    #[error("malformed response: `{0}`")]
    MalformedResponse(String),
    #[error("signing failure: `{0}`")]
    Signing(String),
}

impl CallError {
    /// Stable label logged as the `error_class` field.
    pub fn class(&self) -> &'static str {
        match self {
            CallError::Transport(_) => "transport",
            CallError::Status { .. } => "http_status",
            CallError::MalformedResponse(_) => "malformed_response",
            CallError::Signing(_) => "signing",
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            CallError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<HttpClientError> for CallError {
    fn from(err: HttpClientError) -> Self {
        match err {
            HttpClientError::TransportError(msg) => CallError::Transport(msg),
            HttpClientError::InvalidResponse(msg) => CallError::MalformedResponse(msg),
        }
    }
}

/// Context of the request that failed, as it is reported to the logs.
pub(crate) struct FailedRequest<'a> {
    pub(crate) endpoint: &'a str,
    pub(crate) request: &'a str,
    pub(crate) headers: Vec<String>,
}

/// Logs the failure with its classification and full request context.
pub(crate) fn log_failure(err: &CallError, failed: &FailedRequest<'_>) {
    error!(
        error_class = %err.class(),
        endpoint = %failed.endpoint,
        request = %failed.request,
        headers = ?failed.headers,
        status = ?err.status(),
        "request failed: {err}"
    );
}
