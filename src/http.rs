//! # HTTP transport used to reach the access-token endpoint and the Classic API
pub mod client;
pub mod config;
pub mod ureq;

use crate::error::CallError;
use http::Response;

const HTTP_SCHEME: &str = "http://";
const HTTPS_SCHEME: &str = "https://";

/// Builds the URL for a `host/path` value. Values without scheme are reached through HTTPS, values
/// already carrying an explicit `http://` or `https://` scheme are kept as they are.
pub fn endpoint_url(host_and_path: &str) -> String {
    if host_and_path.starts_with(HTTPS_SCHEME) || host_and_path.starts_with(HTTP_SCHEME) {
        host_and_path.to_string()
    } else {
        format!("{HTTPS_SCHEME}{host_and_path}")
    }
}

/// Returns the response body when the status code is below 400. Successful bodies must be UTF-8.
pub(crate) fn successful_body(response: Response<Vec<u8>>) -> Result<String, CallError> {
    let status = response.status().as_u16();
    let body = response.into_body();
    if status >= 400 {
        return Err(CallError::Status {
            status,
            body: String::from_utf8_lossy(&body).into_owned(),
        });
    }
    String::from_utf8(body)
        .map_err(|err| CallError::MalformedResponse(format!("body is not valid UTF-8: {err}")))
}
