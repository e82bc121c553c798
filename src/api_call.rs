//! # Authenticated calls to the Classic API
use crate::error::{log_failure, CallError, FailedRequest};
use crate::http::client::HttpClient;
use crate::http::{endpoint_url, successful_body};
use http::header::AUTHORIZATION;
use http::{HeaderValue, Method, Request};
use tracing::debug;
use url::form_urlencoded;

/// Performs calls carrying `Authorization: Bearer <token>`. No retries are performed.
pub struct AuthenticatedCaller<C> {
    http_client: C,
}

impl<C> AuthenticatedCaller<C>
where
    C: HttpClient,
{
    pub fn new(http_client: C) -> Self {
        Self { http_client }
    }

    /// Posts `body` to `https://<host_and_path>` and returns the response body on success.
    pub fn authenticated_post(&self, token: &str, host_and_path: &str, body: &str) -> Option<String> {
        let url = endpoint_url(host_and_path);
        self.call(Method::POST, token, &url, body)
    }

    /// Gets `https://<host_and_path>?<params>` and returns the response body on success.
    pub fn authenticated_get(
        &self,
        token: &str,
        host_and_path: &str,
        params: &[(String, String)],
    ) -> Option<String> {
        let mut url = endpoint_url(host_and_path);
        if !params.is_empty() {
            let query = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(params)
                .finish();
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str(&query);
        }
        self.call(Method::GET, token, &url, "")
    }

    fn call(&self, method: Method, token: &str, url: &str, body: &str) -> Option<String> {
        debug!(%method, url, "calling classic API");
        self.try_call(method, token, url, body)
            .map_err(|err| {
                log_failure(
                    &err,
                    &FailedRequest {
                        endpoint: url,
                        request: body,
                        headers: vec![AUTHORIZATION.to_string()],
                    },
                )
            })
            .ok()
    }

    fn try_call(
        &self,
        method: Method,
        token: &str,
        url: &str,
        body: &str,
    ) -> Result<String, CallError> {
        let mut auth_header = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|err| {
            CallError::Transport(format!("token is not a valid header value: {err}"))
        })?;
        auth_header.set_sensitive(true);

        let request = Request::builder()
            .method(method)
            .uri(url)
            .header(AUTHORIZATION, auth_header)
            .body(body.as_bytes().to_vec())
            .map_err(|err| CallError::Transport(format!("building request: {err}")))?;

        let response = self.http_client.send(request)?;
        successful_body(response)
    }
}
