use crate::http::client::{HttpClient, HttpClientError};
use crate::http::config::HttpConfig;
use http::{Request, Response};
use std::io::Read;
use ureq::Agent;

#[derive(thiserror::Error, Debug)]
pub enum UreqResponseError {
    #[error("error parsing response: `{0}`")]
    ErrorParsingResponse(String),
    #[error("error building response: `{0}`")]
    ErrorBuildingResponse(String),
}

/// Builds a ureq agent with the configured timeouts and user agent.
pub fn build_ureq(config: HttpConfig) -> Agent {
    ureq::AgentBuilder::new()
        .timeout_connect(config.conn_timeout)
        .timeout(config.timeout)
        .user_agent(&config.user_agent)
        .build()
}

/// Helper to build a [http::Response<Vec<u8>>] from a ureq response, including status, version,
/// headers and body.
pub fn build_response(response: ureq::Response) -> Result<Response<Vec<u8>>, UreqResponseError> {
    let http_version = match response.http_version() {
        "HTTP/0.9" => http::Version::HTTP_09,
        "HTTP/1.0" => http::Version::HTTP_10,
        "HTTP/2.0" => http::Version::HTTP_2,
        "HTTP/3.0" => http::Version::HTTP_3,
        _ => http::Version::HTTP_11,
    };

    let mut response_builder = http::Response::builder()
        .status(response.status())
        .version(http_version);
    for name in response.headers_names() {
        if let Some(value) = response.header(&name) {
            response_builder = response_builder.header(name.as_str(), value);
        }
    }

    let mut buf: Vec<u8> = vec![];
    response
        .into_reader()
        .read_to_end(&mut buf)
        .map_err(|e| UreqResponseError::ErrorParsingResponse(e.to_string()))?;

    response_builder
        .body(buf)
        .map_err(|e| UreqResponseError::ErrorBuildingResponse(e.to_string()))
}

/// [HttpClient] implementation backed by a ureq [Agent].
#[derive(Clone)]
pub struct UreqHttpClient {
    agent: Agent,
}

impl UreqHttpClient {
    pub fn new(config: HttpConfig) -> Self {
        Self {
            agent: build_ureq(config),
        }
    }
}

impl HttpClient for UreqHttpClient {
    fn send(&self, request: Request<Vec<u8>>) -> Result<Response<Vec<u8>>, HttpClientError> {
        // Requests are built from the agent so its timeouts and user agent apply.
        let mut req = self.agent.request(
            request.method().as_str(),
            request.uri().to_string().as_str(),
        );
        for (header_name, header_value) in request.headers() {
            let header_val = header_value.to_str().map_err(|e| {
                HttpClientError::TransportError(format!("setting request header: {e}"))
            })?;
            req = req.set(header_name.as_str(), header_val);
        }

        let result = if request.body().is_empty() {
            req.call()
        } else {
            req.send_bytes(request.body())
        };

        // ureq reports non 2XX responses as errors, they are regular responses here.
        match result {
            Ok(response) | Err(ureq::Error::Status(_, response)) => build_response(response)
                .map_err(|err| HttpClientError::InvalidResponse(err.to_string())),
            Err(ureq::Error::Transport(e)) => Err(HttpClientError::TransportError(e.to_string())),
        }
    }
}
