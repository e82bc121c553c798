//! # Access token retrieval through the JWT-bearer grant
use crate::error::{log_failure, CallError, FailedRequest};
use crate::http::client::HttpClient;
use crate::http::successful_body;
use crate::jwt::assertion::AssertionSigner;
use crate::jwt::signer::JwtSigner;
use crate::AccessToken;
use http::{Method, Request};
use serde_json::Value;
use std::thread::sleep;
use std::time::Duration;
use tracing::debug;

pub const JWT_BEARER_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ACCESS_TOKEN_FIELD: &str = "access_token";

pub trait TokenFetcher {
    /// Returns the access token for the member, `None` if it could not be obtained.
    fn fetch_token(&self, member: &str) -> Option<AccessToken>;
}

/// Exchanges signed member assertions for access tokens at the access-token endpoint.
///
/// POST <token_url>
/// client_id=<client_key>&grant_type=urn:ietf:params:oauth:grant-type:jwt-bearer&assertion=<JWT>
///
/// Response:
/// {
///    "access_token": "<token>",
///    ...
/// }
pub struct HttpTokenFetcher<C, S> {
    http_client: C,
    assertion_signer: AssertionSigner<S>,
    client_key: String,
    token_url: String,
    consistency_delay: Duration,
}

impl<C, S> HttpTokenFetcher<C, S>
where
    C: HttpClient,
    S: JwtSigner,
{
    pub fn new(
        http_client: C,
        assertion_signer: AssertionSigner<S>,
        client_key: String,
        token_url: String,
    ) -> Self {
        Self {
            http_client,
            assertion_signer,
            client_key,
            token_url,
            consistency_delay: Duration::ZERO,
        }
    }

    /// Delay applied after every successful fetch. The authorization backend replicates tokens
    /// asynchronously and rejects tokens used right after being issued.
    pub fn with_consistency_delay(self, consistency_delay: Duration) -> Self {
        Self {
            consistency_delay,
            ..self
        }
    }

    /// Form-encoded token request body. Values are written verbatim.
    pub fn request_body(&self, member: &str) -> String {
        format!(
            "client_id={}&grant_type={}&assertion={}",
            self.client_key,
            JWT_BEARER_GRANT_TYPE,
            self.assertion_signer.sign_assertion(member)
        )
    }

    fn try_fetch_token(&self, body: &str) -> Result<AccessToken, CallError> {
        let request = Request::builder()
            .method(Method::POST)
            .uri(self.token_url.as_str())
            .body(body.as_bytes().to_vec())
            .map_err(|err| CallError::Transport(format!("building token request: {err}")))?;

        let response = self.http_client.send(request)?;
        let body = successful_body(response)?;
        extract_access_token(&body)
    }
}

impl<C, S> TokenFetcher for HttpTokenFetcher<C, S>
where
    C: HttpClient,
    S: JwtSigner,
{
    fn fetch_token(&self, member: &str) -> Option<AccessToken> {
        let body = self.request_body(member);
        match self.try_fetch_token(&body) {
            Ok(token) => {
                debug!(
                    member,
                    delay_ms = self.consistency_delay.as_millis() as u64,
                    "access token obtained, waiting for the authorization backend"
                );
                sleep(self.consistency_delay);
                Some(token)
            }
            Err(err) => {
                log_failure(
                    &err,
                    &FailedRequest {
                        endpoint: &self.token_url,
                        request: &body,
                        headers: Vec::new(),
                    },
                );
                None
            }
        }
    }
}

/// Takes the string value of the top-level field named `access_token`, ignoring ASCII case.
fn extract_access_token(body: &str) -> Result<AccessToken, CallError> {
    let json: Value = serde_json::from_str(body)
        .map_err(|err| CallError::MalformedResponse(format!("invalid JSON body: {err}")))?;
    let fields = json
        .as_object()
        .ok_or_else(|| CallError::MalformedResponse("body is not a JSON object".to_string()))?;

    let (_, value) = fields
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(ACCESS_TOKEN_FIELD))
        .ok_or_else(|| {
            CallError::MalformedResponse(format!("no `{ACCESS_TOKEN_FIELD}` field in body"))
        })?;

    value.as_str().map(String::from).ok_or_else(|| {
        CallError::MalformedResponse(format!("`{ACCESS_TOKEN_FIELD}` is not a string"))
    })
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::http::client::tests::MockHttpClient;
    use crate::http::client::HttpClientError;
    use crate::jwt::signer::local::tests::{ed25519_signer, ED25519_PUBLIC_KEY};
    use crate::jwt::signer::local::LocalPrivateKeySigner;
    use crate::jwt::verifier::AssertionVerifier;
    use assert_matches::assert_matches;
    use jsonwebtoken::Algorithm;
    use mockall::mock;
    use std::time::Instant;
    use tracing_test::traced_test;

    const TOKEN_URL: &str = "https://auth.example.com/token";

    mock! {
        pub TokenFetcher {}

        impl TokenFetcher for TokenFetcher {
            fn fetch_token(&self, member: &str) -> Option<AccessToken>;
        }
    }

    fn fetcher(http_client: MockHttpClient) -> HttpTokenFetcher<MockHttpClient, LocalPrivateKeySigner> {
        let assertion_signer = AssertionSigner::new(
            Some(ed25519_signer()),
            "issuer".to_string(),
            TOKEN_URL.to_string(),
            Duration::from_secs(300),
        );
        HttpTokenFetcher::new(
            http_client,
            assertion_signer,
            "cid".to_string(),
            TOKEN_URL.to_string(),
        )
    }

    #[test]
    fn test_fetch_token() {
        struct TestCase {
            name: &'static str,
            body: &'static str,
            expected: &'static str,
        }

        let cases = vec![
            TestCase {
                name: "lowercase field",
                body: r#"{"access_token": "abc123", "expires_in": 3600, "token_type": "Bearer"}"#,
                expected: "abc123",
            },
            TestCase {
                name: "uppercase field",
                body: r#"{"ACCESS_TOKEN": "abc123"}"#,
                expected: "abc123",
            },
            TestCase {
                name: "mixed case field",
                body: r#"{"token_type": "Bearer", "Access_Token": "xyz"}"#,
                expected: "xyz",
            },
        ];

        for case in cases {
            let mut http_client = MockHttpClient::new();
            http_client.should_respond(200, case.body);

            let token = fetcher(http_client).fetch_token("m1");

            assert_eq!(token.as_deref(), Some(case.expected), "{}", case.name);
        }
    }

    #[test]
    fn test_token_request() {
        let mut http_client = MockHttpClient::new();
        http_client
            .expect_send()
            .once()
            .withf(|request| {
                let body = String::from_utf8_lossy(request.body());
                let Some(assertion) = body.strip_prefix(
                    "client_id=cid&grant_type=urn:ietf:params:oauth:grant-type:jwt-bearer&assertion=",
                ) else {
                    return false;
                };
                let verifier = AssertionVerifier::try_new(
                    ED25519_PUBLIC_KEY.as_bytes(),
                    Algorithm::EdDSA,
                    "issuer",
                    TOKEN_URL,
                )
                .unwrap();
                request.method() == Method::POST
                    && request.uri() == TOKEN_URL
                    && request.headers().is_empty()
                    && verifier
                        .verify(assertion)
                        .is_ok_and(|claims| claims.sub == "m1")
            })
            .return_once(|_| {
                Ok(crate::http::client::tests::response_stub(
                    200,
                    r#"{"access_token":"tok-xyz"}"#,
                ))
            });

        let token = fetcher(http_client).fetch_token("m1");

        assert_eq!(token.as_deref(), Some("tok-xyz"));
    }

    #[traced_test]
    #[test]
    fn test_unauthorized_status() {
        let mut http_client = MockHttpClient::new();
        http_client.should_respond(401, r#"{"access_token": "abc123"}"#);

        let token = fetcher(http_client).fetch_token("m1");

        assert!(token.is_none());
        assert!(logs_contain("error_class=http_status"));
        assert!(logs_contain("status=Some(401)"));
        assert!(logs_contain(TOKEN_URL));
    }

    #[traced_test]
    #[test]
    fn test_non_json_body() {
        let mut http_client = MockHttpClient::new();
        http_client.should_respond(200, "not json");

        let token = fetcher(http_client).fetch_token("m1");

        assert!(token.is_none());
        assert!(logs_contain("error_class=malformed_response"));
    }

    #[traced_test]
    #[test]
    fn test_missing_access_token_field() {
        let mut http_client = MockHttpClient::new();
        http_client.should_respond(200, r#"{"foo": "bar"}"#);

        let token = fetcher(http_client).fetch_token("m1");

        assert!(token.is_none());
        assert!(logs_contain("error_class=malformed_response"));
    }

    #[traced_test]
    #[test]
    fn test_transport_failure() {
        let mut http_client = MockHttpClient::new();
        http_client.should_fail(HttpClientError::TransportError("connection refused".into()));

        let token = fetcher(http_client).fetch_token("m1");

        assert!(token.is_none());
        assert!(logs_contain("error_class=transport"));
        assert!(logs_contain("connection refused"));
        // The request body is part of the failure record.
        assert!(logs_contain("client_id=cid"));
    }

    #[test]
    fn test_consistency_delay() {
        let mut http_client = MockHttpClient::new();
        http_client.should_respond(200, r#"{"access_token": "abc123"}"#);
        let fetcher = fetcher(http_client).with_consistency_delay(Duration::from_millis(500));

        let start = Instant::now();
        let token = fetcher.fetch_token("m1");

        assert_eq!(token.as_deref(), Some("abc123"));
        assert!(start.elapsed() >= Duration::from_millis(500));
    }

    #[test]
    fn test_no_delay_on_failure() {
        let mut http_client = MockHttpClient::new();
        http_client.should_respond(500, "boom");
        let fetcher = fetcher(http_client).with_consistency_delay(Duration::from_secs(5));

        let start = Instant::now();
        assert!(fetcher.fetch_token("m1").is_none());
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_extract_access_token() {
        assert_matches!(
            extract_access_token(r#"{"access_token": 42}"#),
            Err(CallError::MalformedResponse(_))
        );
        assert_matches!(
            extract_access_token(r#"["access_token"]"#),
            Err(CallError::MalformedResponse(_))
        );
        assert_matches!(
            extract_access_token(r#"{"data": {"access_token": "nested"}}"#),
            Err(CallError::MalformedResponse(_))
        );
        assert_eq!(
            extract_access_token(r#"{"access_token": ""}"#),
            Ok(String::new())
        );
    }

    #[test]
    fn test_empty_assertion_is_sent() {
        let mut http_client = MockHttpClient::new();
        http_client
            .expect_send()
            .once()
            .withf(|request| request.body().ends_with(b"&assertion="))
            .return_once(|_| {
                Ok(crate::http::client::tests::response_stub(
                    400,
                    r#"{"error":"invalid_grant"}"#,
                ))
            });
        let assertion_signer: AssertionSigner<LocalPrivateKeySigner> = AssertionSigner::new(
            None,
            "issuer".to_string(),
            TOKEN_URL.to_string(),
            Duration::from_secs(300),
        );
        let fetcher = HttpTokenFetcher::new(
            http_client,
            assertion_signer,
            "cid".to_string(),
            TOKEN_URL.to_string(),
        );

        assert!(fetcher.fetch_token("m1").is_none());
    }
}
