//! # Classic API client
//!
//! Resolves the access token for each call and dispatches the call on the blocking pool.
use crate::api_call::AuthenticatedCaller;
use crate::config::ClientConfig;
use crate::http::client::HttpClient;
use crate::http::ureq::UreqHttpClient;
use crate::jwt::assertion::AssertionSigner;
use crate::jwt::signer::local::LocalPrivateKeySigner;
use crate::token_fetcher::{HttpTokenFetcher, TokenFetcher};
use crate::{AccessToken, MemberId};
use std::sync::{Arc, OnceLock};
use tracing::{debug, error};

pub type ClassicApiHttpClient =
    ClassicApiClient<HttpTokenFetcher<UreqHttpClient, LocalPrivateKeySigner>, UreqHttpClient>;

/// Entry point for Classic API calls on behalf of members.
///
/// When built with a cached member, the token for that member is fetched once, on first use, and
/// it is used by every call of the instance. It takes precedence over the member of each call.
pub struct ClassicApiClient<F, C> {
    inner: Arc<Inner<F, C>>,
}

struct Inner<F, C> {
    token_fetcher: F,
    api_caller: AuthenticatedCaller<C>,
    cached_member: Option<MemberId>,
    cached_token: OnceLock<Option<AccessToken>>,
}

impl<F, C> Clone for ClassicApiClient<F, C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<F, C> ClassicApiClient<F, C>
where
    F: TokenFetcher + Send + Sync + 'static,
    C: HttpClient + Send + Sync + 'static,
{
    pub fn new(
        token_fetcher: F,
        api_caller: AuthenticatedCaller<C>,
        cached_member: Option<MemberId>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                token_fetcher,
                api_caller,
                cached_member,
                cached_token: OnceLock::new(),
            }),
        }
    }

    /// Fetches a fresh token for the member. The cached token is not involved.
    pub fn get_access_token_only(&self, member: &str) -> Option<AccessToken> {
        self.inner.token_fetcher.fetch_token(member)
    }

    pub async fn classic_api_post(
        &self,
        member: &str,
        host_and_path: &str,
        body: &str,
    ) -> Option<String> {
        let (member, host_and_path, body) =
            (member.to_string(), host_and_path.to_string(), body.to_string());
        self.dispatch(move |inner| {
            let token = inner.resolve_token(&member)?;
            inner
                .api_caller
                .authenticated_post(&token, &host_and_path, &body)
        })
        .await
    }

    pub async fn classic_api_get(
        &self,
        member: &str,
        host_and_path: &str,
        params: &[(String, String)],
    ) -> Option<String> {
        let (member, host_and_path, params) =
            (member.to_string(), host_and_path.to_string(), params.to_vec());
        self.dispatch(move |inner| {
            let token = inner.resolve_token(&member)?;
            inner
                .api_caller
                .authenticated_get(&token, &host_and_path, &params)
        })
        .await
    }

    async fn dispatch<T>(&self, call: T) -> Option<String>
    where
        T: FnOnce(&Inner<F, C>) -> Option<String> + Send + 'static,
    {
        let inner = self.inner.clone();
        tokio::task::spawn_blocking(move || call(&inner))
            .await
            .unwrap_or_else(|err| {
                error!(%err, "classic API call task failed");
                None
            })
    }
}

impl<F, C> Inner<F, C>
where
    F: TokenFetcher,
{
    /// Token fetched once for the cached member. Concurrent first callers wait for the same fetch.
    fn cached_token(&self) -> Option<AccessToken> {
        let member = self.cached_member.as_deref()?;
        self.cached_token
            .get_or_init(|| {
                debug!(member, "fetching token for the cached member");
                self.token_fetcher.fetch_token(member)
            })
            .clone()
    }

    // The cached token is used even when it was fetched for another member.
    fn resolve_token(&self, member: &str) -> Option<AccessToken> {
        self.cached_token()
            .or_else(|| self.token_fetcher.fetch_token(member))
    }
}

impl ClassicApiHttpClient {
    /// Builds the client with the HTTP transport, signer and timings from the configuration.
    pub fn from_config(config: &ClientConfig) -> Self {
        let http_client = UreqHttpClient::new(config.http_config());
        let token_fetcher = HttpTokenFetcher::new(
            http_client.clone(),
            AssertionSigner::from_config(config),
            config.client_key.clone(),
            config.token_url(),
        )
        .with_consistency_delay(config.consistency_delay);

        Self::new(
            token_fetcher,
            AuthenticatedCaller::new(http_client),
            config.default_member.clone(),
        )
    }
}
