//! # Client configuration
//!
//! Loaded once before the client is built, from a YAML file whose values can be overridden with
//! `CLASSIC_API_CLIENT_`-prefixed environment variables.
use crate::http::config::{HttpConfig, DEFAULT_CONN_TIMEOUT, DEFAULT_TIMEOUT};
use crate::http::endpoint_url;
use crate::MemberId;
use config::{Config, Environment, File, FileFormat};
use duration_str::deserialize_duration;
use jsonwebtoken::Algorithm;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const ENV_PREFIX: &str = "CLASSIC_API_CLIENT";

/// Time the authorization backend needs before a freshly issued token is usable.
pub const DEFAULT_CONSISTENCY_DELAY: Duration = Duration::from_millis(500);
pub const DEFAULT_ASSERTION_LIFETIME: Duration = Duration::from_secs(300);

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("loading config: `{0}`")]
    Load(#[from] config::ConfigError),
    #[error("reading key file `{path}`: `{err}`")]
    KeyFile { path: PathBuf, err: std::io::Error },
}

#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct ClientConfig {
    /// Issuer of the assertions.
    pub issuer: String,
    /// PEM private key (or HMAC secret) used to sign assertions.
    #[serde(default)]
    pub private_key: Option<String>,
    /// File holding the private key. Ignored when `private_key` is set.
    #[serde(default)]
    pub private_key_path: Option<PathBuf>,
    /// PEM public key paired with the private key.
    #[serde(default)]
    pub public_key: Option<String>,
    /// File holding the public key. Ignored when `public_key` is set.
    #[serde(default)]
    pub public_key_path: Option<PathBuf>,
    #[serde(default = "default_algorithm")]
    pub algorithm: Algorithm,
    /// OAuth client key sent as `client_id`.
    pub client_key: String,
    /// Host and path of the access-token endpoint.
    pub access_token_host: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Member whose token is fetched once and reused by every call of the client.
    #[serde(default)]
    pub default_member: Option<MemberId>,
    #[serde(
        default = "default_consistency_delay",
        deserialize_with = "deserialize_duration"
    )]
    pub consistency_delay: Duration,
    #[serde(
        default = "default_assertion_lifetime",
        deserialize_with = "deserialize_duration"
    )]
    pub assertion_lifetime: Duration,
    #[serde(default = "default_timeout", deserialize_with = "deserialize_duration")]
    pub timeout: Duration,
    #[serde(
        default = "default_connect_timeout",
        deserialize_with = "deserialize_duration"
    )]
    pub connect_timeout: Duration,
}

fn default_algorithm() -> Algorithm {
    Algorithm::RS256
}

fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

fn default_consistency_delay() -> Duration {
    DEFAULT_CONSISTENCY_DELAY
}

fn default_assertion_lifetime() -> Duration {
    DEFAULT_ASSERTION_LIFETIME
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

fn default_connect_timeout() -> Duration {
    DEFAULT_CONN_TIMEOUT
}

impl ClientConfig {
    /// Loads the configuration file, applies environment overrides and resolves the key material.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config: ClientConfig = Config::builder()
            .add_source(File::from(path).format(FileFormat::Yaml))
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?
            .try_deserialize()?;
        config.with_resolved_keys()
    }

    /// Reads keys configured by path and normalizes escaped line breaks of inline keys.
    pub fn with_resolved_keys(self) -> Result<Self, ConfigError> {
        let private_key = resolve_key(self.private_key, self.private_key_path.as_deref())?;
        let public_key = resolve_key(self.public_key, self.public_key_path.as_deref())?;
        Ok(Self {
            private_key,
            public_key,
            ..self
        })
    }

    /// URL the token requests are sent to.
    pub fn token_url(&self) -> String {
        endpoint_url(&self.access_token_host)
    }

    pub fn http_config(&self) -> HttpConfig {
        HttpConfig::new(
            self.timeout,
            self.connect_timeout,
            self.user_agent.clone(),
        )
    }
}

fn resolve_key(inline: Option<String>, path: Option<&Path>) -> Result<Option<String>, ConfigError> {
    match (inline, path) {
        (Some(key), _) => Ok(Some(key.replace("\\n", "\n"))),
        (None, Some(path)) => std::fs::read_to_string(path)
            .map(Some)
            .map_err(|err| ConfigError::KeyFile {
                path: path.to_path_buf(),
                err,
            }),
        (None, None) => Ok(None),
    }
}
