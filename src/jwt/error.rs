use jsonwebtoken::errors;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("unable to encode token: `{0}`")]
    TokenEncoding(errors::Error),
    #[error("unable to decode token: `{0}`")]
    TokenDecoding(errors::Error),
    #[error("invalid key: `{0}`")]
    InvalidKey(errors::Error),
    #[error("invalid timestamp: `{0}`")]
    InvalidTimestamp(String),
}
