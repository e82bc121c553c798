use chrono::{offset::LocalResult, TimeZone, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};

use crate::jwt::{claims::Claims, error::JwtError, signed::SignedJwt};

use super::JwtSigner;

#[derive(Debug)]
pub struct LocalPrivateKeySignerConfig {
    pub private_key: Vec<u8>,
    pub algorithm: Algorithm,
}

/// Signs assertions with key material available in memory.
pub struct LocalPrivateKeySigner {
    encoding_key: EncodingKey,
    algorithm: Algorithm,
}

impl TryFrom<LocalPrivateKeySignerConfig> for LocalPrivateKeySigner {
    type Error = JwtError;

    fn try_from(config: LocalPrivateKeySignerConfig) -> Result<Self, Self::Error> {
        let key = config.private_key.as_slice();
        let encoding_key = {
            use Algorithm::*;
            match config.algorithm {
                HS256 | HS384 | HS512 => Ok(EncodingKey::from_secret(key)),
                ES256 | ES384 => EncodingKey::from_ec_pem(key),
                EdDSA => EncodingKey::from_ed_pem(key),
                RS256 | RS384 | RS512 | PS256 | PS384 | PS512 => EncodingKey::from_rsa_pem(key),
            }
        }
        .map_err(JwtError::InvalidKey)?;

        Ok(Self {
            encoding_key,
            algorithm: config.algorithm,
        })
    }
}

impl JwtSigner for LocalPrivateKeySigner {
    fn sign(&self, claims: Claims) -> Result<SignedJwt, JwtError> {
        let exp = i64::try_from(claims.exp).map_err(|_| {
            JwtError::InvalidTimestamp(format!("expiration {} is out of range", claims.exp))
        })?;
        let expiration_date = match Utc.timestamp_opt(exp, 0) {
            LocalResult::Single(date) => date,
            LocalResult::Ambiguous(earliest, latest) => {
                return Err(JwtError::InvalidTimestamp(format!(
                    "ambiguous timestamp. Earliest: {earliest}, Latest: {latest}"
                )))
            }
            LocalResult::None => {
                return Err(JwtError::InvalidTimestamp(format!(
                    "expiration {} is out of range",
                    claims.exp
                )))
            }
        };
        let value = jsonwebtoken::encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(JwtError::TokenEncoding)?;
        Ok(SignedJwt::new(value, expiration_date))
    }
}
