use jsonwebtoken::{Algorithm, DecodingKey, Validation};

use super::{claims::Claims, error::JwtError};

/// Checks assertions the same way the authorization server does: signature with the issuer public
/// key plus the issuer, audience and time-bound claims.
pub struct AssertionVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl AssertionVerifier {
    pub fn try_new(
        public_key: &[u8],
        algorithm: Algorithm,
        issuer: &str,
        audience: &str,
    ) -> Result<Self, JwtError> {
        let decoding_key = {
            use Algorithm::*;
            match algorithm {
                HS256 | HS384 | HS512 => Ok(DecodingKey::from_secret(public_key)),
                ES256 | ES384 => DecodingKey::from_ec_pem(public_key),
                EdDSA => DecodingKey::from_ed_pem(public_key),
                RS256 | RS384 | RS512 | PS256 | PS384 | PS512 => DecodingKey::from_rsa_pem(public_key),
            }
        }
        .map_err(JwtError::InvalidKey)?;

        let mut validation = Validation::new(algorithm);
        validation.validate_nbf = true;
        validation.set_issuer(&[issuer]);
        validation.set_audience(&[audience]);
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);

        Ok(Self {
            decoding_key,
            validation,
        })
    }

    pub fn verify(&self, assertion: &str) -> Result<Claims, JwtError> {
        jsonwebtoken::decode::<Claims>(assertion, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(JwtError::TokenDecoding)
    }
}
