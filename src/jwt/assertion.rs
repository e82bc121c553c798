use std::time::Duration;

use jsonwebtoken::get_current_timestamp;
use tracing::{debug, error};

use crate::config::ClientConfig;
use crate::error::CallError;

use super::claims::Claims;
use super::signer::local::{LocalPrivateKeySigner, LocalPrivateKeySignerConfig};
use super::signer::JwtSigner;

/// Builds the signed assertion presented to the access-token endpoint for a member.
///
/// Signing never fails towards the caller: when the key material is unusable the failure is
/// logged and an empty assertion is produced, which the authorization server then rejects.
pub struct AssertionSigner<S> {
    signer: Option<S>,
    issuer: String,
    audience: String,
    lifetime: Duration,
}

impl<S> AssertionSigner<S>
where
    S: JwtSigner,
{
    pub fn new(signer: Option<S>, issuer: String, audience: String, lifetime: Duration) -> Self {
        Self {
            signer,
            issuer,
            audience,
            lifetime,
        }
    }

    pub fn sign_assertion(&self, member: &str) -> String {
        self.try_sign_assertion(member).unwrap_or_else(|err| {
            error!(error_class = %err.class(), member, "could not sign assertion: {err}");
            String::new()
        })
    }

    fn try_sign_assertion(&self, member: &str) -> Result<String, CallError> {
        let signer = self
            .signer
            .as_ref()
            .ok_or_else(|| CallError::Signing("no usable signing key configured".to_string()))?;

        let now = get_current_timestamp();
        let expires_at = now.checked_add(self.lifetime.as_secs()).ok_or_else(|| {
            CallError::Signing(format!(
                "assertion lifetime of {}s overflows the expiration time",
                self.lifetime.as_secs()
            ))
        })?;
        let claims = Claims::for_member(&self.issuer, member, &self.audience, now, expires_at);

        let signed = signer
            .sign(claims)
            .map_err(|err| CallError::Signing(err.to_string()))?;
        debug!(member, issuer = %self.issuer, expires_at = %signed.expires_at(), "assertion signed");
        Ok(signed.into_value())
    }
}

impl AssertionSigner<LocalPrivateKeySigner> {
    /// Builds the signer from the configured private key. A missing or unusable key is logged
    /// and every assertion produced afterwards is empty.
    pub fn from_config(config: &ClientConfig) -> Self {
        let signer = config
            .private_key
            .as_ref()
            .ok_or_else(|| CallError::Signing("no private key configured".to_string()))
            .and_then(|private_key| {
                LocalPrivateKeySigner::try_from(LocalPrivateKeySignerConfig {
                    private_key: private_key.as_bytes().to_vec(),
                    algorithm: config.algorithm,
                })
                .map_err(|err| CallError::Signing(err.to_string()))
            })
            .map_err(|err| error!(error_class = %err.class(), "unusable signing key: {err}"))
            .ok();

        Self::new(
            signer,
            config.issuer.clone(),
            config.token_url(),
            config.assertion_lifetime,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::signer::local::tests::{ed25519_signer, ED25519_PUBLIC_KEY};
    use crate::jwt::verifier::AssertionVerifier;
    use jsonwebtoken::Algorithm;
    use tracing_test::traced_test;

    const AUDIENCE: &str = "https://auth.example.com/token";

    #[traced_test]
    #[test]
    fn test_assertion_claims() {
        let assertion_signer = AssertionSigner::new(
            Some(ed25519_signer()),
            "issuer".to_string(),
            AUDIENCE.to_string(),
            Duration::from_secs(300),
        );
        let before = get_current_timestamp();

        let assertion = assertion_signer.sign_assertion("m1");

        let verifier = AssertionVerifier::try_new(
            ED25519_PUBLIC_KEY.as_bytes(),
            Algorithm::EdDSA,
            "issuer",
            AUDIENCE,
        )
        .unwrap();
        let claims = verifier.verify(&assertion).unwrap();
        assert_eq!(claims.sub, "m1");
        assert_eq!(claims.iss, "issuer");
        assert_eq!(claims.aud, AUDIENCE);
        assert!(claims.iat >= before);
        assert_eq!(claims.nbf, claims.iat);
        assert_eq!(claims.exp, claims.iat + 300);
        assert!(logs_contain("assertion signed"));
        assert!(logs_contain("expires_at="));
    }

    #[test]
    fn test_assertions_are_unique() {
        let assertion_signer = AssertionSigner::new(
            Some(ed25519_signer()),
            "issuer".to_string(),
            AUDIENCE.to_string(),
            Duration::from_secs(300),
        );

        assert_ne!(
            assertion_signer.sign_assertion("m1"),
            assertion_signer.sign_assertion("m1")
        );
    }

    #[traced_test]
    #[test]
    fn test_missing_signer_yields_empty_assertion() {
        let assertion_signer: AssertionSigner<LocalPrivateKeySigner> = AssertionSigner::new(
            None,
            "issuer".to_string(),
            AUDIENCE.to_string(),
            Duration::from_secs(300),
        );

        assert_eq!(assertion_signer.sign_assertion("m1"), "");
        assert!(logs_contain("error_class=signing"));
    }

    #[traced_test]
    #[test]
    fn test_signing_error_yields_empty_assertion() {
        // An expiration that does not fit in a timestamp makes the signer fail.
        let assertion_signer = AssertionSigner::new(
            Some(ed25519_signer()),
            "issuer".to_string(),
            AUDIENCE.to_string(),
            Duration::from_secs(u64::MAX / 2),
        );

        assert_eq!(assertion_signer.sign_assertion("m1"), "");
        assert!(logs_contain("error_class=signing"));
        assert!(logs_contain("invalid timestamp"));
    }

    #[traced_test]
    #[test]
    fn test_overflowing_lifetime_yields_empty_assertion() {
        let assertion_signer = AssertionSigner::new(
            Some(ed25519_signer()),
            "issuer".to_string(),
            AUDIENCE.to_string(),
            Duration::from_secs(u64::MAX),
        );

        assert_eq!(assertion_signer.sign_assertion("m1"), "");
        assert!(logs_contain("error_class=signing"));
        assert!(logs_contain("overflows the expiration time"));
    }
}
