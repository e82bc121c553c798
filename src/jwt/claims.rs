use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Claim set of a member assertion (RFC 7523 section 3). Timestamps are UTC seconds.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub(crate) jti: Ulid,
    pub(crate) iss: String,
    /// Member the token is requested for.
    pub(crate) sub: String,
    /// Access-token endpoint URL.
    pub(crate) aud: String,
    pub(crate) iat: u64,
    pub(crate) nbf: u64,
    pub(crate) exp: u64,
}

impl Claims {
    /// Claims usable from `issued_at` until `expires_at`, identified by a fresh `jti`.
    pub fn for_member(
        issuer: &str,
        member: &str,
        audience: &str,
        issued_at: u64,
        expires_at: u64,
    ) -> Self {
        Self {
            jti: Ulid::new(),
            iss: issuer.to_string(),
            sub: member.to_string(),
            aud: audience.to_string(),
            iat: issued_at,
            nbf: issued_at,
            exp: expires_at,
        }
    }
}
