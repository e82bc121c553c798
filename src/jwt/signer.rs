use super::{claims::Claims, error::JwtError, signed::SignedJwt};

pub mod local;

pub trait JwtSigner {
    fn sign(&self, claims: Claims) -> Result<SignedJwt, JwtError>;
}
