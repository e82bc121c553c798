//! # JWT assertions for the JWT-bearer grant
//!
//! Assertions follow RFC 7523 section 2.1: the member is the subject, the configured issuer
//! signs, and the access-token endpoint is the audience.
pub mod assertion;
pub mod claims;
pub mod error;
pub mod signed;
pub mod signer;
pub mod verifier;
