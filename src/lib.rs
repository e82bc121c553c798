//! # Classic API client library
//!
//! Obtains OAuth2 access tokens through the JWT-bearer grant (RFC 7523) on behalf of a member
//! identity and uses them to perform authenticated calls against the Classic API.
//!
//! Every public call returns an `Option`: failures are classified as a [error::CallError],
//! logged, and collapsed to `None`.

pub mod api_call;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod jwt;
pub mod logging;
pub mod token_fetcher;

/// Opaque identifier of the member on whose behalf tokens are requested.
pub type MemberId = String;
/// Bearer credential returned by the access-token endpoint.
pub type AccessToken = String;
