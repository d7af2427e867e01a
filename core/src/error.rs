//! Error types shared by the todo service crates.
//!
//! # Design
//! `ValidationError` covers payloads that parse but break a record rule.
//! `IdentityError` covers everything that can go wrong between this service
//! and the identity provider. A rejected request keeps the provider's status
//! and body so the server can decide between 401 and 502.

use thiserror::Error;

/// A payload broke a record rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A non-nullable field was explicitly set to `null`.
    #[error("`{0}` must not be null")]
    NullField(&'static str),
}

/// Errors raised while talking to the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// The provider answered with a non-2xx status.
    #[error("identity provider returned HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    /// The provider's reply could not be deserialized.
    #[error("malformed identity provider response: {0}")]
    Deserialization(String),

    /// The request could not be encoded.
    #[error("could not encode identity provider request: {0}")]
    Serialization(String),

    /// The configured base URL or redirect URI is unusable.
    #[error("invalid identity provider URL: {0}")]
    InvalidUrl(String),

    /// The `state` echoed back on callback was missing, malformed or forged.
    #[error("invalid login state")]
    InvalidState,
}

impl IdentityError {
    /// True when the provider itself refused the request with a 4xx status.
    pub fn is_client_rejection(&self) -> bool {
        matches!(self, IdentityError::Rejected { status, .. } if (400..500).contains(status))
    }
}
