//! Error types for token parsing.

use thiserror::Error;

/// Errors produced while parsing or building a local token.
///
/// The `Display` text of the structural variants is what the validator
/// reports back as its failure message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// No token was supplied, or it was blank.
    #[error("token not found")]
    NotFound,

    /// The token does not consist of exactly five dot-separated segments.
    #[error("invalid token format")]
    InvalidFormat,

    /// The recomputed payload hash does not match the embedded one.
    #[error("integrity check failed")]
    IntegrityCheckFailed,

    /// The payload segment is not base64-encoded JSON.
    #[error("failed to decode token data")]
    Decode(String),

    /// A token could not be assembled from the given parts.
    #[error("failed to encode token: {0}")]
    Encode(String),
}

impl TokenError {
    /// Returns the underlying decoder message, if any.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Decode(detail) | Self::Encode(detail) => Some(detail),
            _ => None,
        }
    }
}

/// Result type for token operations.
pub type TokenResult<T> = Result<T, TokenError>;
