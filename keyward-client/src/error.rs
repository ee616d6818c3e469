//! Error types for license orchestration.

use thiserror::Error;

/// Failures talking to the license server.
///
/// These are distinct from the server *declining* a license, which is
/// reported as a [`SetupResult::Error`](crate::SetupResult::Error).
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request never produced a response.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The server answered with a non-2xx status.
    #[error("server returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not a JSON object.
    #[error("malformed response: {0}")]
    Decode(String),
}

#[cfg(feature = "online")]
impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Status {
                status: status.as_u16(),
                body: String::new(),
            }
        } else {
            Self::Connection(err.to_string())
        }
    }
}

/// Licensing errors.
#[derive(Debug, Error)]
pub enum LicenseError {
    /// Check interval outside the accepted range.
    #[error("check interval must be between 7 and 90 days, got {0}")]
    InvalidCheckInterval(u32),

    /// Invalid client configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Network or protocol failure.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Token store failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LicenseError {
    /// Returns true if the error came from the transport layer.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Returns the HTTP status if the server answered with a non-2xx code.
    #[must_use]
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Transport(TransportError::Status { status, .. }) => Some(*status),
            _ => None,
        }
    }
}

/// Result type for license operations.
pub type LicenseResult<T> = Result<T, LicenseError>;
