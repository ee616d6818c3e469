//! Results of the orchestration operations.

use keyward_token::ValidationResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome of [`LicenseClient::setup_or_validate`](crate::LicenseClient::setup_or_validate).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum SetupResult {
    /// A usable token.
    Success {
        /// The raw local token.
        token: String,
        /// True if the token came from the store without a server call.
        cached: bool,
        /// True if the returned token is in the store: a cache hit, or a
        /// fresh token that was written successfully.
        persisted: bool,
    },
    /// The license could not be set up.
    Error {
        /// `"error"` for local failures, otherwise the server's status verbatim.
        status: String,
        /// Reason for the failure.
        message: String,
    },
}

impl SetupResult {
    /// A local failure.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            status: "error".to_string(),
            message: message.into(),
        }
    }

    /// Copies `status` and `message` from a server response that did not
    /// carry a token.
    #[must_use]
    pub fn from_response(response: &Value) -> Self {
        let field = |name: &str| response.get(name).and_then(Value::as_str).map(str::to_string);
        Self::Error {
            status: field("status").unwrap_or_else(|| "error".to_string()),
            message: field("message")
                .unwrap_or_else(|| "license server did not issue a local token".to_string()),
        }
    }

    /// Returns true for [`SetupResult::Success`].
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Returns the token, if one was obtained.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        match self {
            Self::Success { token, .. } => Some(token),
            Self::Error { .. } => None,
        }
    }

    /// Returns the failure message, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Error { message, .. } => Some(message),
        }
    }
}

/// A validation that may have triggered a token refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshedValidation {
    /// Validation of the token now in the store.
    #[serde(flatten)]
    pub result: ValidationResult,
    /// True if a new token was fetched and validated.
    pub refreshed: bool,
}

impl RefreshedValidation {
    /// Returns whether the resulting token is valid.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.result.valid
    }
}
