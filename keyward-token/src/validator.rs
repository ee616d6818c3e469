//! Freshness validation of local tokens.

use crate::clock::{Clock, SystemClock};
use crate::error::TokenError;
use crate::payload::{parse_timestamp, LicensePayload};
use crate::token::LocalToken;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Seconds in one day.
pub const SECS_PER_DAY: i64 = 24 * 60 * 60;

/// Outcome category of a validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    /// Token is intact and within the check interval.
    Success,
    /// Token is intact but due for a server re-check.
    Warning,
    /// Token is missing, malformed, or tampered with.
    Error,
}

/// The result of validating a local token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Outcome category.
    pub status: ValidationStatus,
    /// Human-readable reason.
    pub message: String,
    /// Whether the token may be trusted without contacting the server.
    pub valid: bool,
    /// The decoded payload, for `Success` and `Warning` outcomes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<LicensePayload>,
}

impl ValidationResult {
    /// A fresh, intact token.
    #[must_use]
    pub fn success(payload: LicensePayload) -> Self {
        Self {
            status: ValidationStatus::Success,
            message: "token is valid".to_string(),
            valid: true,
            payload: Some(payload),
        }
    }

    /// An intact token that should be re-checked with the server.
    #[must_use]
    pub fn warning(message: impl Into<String>, payload: LicensePayload) -> Self {
        Self {
            status: ValidationStatus::Warning,
            message: message.into(),
            valid: false,
            payload: Some(payload),
        }
    }

    /// A token that cannot be used.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ValidationStatus::Error,
            message: message.into(),
            valid: false,
            payload: None,
        }
    }

    /// Returns true if the token is intact but past its check interval.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.status == ValidationStatus::Warning
    }
}

impl From<TokenError> for ValidationResult {
    fn from(err: TokenError) -> Self {
        Self::error(err.to_string())
    }
}

/// Validates tokens against a clock.
#[derive(Debug, Clone, Default)]
pub struct TokenValidator<C = SystemClock> {
    clock: C,
}

impl TokenValidator<SystemClock> {
    /// Creates a validator that uses the wall clock.
    #[must_use]
    pub fn new() -> Self {
        Self { clock: SystemClock }
    }
}

impl<C: Clock> TokenValidator<C> {
    /// Creates a validator with a custom clock.
    pub fn with_clock(clock: C) -> Self {
        Self { clock }
    }

    /// Returns the validator's clock.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Validates `token` against `check_interval_days`.
    pub fn validate(&self, token: Option<&str>, check_interval_days: u32) -> ValidationResult {
        validate_at(token, check_interval_days, self.clock.now())
    }
}

/// Validates `token` against the wall clock.
#[must_use]
pub fn validate(token: Option<&str>, check_interval_days: u32) -> ValidationResult {
    validate_at(token, check_interval_days, Utc::now())
}

/// Validates `token` as of `now`.
///
/// A token is stale when more than `check_interval_days` days have passed
/// since its `last_checked_at`. A payload without `last_checked_at` never
/// goes stale; one whose timestamp cannot be parsed always is.
#[must_use]
pub fn validate_at(
    token: Option<&str>,
    check_interval_days: u32,
    now: DateTime<Utc>,
) -> ValidationResult {
    let token = match LocalToken::parse(token.unwrap_or_default()) {
        Ok(token) => token,
        Err(err) => {
            debug!("local token rejected: {}", err);
            return err.into();
        }
    };

    let payload = match token.decode_payload() {
        Ok(payload) => payload,
        Err(err) => {
            debug!(
                "local token {} payload undecodable: {}",
                token.short_id(),
                err.detail().unwrap_or_default()
            );
            return err.into();
        }
    };

    if is_stale(&payload, check_interval_days, now) {
        debug!("local token {} past {} day check interval", token.short_id(), check_interval_days);
        return ValidationResult::warning("check interval exceeded", payload);
    }

    ValidationResult::success(payload)
}

fn is_stale(payload: &LicensePayload, check_interval_days: u32, now: DateTime<Utc>) -> bool {
    let Some(raw) = payload.last_checked_at.as_deref() else {
        if payload.has_malformed_last_checked() {
            warn!(
                "non-string last_checked_at {}, treating token as stale",
                payload.extra["last_checked_at"]
            );
            return true;
        }
        return false;
    };

    match parse_timestamp(raw) {
        Some(checked_at) => {
            (now - checked_at).num_seconds() > i64::from(check_interval_days) * SECS_PER_DAY
        }
        None => {
            warn!("unparseable last_checked_at {:?}, treating token as stale", raw);
            true
        }
    }
}
