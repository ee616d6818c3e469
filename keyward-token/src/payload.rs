//! The JSON payload carried inside a local token.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Naive timestamp layouts the license server has been seen to emit.
/// Interpreted as UTC.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// The decoded token payload.
///
/// Only `last_checked_at` influences validation. Everything else is passed
/// through untouched, including fields this client does not know about.
///
/// The known fields are filled only when the server sent a string. A known
/// key holding any other JSON value stays in `extra` under its own name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct LicensePayload {
    /// The license key the token was issued for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_key: Option<String>,
    /// Server-side license status (e.g. `active`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_status: Option<String>,
    /// When the server last validated the license.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_checked_at: Option<String>,
    /// Any other fields sent by the server.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<Map<String, Value>> for LicensePayload {
    fn from(mut fields: Map<String, Value>) -> Self {
        let mut take_string = |key: &str| match fields.get(key) {
            Some(Value::String(_)) | Some(Value::Null) => match fields.remove(key) {
                Some(Value::String(s)) => Some(s),
                _ => None,
            },
            _ => None,
        };

        let license_key = take_string("license_key");
        let license_status = take_string("license_status");
        let last_checked_at = take_string("last_checked_at");

        Self {
            license_key,
            license_status,
            last_checked_at,
            extra: fields,
        }
    }
}

impl LicensePayload {
    /// Creates a payload for a license key with no other fields set.
    #[must_use]
    pub fn new(license_key: impl Into<String>) -> Self {
        Self {
            license_key: Some(license_key.into()),
            ..Self::default()
        }
    }

    /// Sets `last_checked_at` to the given instant (RFC 3339, second precision).
    #[must_use]
    pub fn checked_at(mut self, at: DateTime<Utc>) -> Self {
        self.last_checked_at = Some(at.to_rfc3339_opts(chrono::SecondsFormat::Secs, true));
        self
    }

    /// Sets `license_status`.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.license_status = Some(status.into());
        self
    }

    /// Returns the parsed `last_checked_at`, or None if absent or unparseable.
    #[must_use]
    pub fn last_checked(&self) -> Option<DateTime<Utc>> {
        self.last_checked_at.as_deref().and_then(parse_timestamp)
    }

    /// Returns true if the server sent `last_checked_at` as something other
    /// than a string or null.
    #[must_use]
    pub fn has_malformed_last_checked(&self) -> bool {
        self.last_checked_at.is_none() && self.extra.contains_key("last_checked_at")
    }

    /// Looks up a field by name, known or extra.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<Value> {
        let known = match field {
            "license_key" => self.license_key.clone(),
            "license_status" => self.license_status.clone(),
            "last_checked_at" => self.last_checked_at.clone(),
            _ => None,
        };
        known
            .map(Value::String)
            .or_else(|| self.extra.get(field).cloned())
    }
}

/// Parses a server timestamp.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS` (optionally with a `T` separator
/// and fractional seconds), and bare `YYYY-MM-DD`. Zone-less forms are UTC.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
