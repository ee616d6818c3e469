//! Shared test helpers for token tests.

#![allow(dead_code)]

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Duration, TimeZone, Utc};
use keyward_token::{integrity_hash, LicensePayload, LocalToken};

/// A fixed "now" so staleness tests do not depend on the wall clock.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 15, 12, 0, 0).unwrap()
}

/// Builds a token string by hand from raw payload JSON, hashing it correctly.
pub fn raw_token(hash1: &str, payload_json: &str) -> String {
    let encoded = STANDARD.encode(payload_json.as_bytes());
    let hash2 = integrity_hash(hash1, &encoded);
    format!("r1.{hash1}.{encoded}.{hash2}.r2")
}

/// A token for license `K` last checked `days_ago` days before [`fixed_now`].
pub fn token_checked_days_ago(days_ago: i64) -> String {
    let checked = fixed_now() - Duration::days(days_ago);
    let payload = LicensePayload::new("K").checked_at(checked);
    LocalToken::encode("sig", &payload).unwrap().into_string()
}
