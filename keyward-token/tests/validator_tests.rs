mod common;

use chrono::Duration;
use common::{fixed_now, raw_token, token_checked_days_ago};
use keyward_token::{
    validate, validate_at, FixedClock, LicensePayload, LocalToken, TokenValidator,
    ValidationResult, ValidationStatus,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

// ── Structural failures ──────────────────────────────────────────

#[test]
fn missing_token_is_not_found() {
    for token in [None, Some(""), Some("  ")] {
        let result = validate_at(token, 30, fixed_now());
        assert_eq!(result, ValidationResult::error("token not found"));
        assert!(!result.valid);
    }
}

#[test]
fn wrong_segment_count_is_format_error() {
    let result = validate_at(Some("a.b.c"), 30, fixed_now());
    assert_eq!(result.status, ValidationStatus::Error);
    assert_eq!(result.message, "invalid token format");
    assert!(result.payload.is_none());
}

#[test]
fn bad_hash_is_integrity_error() {
    let raw = token_checked_days_ago(1);
    let tampered = raw.replacen(".sig.", ".sig2.", 1);
    let result = validate_at(Some(tampered.as_str()), 30, fixed_now());
    assert_eq!(result.message, "integrity check failed");
    assert!(!result.valid);
}

#[test]
fn bad_payload_is_decode_error() {
    let raw = raw_token("sig", "{not json");
    let result = validate_at(Some(raw.as_str()), 30, fixed_now());
    assert_eq!(result.message, "failed to decode token data");
    assert_eq!(result.status, ValidationStatus::Error);
}

// ── Freshness ────────────────────────────────────────────────────

#[test]
fn thirty_one_days_old_with_thirty_day_interval_is_warning() {
    let raw = token_checked_days_ago(31);
    let result = validate_at(Some(raw.as_str()), 30, fixed_now());

    assert_eq!(result.status, ValidationStatus::Warning);
    assert_eq!(result.message, "check interval exceeded");
    assert!(!result.valid);
    assert!(result.is_stale());
    assert_eq!(result.payload.unwrap().license_key.as_deref(), Some("K"));
}

#[test]
fn checked_now_is_success_with_payload() {
    let raw = token_checked_days_ago(0);
    let result = validate_at(Some(raw.as_str()), 30, fixed_now());

    assert_eq!(result.status, ValidationStatus::Success);
    assert_eq!(result.message, "token is valid");
    assert!(result.valid);
    let expected = LicensePayload::new("K").checked_at(fixed_now());
    assert_eq!(result.payload, Some(expected));
}

#[test]
fn exactly_at_interval_is_still_valid() {
    let raw = token_checked_days_ago(30);
    assert!(validate_at(Some(raw.as_str()), 30, fixed_now()).valid);
}

#[test]
fn one_second_past_interval_is_stale() {
    let checked = fixed_now() - Duration::days(30) - Duration::seconds(1);
    let payload = LicensePayload::new("K").checked_at(checked);
    let raw = LocalToken::encode("sig", &payload).unwrap().into_string();
    assert!(validate_at(Some(raw.as_str()), 30, fixed_now()).is_stale());
}

#[test]
fn future_timestamp_is_valid() {
    let raw = token_checked_days_ago(-3);
    assert!(validate_at(Some(raw.as_str()), 7, fixed_now()).valid);
}

#[test]
fn payload_without_last_checked_never_goes_stale() {
    let raw = raw_token("sig", r#"{"license_key":"K","license_status":"active"}"#);
    let result = validate_at(Some(raw.as_str()), 7, fixed_now());
    assert!(result.valid);
}

#[test]
fn sql_style_timestamp_is_understood() {
    let raw = raw_token("sig", r#"{"license_key":"K","last_checked_at":"2026-06-10 08:00:00"}"#);
    assert!(validate_at(Some(raw.as_str()), 7, fixed_now()).valid);
    assert!(validate_at(Some(raw.as_str()), 7, fixed_now() + Duration::days(10)).is_stale());
}

#[test]
fn unparseable_timestamp_is_stale() {
    let raw = raw_token("sig", r#"{"license_key":"K","last_checked_at":"last tuesday"}"#);
    let result = validate_at(Some(raw.as_str()), 90, fixed_now());
    assert_eq!(result.status, ValidationStatus::Warning);
}

#[test]
fn wall_clock_validate_accepts_fresh_token() {
    let payload = LicensePayload::new("K").checked_at(chrono::Utc::now());
    let raw = LocalToken::encode("sig", &payload).unwrap().into_string();
    assert!(validate(Some(raw.as_str()), 7).valid);
}

#[test]
fn validator_uses_its_clock() {
    let raw = token_checked_days_ago(10);
    let validator = TokenValidator::with_clock(FixedClock(fixed_now()));
    assert!(validator.validate(Some(raw.as_str()), 14).valid);
    assert!(validator.validate(Some(raw.as_str()), 7).is_stale());

    let later = TokenValidator::with_clock(FixedClock(fixed_now() + Duration::days(5)));
    assert!(later.validate(Some(raw.as_str()), 14).is_stale());
}

// ── Non-string payload fields ────────────────────────────────────

#[test]
fn numeric_license_key_is_passed_through() {
    let raw = raw_token(
        "sig",
        r#"{"license_key":12345,"license_status":"active","last_checked_at":"2026-06-15 00:00:00"}"#,
    );
    let result = validate_at(Some(raw.as_str()), 30, fixed_now());

    assert_eq!(result.status, ValidationStatus::Success);
    assert!(result.valid);
    let payload = result.payload.unwrap();
    assert_eq!(payload.license_key, None);
    assert_eq!(payload.get("license_key"), Some(serde_json::json!(12345)));
    assert_eq!(payload.license_status.as_deref(), Some("active"));
}

#[test]
fn boolean_license_status_is_passed_through() {
    let raw = raw_token(
        "sig",
        r#"{"license_key":"K","license_status":true,"last_checked_at":"2026-06-15 00:00:00"}"#,
    );
    let result = validate_at(Some(raw.as_str()), 30, fixed_now());

    assert!(result.valid);
    assert_eq!(result.payload.unwrap().get("license_status"), Some(serde_json::json!(true)));
}

#[test]
fn numeric_last_checked_at_is_stale_not_undecodable() {
    let raw = raw_token("sig", r#"{"license_key":"K","last_checked_at":1781524800}"#);
    let result = validate_at(Some(raw.as_str()), 90, fixed_now());

    assert_eq!(result.status, ValidationStatus::Warning);
    assert_eq!(result.message, "check interval exceeded");
    assert_eq!(
        result.payload.unwrap().get("last_checked_at"),
        Some(serde_json::json!(1781524800))
    );
}

#[test]
fn null_last_checked_at_never_goes_stale() {
    let raw = raw_token("sig", r#"{"license_key":"K","last_checked_at":null}"#);
    assert!(validate_at(Some(raw.as_str()), 7, fixed_now()).valid);
}

// ── Serialization ────────────────────────────────────────────────

#[test]
fn result_serializes_lowercase_status() {
    let json = serde_json::to_value(ValidationResult::error("token not found")).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"status": "error", "message": "token not found", "valid": false})
    );
}

// ── Properties ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn fresh_tokens_are_valid(
        (interval, days_ago) in (7u32..=90).prop_flat_map(|i| (Just(i), 0i64..=i64::from(i)))
    ) {
        let raw = token_checked_days_ago(days_ago);
        prop_assert!(validate_at(Some(raw.as_str()), interval, fixed_now()).valid);
    }

    #[test]
    fn old_tokens_are_warnings(interval in 7u32..=90, extra in 1i64..400) {
        let raw = token_checked_days_ago(i64::from(interval) + extra);
        let result = validate_at(Some(raw.as_str()), interval, fixed_now());
        prop_assert_eq!(result.status, ValidationStatus::Warning);
        prop_assert!(!result.valid);
    }

    #[test]
    fn tampering_payload_or_hash1_fails_integrity(index in any::<prop::sample::Index>(), in_hash1 in any::<bool>()) {
        let raw = token_checked_days_ago(1);
        let mut parts: Vec<String> = raw.split('.').map(String::from).collect();
        let target = if in_hash1 { 1 } else { 2 };
        let mut chars: Vec<char> = parts[target].chars().collect();
        let at = index.index(chars.len());
        chars[at] = if chars[at] == 'A' { 'B' } else { 'A' };
        parts[target] = chars.into_iter().collect();

        let result = validate_at(Some(parts.join(".").as_str()), 30, fixed_now());
        prop_assert_eq!(result.message, "integrity check failed");
    }

    #[test]
    fn non_five_segment_tokens_are_format_errors(
        segments in prop::collection::vec("[A-Za-z0-9+/=]{0,12}", 1..12)
    ) {
        prop_assume!(segments.len() != 5);
        let raw = segments.join(".");
        prop_assume!(!raw.trim().is_empty());
        let result = validate_at(Some(raw.as_str()), 30, fixed_now());
        prop_assert_eq!(result.message, "invalid token format");
    }
}
