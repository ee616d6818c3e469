//! Local license token handling for keyward.
//!
//! This crate handles:
//! - Parsing the five-segment local token issued by the license server
//! - Integrity verification of the embedded payload hash
//! - Freshness checks against a configurable re-check interval
//! - Encoding tokens in the server's wire format (tests and tooling)
//!
//! # Token Format
//!
//! Tokens are formatted as:
//! `random1.hash1.base64(payload).sha256hex(hash1 + base64(payload)).random2`
//!
//! The padding segments carry no meaning. `hash1` is a server signature the
//! client has no key for, so it is accepted as-is; only the second hash is
//! recomputed locally.

mod clock;
mod error;
mod payload;
mod token;
mod validator;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{TokenError, TokenResult};
pub use payload::{parse_timestamp, LicensePayload};
pub use token::{integrity_hash, LocalToken, SEGMENT_COUNT};
pub use validator::{
    validate, validate_at, TokenValidator, ValidationResult, ValidationStatus, SECS_PER_DAY,
};
