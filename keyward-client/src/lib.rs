//! License setup and validation for keyward.
//!
//! This crate decides, for a license key and installation fingerprint,
//! whether the locally cached token can be trusted or the license server has
//! to be asked for a new one:
//! - A valid cached token is returned without any network call
//! - A stale or damaged token is refreshed from the server (or reported,
//!   when auto-refresh is off)
//! - Newly issued tokens are persisted to the token store
//!
//! The HTTP client and the token file are both injected, through the
//! [`Transport`] and [`TokenStore`] traits. Enable the `online` feature for
//! the reqwest-backed [`HttpTransport`].

mod client;
mod config;
mod error;
mod fingerprint;
#[cfg(feature = "online")]
mod http;
mod outcome;
mod store;
mod transport;

pub use client::{LicenseClient, PUBLIC_VALIDATE_PATH, SETUP_OR_VALIDATE_PATH};
pub use config::{
    check_interval_in_range, ClientConfig, DEFAULT_TOKEN_FILE, MAX_CHECK_INTERVAL_DAYS,
    MIN_CHECK_INTERVAL_DAYS,
};
pub use error::{LicenseError, LicenseResult, TransportError};
pub use fingerprint::{Fingerprint, LicenseRequest};
pub use outcome::{RefreshedValidation, SetupResult};
pub use store::{FileTokenStore, TokenStore};
pub use transport::{Method, Transport};

#[cfg(feature = "online")]
pub use http::HttpTransport;

pub use keyward_token::{
    Clock, FixedClock, LicensePayload, SystemClock, ValidationResult, ValidationStatus,
};
