//! Client configuration.

use crate::error::{LicenseError, LicenseResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Shortest accepted check interval, in days.
pub const MIN_CHECK_INTERVAL_DAYS: u32 = 7;

/// Longest accepted check interval, in days.
pub const MAX_CHECK_INTERVAL_DAYS: u32 = 90;

/// File name of the cached token inside the storage directory.
pub const DEFAULT_TOKEN_FILE: &str = "license.token";

/// Configuration for a [`LicenseClient`](crate::LicenseClient).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the license API (e.g. `https://licensing.example.com/api/v1`).
    pub base_url: String,
    /// Directory holding the cached token.
    pub storage_dir: PathBuf,
    /// File name of the cached token.
    pub token_file: String,
    /// HTTP request timeout in seconds.
    pub timeout_secs: u64,
    /// Days a cached token is trusted before re-checking with the server.
    pub check_interval_days: u32,
    /// Whether a stale or damaged token is refreshed automatically.
    pub auto_refresh: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api/v1".to_string(),
            storage_dir: default_storage_dir(),
            token_file: DEFAULT_TOKEN_FILE.to_string(),
            timeout_secs: 30,
            check_interval_days: 30,
            auto_refresh: true,
        }
    }
}

impl ClientConfig {
    /// Creates a config for `base_url` with all other fields defaulted.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Full path of the cached token file.
    #[must_use]
    pub fn token_path(&self) -> PathBuf {
        self.storage_dir.join(&self.token_file)
    }

    /// Checks the configuration for obvious mistakes.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::Config`] for a non-HTTP base URL, an empty or
    /// path-like token file name, or a zero timeout, and
    /// [`LicenseError::InvalidCheckInterval`] for an out-of-range interval.
    pub fn validate(&self) -> LicenseResult<()> {
        let url = self.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(LicenseError::Config(format!(
                "base_url must be an http(s) URL, got {:?}",
                self.base_url
            )));
        }

        if self.token_file.is_empty() || self.token_file.contains(['/', '\\']) {
            return Err(LicenseError::Config(format!(
                "token_file must be a bare file name, got {:?}",
                self.token_file
            )));
        }

        if self.timeout_secs == 0 {
            return Err(LicenseError::Config("timeout_secs must be positive".to_string()));
        }

        check_interval_in_range(self.check_interval_days)
    }
}

/// Rejects check intervals outside
/// [`MIN_CHECK_INTERVAL_DAYS`]..=[`MAX_CHECK_INTERVAL_DAYS`].
///
/// # Errors
///
/// Returns [`LicenseError::InvalidCheckInterval`] when out of range.
pub fn check_interval_in_range(days: u32) -> LicenseResult<()> {
    if (MIN_CHECK_INTERVAL_DAYS..=MAX_CHECK_INTERVAL_DAYS).contains(&days) {
        Ok(())
    } else {
        Err(LicenseError::InvalidCheckInterval(days))
    }
}

/// `<local data dir>/keyward`, or `./keyward` when the platform has none.
fn default_storage_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("keyward"))
        .unwrap_or_else(|| PathBuf::from("keyward"))
}
