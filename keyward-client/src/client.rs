//! Cache-or-refresh orchestration.
//!
//! # Flow
//!
//! 1. Reject an out-of-range check interval before touching anything
//! 2. Validate the cached token; a valid one is returned as-is
//! 3. Otherwise ask the server once, and persist whatever token it issues
//!
//! There are no retries. A transport failure is returned as an error, while
//! a server that declines the license produces a [`SetupResult::Error`].

use crate::config::{check_interval_in_range, ClientConfig};
use crate::error::LicenseResult;
use crate::fingerprint::LicenseRequest;
use crate::outcome::{RefreshedValidation, SetupResult};
use crate::store::{FileTokenStore, TokenStore};
use crate::transport::{Method, Transport};
use keyward_token::{Clock, SystemClock, TokenValidator, ValidationResult};
use serde_json::Value;
use std::net::IpAddr;
use tracing::{debug, info, warn};

/// Endpoint that issues or re-validates a local token.
pub const SETUP_OR_VALIDATE_PATH: &str = "licenses/setup-or-validate";

/// Stateless public validation endpoint.
pub const PUBLIC_VALIDATE_PATH: &str = "licenses/validate";

/// Client for the license server, backed by a local token store.
pub struct LicenseClient<T, S, C = SystemClock> {
    base_url: String,
    transport: T,
    store: S,
    validator: TokenValidator<C>,
}

impl<T: Transport> LicenseClient<T, FileTokenStore> {
    /// Builds a client from `config`, storing the token in a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the config does not validate.
    pub fn from_config(config: &ClientConfig, transport: T) -> LicenseResult<Self> {
        config.validate()?;
        Ok(Self::new(
            config.base_url.clone(),
            transport,
            FileTokenStore::from_config(config),
        ))
    }
}

impl<T: Transport, S: TokenStore> LicenseClient<T, S> {
    /// Creates a client using the wall clock.
    pub fn new(base_url: impl Into<String>, transport: T, store: S) -> Self {
        Self::with_clock(base_url, transport, store, SystemClock)
    }
}

impl<T: Transport, S: TokenStore, C: Clock> LicenseClient<T, S, C> {
    /// Creates a client with a custom clock for staleness checks.
    pub fn with_clock(base_url: impl Into<String>, transport: T, store: S, clock: C) -> Self {
        Self {
            base_url: base_url.into(),
            transport,
            store,
            validator: TokenValidator::with_clock(clock),
        }
    }

    /// Returns the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns the token store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the absolute URL of an API path.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Returns a usable token, from the store if it is still valid, otherwise
    /// from the server.
    ///
    /// With `auto_refresh` off, a stored token that fails validation is
    /// reported instead of refreshed. A missing token is always requested.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::InvalidCheckInterval`](crate::LicenseError::InvalidCheckInterval)
    /// before any I/O if `check_interval_days` is outside 7..=90, and
    /// propagates store and transport failures.
    pub fn setup_or_validate(
        &self,
        request: &LicenseRequest,
        check_interval_days: u32,
        auto_refresh: bool,
    ) -> LicenseResult<SetupResult> {
        check_interval_in_range(check_interval_days)?;

        if let Some(token) = self.store.load()? {
            let validation = self.validator.validate(Some(token.as_str()), check_interval_days);
            if validation.valid {
                debug!("cached token still valid, skipping server check");
                return Ok(SetupResult::Success {
                    token,
                    cached: true,
                    persisted: true,
                });
            }

            if !auto_refresh {
                info!("cached token rejected ({}), auto-refresh disabled", validation.message);
                return Ok(SetupResult::error(validation.message));
            }

            info!("cached token rejected ({}), refreshing", validation.message);
        }

        self.request_token(request, check_interval_days)
    }

    /// Validates the stored token and, if it is not valid and `auto_refresh`
    /// is set, fetches a new one and validates that instead.
    ///
    /// # Errors
    ///
    /// Same as [`setup_or_validate`](Self::setup_or_validate).
    pub fn validate_with_auto_refresh(
        &self,
        request: &LicenseRequest,
        check_interval_days: u32,
        auto_refresh: bool,
    ) -> LicenseResult<RefreshedValidation> {
        check_interval_in_range(check_interval_days)?;

        let stored = self.store.load()?;
        let result = self.validator.validate(stored.as_deref(), check_interval_days);
        if result.valid || !auto_refresh {
            return Ok(RefreshedValidation {
                result,
                refreshed: false,
            });
        }

        match self.request_token(request, check_interval_days)? {
            SetupResult::Success { token, .. } => Ok(RefreshedValidation {
                result: self.validator.validate(Some(token.as_str()), check_interval_days),
                refreshed: true,
            }),
            SetupResult::Error { message, .. } => Ok(RefreshedValidation {
                result: ValidationResult::error(message),
                refreshed: false,
            }),
        }
    }

    /// Validates the stored token without contacting the server.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn validate_local(&self, check_interval_days: u32) -> LicenseResult<ValidationResult> {
        let stored = self.store.load()?;
        Ok(self.validator.validate(stored.as_deref(), check_interval_days))
    }

    /// Asks the server about a domain or IP address. Nothing is cached.
    ///
    /// # Errors
    ///
    /// Propagates transport failures.
    pub fn public_validate(&self, domain_or_ip: &str) -> LicenseResult<Value> {
        let target = domain_or_ip.trim();
        let body = if target.parse::<IpAddr>().is_ok() {
            serde_json::json!({ "ip": target })
        } else {
            serde_json::json!({ "domain": target })
        };

        let url = self.endpoint(PUBLIC_VALIDATE_PATH);
        debug!("public validation of {} via {}", target, url);
        Ok(self.transport.send(Method::Post, &url, &body)?)
    }

    /// Returns the stored token without validating it.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn get_local_token(&self) -> LicenseResult<Option<String>> {
        self.store.load()
    }

    /// Deletes the stored token.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn clear_local_token(&self) -> LicenseResult<()> {
        self.store.clear()
    }

    fn request_token(
        &self,
        request: &LicenseRequest,
        check_interval_days: u32,
    ) -> LicenseResult<SetupResult> {
        let url = self.endpoint(SETUP_OR_VALIDATE_PATH);
        let body = request.setup_body(check_interval_days);
        info!("requesting local token from {}", url);

        let response = self.transport.send(Method::Post, &url, &body)?;

        let Some(token) = issued_token(&response) else {
            let result = SetupResult::from_response(&response);
            if let SetupResult::Error { status, message } = &result {
                warn!("license server declined: {} ({})", message, status);
            }
            return Ok(result);
        };

        let persisted = match self.store.save(token) {
            Ok(()) => true,
            Err(e) => {
                warn!("failed to persist local token: {}", e);
                false
            }
        };

        Ok(SetupResult::Success {
            token: token.to_string(),
            cached: false,
            persisted,
        })
    }
}

/// The token in a successful setup response, under `data.local_token` or a
/// top-level `local_token`.
fn issued_token(response: &Value) -> Option<&str> {
    if response.get("status").and_then(Value::as_str) != Some("success") {
        return None;
    }

    response
        .pointer("/data/local_token")
        .or_else(|| response.get("local_token"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
