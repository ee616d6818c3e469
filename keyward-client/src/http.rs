//! Blocking HTTP transport backed by reqwest.

use crate::config::ClientConfig;
use crate::error::{LicenseError, LicenseResult, TransportError};
use crate::transport::{Method, Transport};
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = concat!("keyward/", env!("CARGO_PKG_VERSION"));

/// Longest response body quoted in a [`TransportError::Status`].
const MAX_ERROR_BODY: usize = 512;

/// Sends JSON requests with a blocking reqwest client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Creates a transport with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::Config`] if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> LicenseResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| LicenseError::Config(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Creates a transport using the timeout from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::Config`] if the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig) -> LicenseResult<Self> {
        Self::new(Duration::from_secs(config.timeout_secs))
    }
}

impl Transport for HttpTransport {
    fn send(&self, method: Method, url: &str, body: &Value) -> Result<Value, TransportError> {
        debug!("{} {}", method, url);

        let request = match method {
            Method::Post => self.client.post(url).json(body),
            Method::Get => self.client.get(url).query(&query_pairs(body)),
        };

        let response = request.header(ACCEPT, "application/json").send()?;
        let status = response.status();
        let text = response.text()?;

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: truncate(&text, MAX_ERROR_BODY),
            });
        }

        let value: Value =
            serde_json::from_str(&text).map_err(|e| TransportError::Decode(e.to_string()))?;
        if !value.is_object() {
            return Err(TransportError::Decode("response is not a JSON object".to_string()));
        }
        Ok(value)
    }
}

/// Flattens a JSON object into query parameters. Strings are sent bare,
/// other values as JSON text; nulls are dropped.
fn query_pairs(body: &Value) -> Vec<(String, String)> {
    let Some(fields) = body.as_object() else {
        return Vec::new();
    };

    fields
        .iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.clone(), value)
        })
        .collect()
}

fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((at, _)) => format!("{}...", &text[..at]),
        None => text.to_string(),
    }
}
