//! The HTTP collaborator used to reach the license server.

use crate::error::TransportError;
use serde_json::Value;
use std::fmt;

/// HTTP method of a transport request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => f.write_str("GET"),
            Self::Post => f.write_str("POST"),
        }
    }
}

/// Sends a JSON request and returns the decoded JSON response.
///
/// Implementations must fail with [`TransportError`] on connection errors,
/// non-2xx responses, and bodies that are not JSON. They must not retry.
pub trait Transport {
    /// Sends `body` to `url`. For `GET`, object fields become query parameters.
    fn send(&self, method: Method, url: &str, body: &Value) -> Result<Value, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, method: Method, url: &str, body: &Value) -> Result<Value, TransportError> {
        (**self).send(method, url, body)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&self, method: Method, url: &str, body: &Value) -> Result<Value, TransportError> {
        (**self).send(method, url, body)
    }
}
