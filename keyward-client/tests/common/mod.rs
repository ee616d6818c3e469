//! Shared test doubles for orchestration tests.

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use keyward_client::{
    FixedClock, Fingerprint, LicenseClient, LicenseError, LicensePayload, LicenseRequest,
    LicenseResult, Method, TokenStore, Transport, TransportError,
};
use keyward_token::LocalToken;
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

pub const BASE_URL: &str = "https://licensing.test/api/v1";

/// A fixed "now" shared by the client clock and generated tokens.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 15, 12, 0, 0).unwrap()
}

/// A token for license `K` last checked `days_ago` days before [`fixed_now`].
pub fn token_checked_days_ago(days_ago: i64) -> String {
    let payload = LicensePayload::new("K")
        .with_status("active")
        .checked_at(fixed_now() - Duration::days(days_ago));
    LocalToken::encode("sig", &payload).unwrap().into_string()
}

pub fn request() -> LicenseRequest {
    LicenseRequest::new("K", Fingerprint::new("example.com", "203.0.113.7", "/srv/app"))
}

/// A recorded transport call.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: Method,
    pub url: String,
    pub body: Value,
}

/// Replays queued responses and records every request.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: RefCell<VecDeque<Result<Value, TransportError>>>,
    calls: RefCell<Vec<Call>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, response: Value) -> Self {
        self.responses.borrow_mut().push_back(Ok(response));
        self
    }

    pub fn fail(self, err: TransportError) -> Self {
        self.responses.borrow_mut().push_back(Err(err));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, method: Method, url: &str, body: &Value) -> Result<Value, TransportError> {
        self.calls.borrow_mut().push(Call {
            method,
            url: url.to_string(),
            body: body.clone(),
        });
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Connection("no scripted response".into())))
    }
}

/// In-memory token store that counts accesses.
#[derive(Default)]
pub struct MemoryStore {
    token: RefCell<Option<String>>,
    loads: Cell<usize>,
    saves: RefCell<Vec<String>>,
    fail_saves: Cell<bool>,
}

impl MemoryStore {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        let store = Self::default();
        *store.token.borrow_mut() = Some(token.into());
        store
    }

    pub fn failing_saves(self) -> Self {
        self.fail_saves.set(true);
        self
    }

    pub fn current(&self) -> Option<String> {
        self.token.borrow().clone()
    }

    pub fn load_count(&self) -> usize {
        self.loads.get()
    }

    pub fn saves(&self) -> Vec<String> {
        self.saves.borrow().clone()
    }
}

impl TokenStore for MemoryStore {
    fn load(&self) -> LicenseResult<Option<String>> {
        self.loads.set(self.loads.get() + 1);
        Ok(self.token.borrow().clone())
    }

    fn save(&self, token: &str) -> LicenseResult<()> {
        self.saves.borrow_mut().push(token.to_string());
        if self.fail_saves.get() {
            return Err(LicenseError::Storage("disk full".into()));
        }
        *self.token.borrow_mut() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> LicenseResult<()> {
        *self.token.borrow_mut() = None;
        Ok(())
    }
}

pub type TestClient = LicenseClient<ScriptedTransport, MemoryStore, FixedClock>;

pub fn client(transport: ScriptedTransport, store: MemoryStore) -> TestClient {
    LicenseClient::with_clock(BASE_URL, transport, store, FixedClock(fixed_now()))
}
