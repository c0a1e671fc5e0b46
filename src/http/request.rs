//! Call identity and per-request options.
//!
//! # Design Decisions
//! - The call id is generated once per call, before the first attempt
//! - Retries reuse the id so every event of a call correlates

use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Unique identity of one resilient call (UUID v4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Options forwarded to the transport with every attempt.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Extra request headers.
    pub headers: Vec<(String, String)>,

    /// Query parameters appended to the URL.
    pub params: Vec<(String, String)>,

    /// Per-attempt timeout, overriding the transport default.
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
