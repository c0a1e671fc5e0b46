//! Failure types shared by the transport, the resilience engine and callers.
//!
//! # Taxonomy
//! ```text
//! TransportError           one failed attempt (status + message)
//!     → retryable?         status in retry list and retry enabled
//!         no  → RequestError::NonRetryable
//!         yes → backoff loop
//!                 → budget exhausted, no gating  → RequestError::Exhausted
//!                 → gate resolved to abandon     → RequestError::UserCancelled
//! ```
//!
//! Every `RequestError` still carries the original `TransportError`, so callers
//! see the same failure shape the transport produced.

use thiserror::Error;

/// Status used when a failure happened below HTTP (DNS, connect, bad URL).
pub const NO_HTTP_STATUS: u16 = 0;

/// A single failed transport attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("HTTP {status}: {message}")]
pub struct TransportError {
    /// HTTP status of the failed response, or [`NO_HTTP_STATUS`].
    pub status: u16,
    /// Response text or underlying error description.
    pub message: String,
}

impl TransportError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Failure without an HTTP response.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(NO_HTTP_STATUS, message)
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let status = match err.status() {
            Some(status) => status.as_u16(),
            None if err.is_timeout() => 408,
            None => NO_HTTP_STATUS,
        };
        Self::new(status, err.to_string())
    }
}

/// Terminal failure of a resilient call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// Status not eligible for retry, or retry disabled for the topic.
    #[error("request failed without retry: {0}")]
    NonRetryable(TransportError),

    /// Automatic retry budget used up and no user decision was requested.
    #[error("request failed after {retries} retries: {source}")]
    Exhausted {
        retries: usize,
        source: TransportError,
    },

    /// A user decision gate was resolved to abandon the call.
    #[error("request abandoned by user after {retries} retries: {source}")]
    UserCancelled {
        retries: usize,
        source: TransportError,
    },
}

impl RequestError {
    /// The failure of the last attempt.
    pub fn transport_error(&self) -> &TransportError {
        match self {
            RequestError::NonRetryable(source)
            | RequestError::Exhausted { source, .. }
            | RequestError::UserCancelled { source, .. } => source,
        }
    }

    pub fn into_transport_error(self) -> TransportError {
        match self {
            RequestError::NonRetryable(source)
            | RequestError::Exhausted { source, .. }
            | RequestError::UserCancelled { source, .. } => source,
        }
    }

    /// Status code of the last failed attempt.
    pub fn status(&self) -> u16 {
        self.transport_error().status
    }
}
