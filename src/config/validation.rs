//! Configuration validation.
//!
//! Serde handles syntax; this module checks value ranges. All errors are
//! collected instead of stopping at the first one.

use std::fmt;

use crate::config::schema::ClientConfig;

/// Longest accepted backoff entry.
pub const MAX_RETRY_INTERVAL_MS: u64 = 60 * 60 * 1000;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a loaded configuration.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let resilience = &config.resilience;

    for status in &resilience.retry_on_status_codes {
        if !(100..=599).contains(status) {
            errors.push(ValidationError::new(
                "resilience.retry_on_status_codes",
                format!("{} is not an HTTP status code", status),
            ));
        }
    }

    for (i, interval) in resilience.retry_intervals_ms.iter().enumerate() {
        if *interval > MAX_RETRY_INTERVAL_MS {
            errors.push(ValidationError::new(
                format!("resilience.retry_intervals_ms[{}]", i),
                format!("{} ms exceeds the maximum of {} ms", interval, MAX_RETRY_INTERVAL_MS),
            ));
        }
    }

    if resilience
        .retry_intervals_ms
        .windows(2)
        .any(|pair| pair[1] < pair[0])
    {
        tracing::warn!(
            intervals = ?resilience.retry_intervals_ms,
            "Retry intervals are not ascending"
        );
    }

    if resilience.topics.keys().any(|topic| topic.trim().is_empty()) {
        errors.push(ValidationError::new(
            "resilience.topics",
            "topic names must not be empty",
        ));
    }

    if config.http.timeout_secs == 0 {
        errors.push(ValidationError::new("http.timeout_secs", "must be greater than 0"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
