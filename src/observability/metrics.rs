//! Metrics collection.
//!
//! # Metrics
//! - `resilient_requests_total` (counter): calls started, by topic
//! - `resilient_retries_total` (counter): retries, by topic and failed status
//! - `resilient_user_decisions_total` (counter): gate resolutions, by decision
//! - `resilient_outcomes_total` (counter): final outcome, by topic
//! - `resilient_request_duration_seconds` (histogram): call latency incl. retries
//!
//! No recorder is installed here; without one every call is a no-op.

use std::time::Duration;

/// Final outcome of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Succeeded,
    Substituted,
    Failed,
    Cancelled,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Succeeded => "succeeded",
            Outcome::Substituted => "substituted",
            Outcome::Failed => "failed",
            Outcome::Cancelled => "cancelled",
        }
    }
}

pub fn record_request_start(topic: &str) {
    metrics::counter!("resilient_requests_total", "topic" => topic.to_string()).increment(1);
}

pub fn record_retry(topic: &str, status: u16) {
    metrics::counter!(
        "resilient_retries_total",
        "topic" => topic.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

pub fn record_user_decision(topic: &str, retry: bool) {
    let decision = if retry { "retry" } else { "abandon" };
    metrics::counter!(
        "resilient_user_decisions_total",
        "topic" => topic.to_string(),
        "decision" => decision
    )
    .increment(1);
}

pub fn record_outcome(topic: &str, outcome: Outcome, elapsed: Duration) {
    metrics::counter!(
        "resilient_outcomes_total",
        "topic" => topic.to_string(),
        "outcome" => outcome.as_str()
    )
    .increment(1);
    metrics::histogram!(
        "resilient_request_duration_seconds",
        "topic" => topic.to_string()
    )
    .record(elapsed.as_secs_f64());
}
