//! Configuration schema definitions.
//!
//! This module defines the file-loadable configuration for the client and the
//! per-call resilience policy derived from it. All file types derive Serde
//! traits for deserialization from TOML.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::resilience::hooks::{LifecycleHooks, NoopHooks};

/// Root configuration for the client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// Global resilience defaults and topic overrides.
    pub resilience: ResilienceSettings,

    /// Transport settings.
    pub http: HttpConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Global resilience defaults.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ResilienceSettings {
    /// Milliseconds after which a still-running call is reported as delayed.
    pub is_delayed_after_ms: u64,

    /// Never retry, regardless of status.
    pub disable_retry: bool,

    /// Ask for a user decision once the automatic retry budget is used up.
    pub wait_for_user_decision: bool,

    /// Log the unwrapped payload of successful calls.
    pub log_result: bool,

    /// Log elapsed time of every call.
    pub trace: bool,

    /// Failure statuses eligible for automatic retry.
    pub retry_on_status_codes: BTreeSet<u16>,

    /// Backoff before each automatic retry; its length is the retry budget.
    pub retry_intervals_ms: Vec<u64>,

    /// Topic-scoped overrides.
    pub topics: HashMap<String, TopicOverride>,
}

pub const DEFAULT_RETRY_STATUS_CODES: [u16; 7] = [408, 423, 429, 500, 502, 503, 504];

impl Default for ResilienceSettings {
    fn default() -> Self {
        Self {
            is_delayed_after_ms: 3000,
            disable_retry: false,
            wait_for_user_decision: false,
            log_result: false,
            trace: false,
            retry_on_status_codes: DEFAULT_RETRY_STATUS_CODES.into_iter().collect(),
            retry_intervals_ms: vec![0, 200, 500, 1000, 1000],
            topics: HashMap::new(),
        }
    }
}

/// Overrides applied to every call of one topic.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct TopicOverride {
    pub disable_retry: Option<bool>,
    pub wait_for_user_decision: Option<bool>,
    pub log_result: Option<bool>,
    pub trace: Option<bool>,

    /// Message handed to `on_fail`; empty when absent.
    pub on_fail_message: Option<String>,

    /// Payload returned instead of a terminal failure.
    pub on_fail_response: Option<serde_json::Value>,
}

/// Transport configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Total time for a single attempt in seconds.
    pub timeout_secs: u64,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 5,
            user_agent: concat!("resilient-http-client/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Caller-supplied partial policy for one call.
///
/// Every `Some` field replaces the corresponding global default. A supplied
/// `topics` map replaces the global dictionary as a whole.
#[derive(Clone, Default)]
pub struct ResilienceOverrides {
    pub topic: String,
    pub is_delayed_after_ms: Option<u64>,
    pub disable_retry: Option<bool>,
    pub wait_for_user_decision: Option<bool>,
    pub log_result: Option<bool>,
    pub trace: Option<bool>,
    pub retry_on_status_codes: Option<BTreeSet<u16>>,
    pub retry_intervals_ms: Option<Vec<u64>>,
    pub topics: Option<HashMap<String, TopicOverride>>,
    pub hooks: Option<Arc<dyn LifecycleHooks>>,
}

impl ResilienceOverrides {
    /// Overrides that only name the topic.
    pub fn for_topic(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            ..Self::default()
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn LifecycleHooks>) -> Self {
        self.hooks = Some(hooks);
        self
    }
}

impl fmt::Debug for ResilienceOverrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResilienceOverrides")
            .field("topic", &self.topic)
            .field("is_delayed_after_ms", &self.is_delayed_after_ms)
            .field("disable_retry", &self.disable_retry)
            .field("wait_for_user_decision", &self.wait_for_user_decision)
            .field("log_result", &self.log_result)
            .field("trace", &self.trace)
            .field("retry_on_status_codes", &self.retry_on_status_codes)
            .field("retry_intervals_ms", &self.retry_intervals_ms)
            .field("topics", &self.topics)
            .field("hooks", &self.hooks.as_ref().map(|_| "<hooks>"))
            .finish()
    }
}

/// Effective policy of one call. Immutable once resolved.
#[derive(Clone)]
pub struct ResilienceConfig {
    pub topic: String,
    pub disable_retry: bool,
    pub wait_for_user_decision: bool,
    pub log_result: bool,
    pub trace: bool,
    pub retry_on_status_codes: BTreeSet<u16>,
    pub is_delayed_after: Duration,
    pub retry_intervals: Vec<Duration>,
    pub topics: HashMap<String, TopicOverride>,
    pub hooks: Arc<dyn LifecycleHooks>,
}

impl ResilienceConfig {
    /// Merge global defaults with caller overrides.
    ///
    /// Topic overrides are not folded in here; they are applied when a flag is
    /// read (see [`crate::config::resolver`]).
    pub fn resolve(settings: &ResilienceSettings, overrides: ResilienceOverrides) -> Self {
        let retry_intervals_ms = overrides
            .retry_intervals_ms
            .unwrap_or_else(|| settings.retry_intervals_ms.clone());

        Self {
            topic: overrides.topic,
            disable_retry: overrides.disable_retry.unwrap_or(settings.disable_retry),
            wait_for_user_decision: overrides
                .wait_for_user_decision
                .unwrap_or(settings.wait_for_user_decision),
            log_result: overrides.log_result.unwrap_or(settings.log_result),
            trace: overrides.trace.unwrap_or(settings.trace),
            retry_on_status_codes: overrides
                .retry_on_status_codes
                .unwrap_or_else(|| settings.retry_on_status_codes.clone()),
            is_delayed_after: Duration::from_millis(
                overrides
                    .is_delayed_after_ms
                    .unwrap_or(settings.is_delayed_after_ms),
            ),
            retry_intervals: retry_intervals_ms
                .into_iter()
                .map(Duration::from_millis)
                .collect(),
            topics: overrides
                .topics
                .unwrap_or_else(|| settings.topics.clone()),
            hooks: overrides.hooks.unwrap_or_else(|| Arc::new(NoopHooks)),
        }
    }

    /// Whether a failure with `status` may be retried automatically.
    pub fn is_retryable_status(&self, status: u16) -> bool {
        self.retry_on_status_codes.contains(&status)
    }

    /// Automatic retries allowed per escalation cycle.
    pub fn retry_budget(&self) -> usize {
        self.retry_intervals.len()
    }
}

impl fmt::Debug for ResilienceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResilienceConfig")
            .field("topic", &self.topic)
            .field("disable_retry", &self.disable_retry)
            .field("wait_for_user_decision", &self.wait_for_user_decision)
            .field("log_result", &self.log_result)
            .field("trace", &self.trace)
            .field("retry_on_status_codes", &self.retry_on_status_codes)
            .field("is_delayed_after", &self.is_delayed_after)
            .field("retry_intervals", &self.retry_intervals)
            .field("topics", &self.topics)
            .finish_non_exhaustive()
    }
}
