//! Topic-aware lookup of effective policy values.
//!
//! A topic override wins over the call's value only when the topic exists in
//! the dictionary and defines the property. Lookups are pure.

use crate::config::schema::{ResilienceConfig, TopicOverride};

/// Boolean properties that a topic may override.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicFlag {
    DisableRetry,
    WaitForUserDecision,
    LogResult,
    Trace,
}

impl TopicFlag {
    fn from_override(self, topic: &TopicOverride) -> Option<bool> {
        match self {
            TopicFlag::DisableRetry => topic.disable_retry,
            TopicFlag::WaitForUserDecision => topic.wait_for_user_decision,
            TopicFlag::LogResult => topic.log_result,
            TopicFlag::Trace => topic.trace,
        }
    }

    fn from_config(self, config: &ResilienceConfig) -> bool {
        match self {
            TopicFlag::DisableRetry => config.disable_retry,
            TopicFlag::WaitForUserDecision => config.wait_for_user_decision,
            TopicFlag::LogResult => config.log_result,
            TopicFlag::Trace => config.trace,
        }
    }
}

/// Resolve `flag` for `topic`, falling back to the call-wide value.
pub fn resolve_flag(config: &ResilienceConfig, topic: &str, flag: TopicFlag) -> bool {
    config
        .topics
        .get(topic)
        .and_then(|topic_config| flag.from_override(topic_config))
        .unwrap_or_else(|| flag.from_config(config))
}

/// Message passed to `on_fail` for `topic`; empty when not configured.
pub fn resolve_fail_message<'a>(config: &'a ResilienceConfig, topic: &str) -> &'a str {
    config
        .topics
        .get(topic)
        .and_then(|topic_config| topic_config.on_fail_message.as_deref())
        .unwrap_or("")
}

/// Substitute payload for a terminal failure of `topic`, if any.
pub fn resolve_fail_response<'a>(
    config: &'a ResilienceConfig,
    topic: &str,
) -> Option<&'a serde_json::Value> {
    config
        .topics
        .get(topic)
        .and_then(|topic_config| topic_config.on_fail_response.as_ref())
}

impl ResilienceConfig {
    /// Resolve `flag` for this call's own topic.
    pub fn flag(&self, flag: TopicFlag) -> bool {
        resolve_flag(self, &self.topic, flag)
    }

    pub fn fail_message(&self) -> &str {
        resolve_fail_message(self, &self.topic)
    }

    pub fn fail_response(&self) -> Option<&serde_json::Value> {
        resolve_fail_response(self, &self.topic)
    }
}
