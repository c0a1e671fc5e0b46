//! Per-call orchestration around the resilience engine.
//!
//! # Call Sequence
//! ```text
//! generate id → start delay timer → on_request_start
//!     → ResilienceEngine(operation)        (delay timer watches this)
//!     → Ok: log result (log_result), unwrap body
//!     → Err: on_fail_response? substitute : propagate
//!     → finalize: trace elapsed time, on_request_finalize
//! ```
//!
//! Finalization runs from `CallContext`'s `Drop`, so it happens exactly once,
//! after the outcome is fixed, and also when the caller drops the call midway.

use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::future::Future;
use tokio::time::Instant;

use crate::config::resolver::TopicFlag;
use crate::config::schema::ResilienceConfig;
use crate::error::{RequestError, TransportError};
use crate::http::request::RequestId;
use crate::http::transport::HttpResponse;
use crate::observability::metrics::{self, Outcome};
use crate::resilience::delay::DelayTimer;
use crate::resilience::engine::ResilienceEngine;

/// Identity and finalization of one call.
#[derive(Debug)]
struct CallContext<'a> {
    config: &'a ResilienceConfig,
    id: RequestId,
    started_at: Instant,
    outcome: Option<Outcome>,
}

impl<'a> CallContext<'a> {
    fn start(config: &'a ResilienceConfig) -> Self {
        Self {
            config,
            id: RequestId::generate(),
            started_at: Instant::now(),
            outcome: None,
        }
    }

    fn complete(&mut self, outcome: Outcome) {
        self.outcome = Some(outcome);
    }
}

impl Drop for CallContext<'_> {
    fn drop(&mut self) {
        let config = self.config;
        let outcome = self.outcome.unwrap_or(Outcome::Cancelled);
        let elapsed = self.started_at.elapsed();

        if outcome == Outcome::Cancelled {
            tracing::debug!(topic = %config.topic, id = %self.id, "Request cancelled");
        }

        if config.flag(TopicFlag::Trace) {
            tracing::info!(
                topic = %config.topic,
                id = %self.id,
                elapsed_ms = elapsed.as_millis() as u64,
                outcome = outcome.as_str(),
                "Fetch time of call-topic {}",
                config.topic
            );
        }

        metrics::record_outcome(&config.topic, outcome, elapsed);
        config.hooks.on_request_finalize(&config.topic, &self.id);
    }
}

/// Run one resilient call.
///
/// `operation` performs a single attempt and is invoked again for every retry.
pub async fn invoke<T, F, Fut>(config: &ResilienceConfig, operation: F) -> Result<T, RequestError>
where
    T: DeserializeOwned + Debug,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<HttpResponse<T>, TransportError>>,
{
    let mut delay_timer = DelayTimer::start(config.is_delayed_after);
    let mut call = CallContext::start(config);
    let id = call.id;

    tracing::debug!(topic = %config.topic, id = %id, "Request started");
    config.hooks.on_request_start(&config.topic, &id);
    metrics::record_request_start(&config.topic);

    let engine = ResilienceEngine::new(config, &id);
    let outcome = delay_timer
        .watch(engine.execute(operation), || {
            tracing::debug!(topic = %config.topic, id = %id, "Request delayed");
            config.hooks.on_request_delayed(&config.topic, &id);
        })
        .await;
    drop(delay_timer);

    let result = match outcome {
        Ok(response) => {
            let body = response.into_body();
            if config.flag(TopicFlag::LogResult) {
                tracing::info!(topic = %config.topic, id = %id, result = ?body, "Request result");
            }
            call.complete(Outcome::Succeeded);
            Ok(body)
        }
        Err(error) => match failover(config, &error) {
            Some(substitute) => {
                tracing::info!(
                    topic = %config.topic,
                    id = %id,
                    status = error.status(),
                    "Substituting failover response"
                );
                call.complete(Outcome::Substituted);
                Ok(substitute)
            }
            None => {
                call.complete(Outcome::Failed);
                Err(error)
            }
        },
    };

    drop(call);
    result
}

/// Decode the topic's failover payload, if one is configured.
fn failover<T: DeserializeOwned>(config: &ResilienceConfig, error: &RequestError) -> Option<T> {
    let value = config.fail_response()?;
    match serde_json::from_value(value.clone()) {
        Ok(substitute) => Some(substitute),
        Err(e) => {
            tracing::warn!(
                topic = %config.topic,
                error = %error,
                decode_error = %e,
                "Failover response does not match the expected payload, propagating failure"
            );
            None
        }
    }
}
