//! Retry, backoff and escalation state machine.
//!
//! # States
//! - Attempting: the operation is running
//! - BackingOff: waiting before the next automatic retry
//! - AwaitingUserDecision: budget used up, waiting on a decision gate
//! - Succeeded / Failed: final
//!
//! # State Transitions
//! ```text
//! Attempting → Succeeded: operation returns Ok
//! Attempting → Failed: retry disabled or status not retryable
//! Attempting → BackingOff: retry_count <= budget
//! Attempting → AwaitingUserDecision: budget used up, gating enabled
//! Attempting → Failed: budget used up, gating disabled
//! BackingOff → Attempting: backoff elapsed
//! AwaitingUserDecision → Attempting: gate resolved with retry
//! AwaitingUserDecision → Failed: gate resolved with abandon
//! ```
//!
//! The retry counter resets to zero whenever the budget is used up, so a user
//! retry starts a new escalation cycle with the full budget.

use std::future::Future;
use std::time::Duration;

use crate::config::resolver::TopicFlag;
use crate::config::schema::ResilienceConfig;
use crate::error::{RequestError, TransportError};
use crate::http::request::RequestId;
use crate::observability::metrics;
use crate::resilience::delay::backoff;
use crate::resilience::gate::{decision_gate, DecisionWaiter};

#[derive(Debug)]
enum EngineState<T> {
    Attempting,
    BackingOff {
        delay: Duration,
    },
    AwaitingUserDecision {
        retries: usize,
        error: TransportError,
        waiter: DecisionWaiter,
    },
    Succeeded(T),
    Failed(RequestError),
}

/// Applies the resilience policy of one call to a retryable operation.
#[derive(Debug)]
pub struct ResilienceEngine<'a> {
    config: &'a ResilienceConfig,
    id: &'a RequestId,
    retry_count: usize,
}

impl<'a> ResilienceEngine<'a> {
    pub fn new(config: &'a ResilienceConfig, id: &'a RequestId) -> Self {
        Self {
            config,
            id,
            retry_count: 0,
        }
    }

    /// Run `operation` until it succeeds or the policy gives up.
    ///
    /// `operation` is invoked once per attempt and must start a fresh request
    /// each time.
    pub async fn execute<T, F, Fut>(mut self, mut operation: F) -> Result<T, RequestError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, TransportError>>,
    {
        let mut state = EngineState::Attempting;

        loop {
            state = match state {
                EngineState::Attempting => match operation().await {
                    Ok(value) => EngineState::Succeeded(value),
                    Err(error) => self.on_failure(error),
                },
                EngineState::BackingOff { delay } => {
                    backoff(delay).await;
                    EngineState::Attempting
                }
                EngineState::AwaitingUserDecision {
                    retries,
                    error,
                    waiter,
                } => {
                    let retry = waiter.decision().await;
                    metrics::record_user_decision(&self.config.topic, retry);
                    if retry {
                        tracing::debug!(
                            topic = %self.config.topic,
                            id = %self.id,
                            "User chose to retry"
                        );
                        self.emit_retry(retries, error.status);
                        EngineState::Attempting
                    } else {
                        self.fail(RequestError::UserCancelled {
                            retries,
                            source: error,
                        })
                    }
                }
                EngineState::Succeeded(value) => return Ok(value),
                EngineState::Failed(error) => return Err(error),
            };
        }
    }

    fn on_failure<T>(&mut self, error: TransportError) -> EngineState<T> {
        let config = self.config;

        if config.flag(TopicFlag::DisableRetry) || !config.is_retryable_status(error.status) {
            tracing::debug!(
                topic = %config.topic,
                id = %self.id,
                status = error.status,
                "Failure is not retryable"
            );
            return self.fail(RequestError::NonRetryable(error));
        }

        self.retry_count += 1;
        let retries = self.retry_count;

        if let Some(delay) = config.retry_intervals.get(retries - 1).copied() {
            tracing::debug!(
                topic = %config.topic,
                id = %self.id,
                attempt = retries,
                delay = ?delay,
                status = error.status,
                "Retrying request"
            );
            config
                .hooks
                .on_request_retry(&config.topic, self.id, retries, delay, error.status);
            metrics::record_retry(&config.topic, error.status);
            return EngineState::BackingOff { delay };
        }

        self.retry_count = 0;
        let retries = config.retry_budget();

        if config.flag(TopicFlag::WaitForUserDecision) {
            tracing::info!(
                topic = %config.topic,
                id = %self.id,
                retries,
                status = error.status,
                "Retry budget exhausted, waiting for user decision"
            );
            let (gate, waiter) = decision_gate();
            config.hooks.on_waiting_for_user_decision(
                &config.topic,
                self.id,
                retries,
                error.status,
                gate,
            );
            EngineState::AwaitingUserDecision {
                retries,
                error,
                waiter,
            }
        } else {
            self.fail(RequestError::Exhausted {
                retries,
                source: error,
            })
        }
    }

    /// Retry granted by a user decision; no backoff follows.
    fn emit_retry(&self, retries: usize, status: u16) {
        let delay = self
            .config
            .retry_intervals
            .last()
            .copied()
            .unwrap_or_default();
        self.config
            .hooks
            .on_request_retry(&self.config.topic, self.id, retries, delay, status);
        metrics::record_retry(&self.config.topic, status);
    }

    fn fail<T>(&self, error: RequestError) -> EngineState<T> {
        tracing::warn!(
            topic = %self.config.topic,
            id = %self.id,
            error = %error,
            "Request failed"
        );
        self.config
            .hooks
            .on_fail(&self.config.topic, self.id, self.config.fail_message());
        EngineState::Failed(error)
    }
}
