//! Lifecycle callbacks of a resilient call.
//!
//! Every callback receives the call's topic and id; the id is the same for all
//! events of one call, retries included. Implementations must not block: they
//! run inline on the task driving the call.

use std::time::Duration;

use crate::http::request::RequestId;
use crate::resilience::gate::DecisionGate;

/// Observer of a call's lifecycle. All methods default to doing nothing.
pub trait LifecycleHooks: Send + Sync {
    /// First event of every call.
    fn on_request_start(&self, _topic: &str, _id: &RequestId) {}

    /// The call is still running after `is_delayed_after`. Fires at most once.
    fn on_request_delayed(&self, _topic: &str, _id: &RequestId) {}

    /// A retry is scheduled; emitted before the backoff wait.
    fn on_request_retry(
        &self,
        _topic: &str,
        _id: &RequestId,
        _retry_count: usize,
        _next_retry: Duration,
        _failed_on_status: u16,
    ) {
    }

    /// The retry budget is used up and the call waits for `gate`.
    ///
    /// `retry_count` is the number of automatic retries made in this cycle
    /// (the budget); the attempt that just failed is not counted.
    ///
    /// Dropping the gate without resolving it abandons the call.
    fn on_waiting_for_user_decision(
        &self,
        _topic: &str,
        _id: &RequestId,
        _retry_count: usize,
        _failed_on_status: u16,
        _gate: DecisionGate,
    ) {
    }

    /// The call failed terminally. `message` is the topic's fail message.
    fn on_fail(&self, _topic: &str, _id: &RequestId, _message: &str) {}

    /// Last event of every call.
    fn on_request_finalize(&self, _topic: &str, _id: &RequestId) {}
}

/// Hooks that ignore every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl LifecycleHooks for NoopHooks {}
