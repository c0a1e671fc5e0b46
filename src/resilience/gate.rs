//! Single-resolution user decision gate.
//!
//! A gate is created for one escalation cycle and handed to exactly one
//! decision maker. Resolving consumes the gate, so it can be resolved at most
//! once and never reused. If the call is dropped while waiting, the waiting
//! side goes away with it and a late resolution is simply discarded.

use std::fmt;
use tokio::sync::oneshot;

/// Decision maker's side: resume (`true`) or abandon (`false`) the call.
pub struct DecisionGate {
    tx: oneshot::Sender<bool>,
}

/// Engine's side of a gate.
#[derive(Debug)]
pub struct DecisionWaiter {
    rx: oneshot::Receiver<bool>,
}

/// Create a fresh, unresolved gate.
pub fn decision_gate() -> (DecisionGate, DecisionWaiter) {
    let (tx, rx) = oneshot::channel();
    (DecisionGate { tx }, DecisionWaiter { rx })
}

impl DecisionGate {
    /// Deliver the decision. Returns `false` if the call is no longer waiting.
    pub fn resolve(self, retry: bool) -> bool {
        self.tx.send(retry).is_ok()
    }

    pub fn retry(self) -> bool {
        self.resolve(true)
    }

    pub fn abandon(self) -> bool {
        self.resolve(false)
    }

    /// True once the waiting call has gone away.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl fmt::Debug for DecisionGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecisionGate")
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl DecisionWaiter {
    /// Wait for the first decision. A gate dropped unresolved counts as abandon.
    pub async fn decision(self) -> bool {
        match self.rx.await {
            Ok(retry) => retry,
            Err(_) => {
                tracing::warn!("Decision gate dropped without a decision, abandoning");
                false
            }
        }
    }
}
