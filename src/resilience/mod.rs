//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Attempt fails:
//!     → engine.rs (classify status, count retries)
//!     → delay.rs (backoff before the next attempt)
//!     → gate.rs (budget used up: wait for a user decision)
//!     → hooks.rs (lifecycle events at every transition)
//!
//! Alongside the whole call:
//!     → delay.rs (one-shot "request is slow" timer)
//! ```
//!
//! # Design Decisions
//! - One engine per call; no state is shared between calls
//! - Every suspension point is an awaited future, never a blocked thread
//! - A decision gate belongs to one escalation cycle and is never reused

pub mod delay;
pub mod engine;
pub mod gate;
pub mod hooks;

pub use delay::DelayTimer;
pub use engine::ResilienceEngine;
pub use gate::DecisionGate;
pub use hooks::{LifecycleHooks, NoopHooks};
