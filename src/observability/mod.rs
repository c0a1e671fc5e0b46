//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Every call produces:
//!     → logging.rs (structured log events, tagged with topic and id)
//!     → metrics.rs (counters and latency histogram)
//! ```
//!
//! # Design Decisions
//! - The call id flows through every log event of a call
//! - Metrics are no-ops without an installed recorder

pub mod logging;
pub mod metrics;
