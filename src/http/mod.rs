//! HTTP request subsystem.
//!
//! # Data Flow
//! ```text
//! caller
//!     → client.rs (snapshot defaults, resolve per-call policy)
//!     → invoker.rs (call id, delay timer, failover, finalize)
//!     → resilience::engine (retry / backoff / user gating)
//!     → transport.rs (single attempt)
//! ```

pub mod client;
pub mod invoker;
pub mod request;
pub mod transport;

pub use client::ResilientHttpClient;
pub use invoker::invoke;
pub use request::{RequestId, RequestOptions};
pub use transport::{HttpResponse, ReqwestTransport, Transport};
