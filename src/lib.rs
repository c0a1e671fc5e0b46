//! Resilient HTTP client library.
//!
//! Wraps single request-like operations with retry and backoff, slow-request
//! notification, optional user-gated escalation and failover responses.

pub mod config;
pub mod error;
pub mod http;
pub mod observability;
pub mod resilience;

pub use config::schema::{ClientConfig, ResilienceConfig, ResilienceOverrides, ResilienceSettings};
pub use error::{RequestError, TransportError};
pub use http::{ResilientHttpClient, ReqwestTransport, RequestId, RequestOptions};
pub use resilience::{DecisionGate, LifecycleHooks};
