//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ClientConfig.resilience (global defaults)
//!
//! Per call:
//!     global defaults + ResilienceOverrides
//!     → ResilienceConfig::resolve (immutable snapshot)
//!     → resolver.rs (topic overrides applied at read time)
//! ```
//!
//! # Design Decisions
//! - A resolved config is never mutated during a call
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod resolver;
pub mod schema;
pub mod validation;

pub use resolver::TopicFlag;
pub use schema::ClientConfig;
pub use schema::ResilienceConfig;
pub use schema::ResilienceOverrides;
pub use schema::ResilienceSettings;
pub use schema::TopicOverride;
