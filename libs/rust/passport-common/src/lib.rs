//! Shared library for cross-cutting concerns in the passport auth services.
//!
//! This crate provides centralized implementations for:
//! - Error types with retryability classification
//! - The key-value cache contract used by revocation, plus an in-process store
//! - Tracing subscriber initialisation

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cache_client;
pub mod error;
pub mod tracing_config;

pub use cache_client::{with_deadline, CacheClientConfig, CacheStore, MemoryCache};
pub use error::PlatformError;
pub use tracing_config::{init_tracing, TracingConfig};
