//! Shared library for cross-cutting concerns of the Vault AppRole tools.
//!
//! This crate provides centralized implementations for:
//! - Error types with transient/permanent classification
//! - HTTP client configuration and building (TLS verification, namespaces)
//! - Environment variable loading with `.env` support
//! - Tracing subscriber initialization

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod env;
pub mod error;
pub mod http;
pub mod tracing_config;

pub use error::PlatformError;
pub use http::{HttpConfig, build_http_client};
pub use tracing_config::{TracingConfig, init_tracing};
