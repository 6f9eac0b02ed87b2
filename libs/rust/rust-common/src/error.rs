//! Centralized error types for the workspace libraries.
//!
//! Errors raised by the shared plumbing (HTTP client construction,
//! environment parsing) are classified as transient or permanent so that
//! callers can tell a flaky network from a broken deployment.

use thiserror::Error;

/// Common error type for platform operations.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// HTTP client construction failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A required configuration value is absent or empty
    #[error("Missing required configuration: {0}")]
    MissingConfig(String),

    /// A configuration value could not be parsed
    #[error("Invalid configuration {name}: {reason}")]
    InvalidConfig {
        /// Name of the offending variable or key
        name: String,
        /// Why the value was rejected
        reason: String,
    },
}

impl PlatformError {
    /// Check if this error is transient.
    ///
    /// Only connection and timeout failures of the HTTP client are
    /// transient; configuration errors are permanent.
    ///
    /// # Examples
    ///
    /// ```
    /// use rust_common::PlatformError;
    ///
    /// let err = PlatformError::missing_config("VAULT_ADDR");
    /// assert!(!err.is_transient());
    /// ```
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// Create a missing configuration error for the given key.
    #[must_use]
    pub fn missing_config(name: impl Into<String>) -> Self {
        Self::MissingConfig(name.into())
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
