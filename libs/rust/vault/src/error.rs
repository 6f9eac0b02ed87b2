//! Vault error types using thiserror 2.0.
//!
//! Every fault the secret store or the transport can produce is classified
//! into one of these variants. Public client operations fold them into
//! boolean / optional results; the typed variants stay available for callers
//! that need the distinction.

use rust_common::PlatformError;
use thiserror::Error;

/// Vault-specific errors.
#[derive(Error, Debug)]
pub enum VaultError {
    /// Network or TLS failure before a response was received
    #[error("Transport error: {0}")]
    Transport(String),

    /// The role/secret pair was rejected
    #[error("Authentication failed: {0}")]
    AuthFailure(String),

    /// Operation attempted before a successful login
    #[error("Not authenticated with Vault")]
    NotAuthenticated,

    /// No candidate resolved the secret path
    #[error("Secret not found at path: {0}")]
    NotFound(String),

    /// Every write candidate failed
    #[error("Failed to write secret at path {path} ({attempts} attempts)")]
    WriteFailed {
        /// Logical secret path
        path: String,
        /// Number of candidates tried
        attempts: usize,
    },

    /// The store refused access to the path
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// The store rejected the request as malformed
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Any other store-reported fault
    #[error("Store error (status {status}): {message}")]
    Store {
        /// HTTP status returned by the store
        status: u16,
        /// Error text returned by the store
        message: String,
    },

    /// The logical secret path is unusable
    #[error("Invalid secret path: {0:?}")]
    InvalidPath(String),

    /// Role or secret identifier missing from the credential source
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Platform error
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

/// Result type for Vault operations.
pub type VaultResult<T> = Result<T, VaultError>;

impl VaultError {
    /// Check if the error came from the network rather than from the store.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Platform(e) => e.is_transient(),
            _ => false,
        }
    }

    /// Short classification label used in log fields.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::AuthFailure(_) => "auth_failure",
            Self::NotAuthenticated => "not_authenticated",
            Self::NotFound(_) => "not_found",
            Self::WriteFailed { .. } => "write_failed",
            Self::PermissionDenied(_) => "permission_denied",
            Self::InvalidRequest(_) => "invalid_request",
            Self::Store { .. } => "store",
            Self::InvalidPath(_) => "invalid_path",
            Self::MissingCredentials(_) | Self::Platform(_) => "config",
            Self::Serialization(_) => "serialization",
        }
    }

    /// Create a transport error.
    #[must_use]
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create an authentication failure.
    #[must_use]
    pub fn auth_failed(msg: impl Into<String>) -> Self {
        Self::AuthFailure(msg.into())
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }

    /// Create a generic store error.
    #[must_use]
    pub fn store(status: u16, message: impl Into<String>) -> Self {
        Self::Store {
            status,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VaultError::transport("connection refused");
        assert_eq!(err.to_string(), "Transport error: connection refused");

        let err = VaultError::store(503, "sealed");
        assert_eq!(err.to_string(), "Store error (status 503): sealed");

        let err = VaultError::InvalidPath(String::new());
        assert_eq!(err.to_string(), "Invalid secret path: \"\"");
    }

    #[test]
    fn test_transport_classification() {
        assert!(VaultError::transport("timeout").is_transport());
        assert!(!VaultError::Platform(PlatformError::missing_config("VAULT_ADDR")).is_transport());
        assert!(!VaultError::not_found("app/config").is_transport());
        assert!(!VaultError::NotAuthenticated.is_transport());
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(VaultError::auth_failed("bad pair").kind(), "auth_failure");
        assert_eq!(VaultError::PermissionDenied("kv".into()).kind(), "permission_denied");
        assert_eq!(VaultError::MissingCredentials("role_id".into()).kind(), "config");
    }

    #[test]
    fn test_from_platform_error() {
        let vault_err: VaultError = PlatformError::missing_config("VAULT_ADDR").into();
        assert!(matches!(vault_err, VaultError::Platform(_)));
        assert_eq!(vault_err.to_string(), "Missing required configuration: VAULT_ADDR");
    }
}
