//! Tool adapter errors.

use approle_vault_client::VaultError;
use thiserror::Error;

/// Errors raised while running a tool.
#[derive(Error, Debug)]
pub enum ToolError {
    /// Credentials missing from the connection
    #[error("role_id or secret_id not found in connections.")]
    MissingCredentials,

    /// The client could not be configured
    #[error("Failed to initialize Vault client: {0}")]
    Init(String),

    /// Login or token verification failed
    #[error("Failed to authenticate to Vault with AppRole.")]
    AuthenticationFailed,

    /// Token renewal failed
    #[error("Token renewal failed.")]
    RenewalFailed,

    /// No secret at the requested path
    #[error("No secret found at path: {0}")]
    SecretNotFound(String),

    /// The secret could not be written
    #[error("Failed to write secret to {0}")]
    WriteFailed(String),

    /// The supplied payload is not a JSON object
    #[error("Invalid secret payload: {0}")]
    InvalidPayload(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Any other store failure
    #[error("Vault error: {0}")]
    Vault(String),
}

impl ToolError {
    /// Render the error the way tools report it.
    #[must_use]
    pub fn to_tool_output(&self) -> String {
        format!("Error: {self}")
    }
}

impl From<VaultError> for ToolError {
    fn from(err: VaultError) -> Self {
        match err {
            VaultError::MissingCredentials(_) => Self::MissingCredentials,
            VaultError::NotAuthenticated | VaultError::AuthFailure(_) => {
                Self::AuthenticationFailed
            }
            VaultError::NotFound(path) => Self::SecretNotFound(path),
            VaultError::WriteFailed { path, .. } => Self::WriteFailed(path),
            e @ VaultError::Platform(_) => {
                Self::Config(e.to_string())
            }
            other => Self::Vault(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_output() {
        assert_eq!(
            ToolError::MissingCredentials.to_tool_output(),
            "Error: role_id or secret_id not found in connections."
        );
        assert_eq!(
            ToolError::AuthenticationFailed.to_tool_output(),
            "Error: Failed to authenticate to Vault with AppRole."
        );
    }

    #[test]
    fn test_from_vault_error() {
        let err: ToolError = VaultError::MissingCredentials("role_id".into()).into();
        assert!(matches!(err, ToolError::MissingCredentials));

        let err: ToolError = VaultError::not_found("app/config").into();
        assert_eq!(err.to_string(), "No secret found at path: app/config");

        let err: ToolError = VaultError::transport("refused").into();
        assert!(matches!(err, ToolError::Vault(_)));
    }
}
