//! AppRole credential resolution.
//!
//! Role and secret identifiers come either from the process environment or
//! from a key-value connection supplied by an orchestration runtime. Both
//! are flat string maps; only the key names differ.

use crate::error::{VaultError, VaultResult};
use rust_common::env::{ConfigSource, optional};
use secrecy::{ExposeSecret, SecretString};

/// Environment key holding the AppRole role id.
pub const ENV_ROLE_ID: &str = "VAULT_ROLE_ID";
/// Environment key holding the AppRole secret id.
pub const ENV_SECRET_ID: &str = "VAULT_SECRET_ID";
/// Connection key holding the AppRole role id.
pub const CONN_ROLE_ID: &str = "role_id";
/// Connection key holding the AppRole secret id.
pub const CONN_SECRET_ID: &str = "secret_id";

/// An AppRole role/secret pair.
#[derive(Debug, Clone)]
pub struct AppRoleCredentials {
    /// Role identifier (not secret, safe to log)
    pub role_id: String,
    /// Secret identifier
    pub secret_id: SecretString,
}

impl AppRoleCredentials {
    /// Create a credential pair.
    #[must_use]
    pub fn new(role_id: impl Into<String>, secret_id: impl Into<String>) -> Self {
        Self {
            role_id: role_id.into(),
            secret_id: SecretString::from(secret_id.into()),
        }
    }

    /// Both halves of the pair are non-blank.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.role_id.trim().is_empty() && !self.secret_id.expose_secret().trim().is_empty()
    }
}

/// Something that can hand out an AppRole credential pair.
pub trait CredentialSource {
    /// Resolve the credential pair.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::MissingCredentials`] naming every absent key.
    fn credentials(&self) -> VaultResult<AppRoleCredentials>;
}

/// Credentials read from a flat source under a pair of key names.
#[derive(Debug, Clone)]
pub struct KeyedCredentials<C> {
    source: C,
    role_key: &'static str,
    secret_key: &'static str,
}

impl<C: ConfigSource> KeyedCredentials<C> {
    /// Read `VAULT_ROLE_ID` / `VAULT_SECRET_ID`.
    pub const fn env(source: C) -> Self {
        Self {
            source,
            role_key: ENV_ROLE_ID,
            secret_key: ENV_SECRET_ID,
        }
    }

    /// Read `role_id` / `secret_id` from a key-value connection.
    pub const fn connection(source: C) -> Self {
        Self {
            source,
            role_key: CONN_ROLE_ID,
            secret_key: CONN_SECRET_ID,
        }
    }
}

impl<C: ConfigSource> CredentialSource for KeyedCredentials<C> {
    fn credentials(&self) -> VaultResult<AppRoleCredentials> {
        let role_id = optional(&self.source, self.role_key);
        let secret_id = optional(&self.source, self.secret_key);

        match (role_id, secret_id) {
            (Some(role_id), Some(secret_id)) => Ok(AppRoleCredentials::new(role_id, secret_id)),
            (role_id, secret_id) => {
                let missing: Vec<&str> = [
                    role_id.is_none().then_some(self.role_key),
                    secret_id.is_none().then_some(self.secret_key),
                ]
                .into_iter()
                .flatten()
                .collect();
                Err(VaultError::MissingCredentials(missing.join(", ")))
            }
        }
    }
}

impl CredentialSource for AppRoleCredentials {
    fn credentials(&self) -> VaultResult<AppRoleCredentials> {
        if self.is_complete() {
            Ok(self.clone())
        } else {
            Err(VaultError::MissingCredentials("role_id or secret_id".to_string()))
        }
    }
}
