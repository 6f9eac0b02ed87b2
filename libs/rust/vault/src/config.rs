//! Vault client configuration.

use crate::credentials::{AppRoleCredentials, CredentialSource, KeyedCredentials};
use crate::error::VaultResult;
use rust_common::HttpConfig;
use rust_common::env::{self, ConfigSource, ProcessEnv};
use std::time::Duration;

/// Vault client configuration.
#[derive(Debug, Clone)]
pub struct VaultConfig {
    /// Vault server address, e.g. `https://vault.example.com:8200`
    pub addr: String,
    /// Enterprise namespace sent as `X-Vault-Namespace`
    pub namespace: Option<String>,
    /// Whether TLS certificates are verified
    pub verify_tls: bool,
    /// Request timeout
    pub timeout: Duration,
    /// AppRole credential pair
    pub credentials: AppRoleCredentials,
}

impl VaultConfig {
    /// Create a new configuration.
    #[must_use]
    pub fn new(addr: impl Into<String>, credentials: AppRoleCredentials) -> Self {
        Self {
            addr: addr.into().trim_end_matches('/').to_string(),
            namespace: None,
            verify_tls: true,
            timeout: Duration::from_secs(30),
            credentials,
        }
    }

    /// Load configuration from the process environment, honouring `.env`.
    ///
    /// Reads `VAULT_ADDR`, `VAULT_NAMESPACE`, `VAULT_ROLE_ID`,
    /// `VAULT_SECRET_ID`, `VAULT_VERIFY_SSL` and `VAULT_TIMEOUT_SECS`.
    ///
    /// # Errors
    ///
    /// Returns an error if required variables are missing or invalid.
    pub fn from_env() -> VaultResult<Self> {
        env::load_dotenv();
        Self::from_source(&ProcessEnv)
    }

    /// Load configuration from any flat source using the `VAULT_*` keys.
    ///
    /// # Errors
    ///
    /// Returns an error if required values are missing or invalid.
    pub fn from_source<C: ConfigSource + Clone>(source: &C) -> VaultResult<Self> {
        let credentials = KeyedCredentials::env(source.clone()).credentials()?;
        let addr = env::required(source, "VAULT_ADDR")?;
        Self::endpoint_from(source, addr, credentials)
    }

    /// Build configuration for a key-value connection.
    ///
    /// The connection supplies `role_id` and `secret_id`, and may override
    /// the endpoint with `vault_addr`, `namespace` and `verify_ssl`; anything
    /// it lacks falls back to the `VAULT_*` keys of `defaults`.
    ///
    /// # Errors
    ///
    /// Returns an error if credentials or the address are missing.
    pub fn from_connection<C, D>(connection: &C, defaults: &D) -> VaultResult<Self>
    where
        C: ConfigSource + Clone,
        D: ConfigSource,
    {
        let credentials = KeyedCredentials::connection(connection.clone()).credentials()?;
        let addr = match env::optional(connection, "vault_addr") {
            Some(addr) => addr,
            None => env::required(defaults, "VAULT_ADDR")?,
        };

        let mut config = Self::endpoint_from(defaults, addr, credentials)?;
        if let Some(namespace) = env::optional(connection, "namespace") {
            config.namespace = Some(namespace);
        }
        config.verify_tls = env::flag_or(connection, "verify_ssl", config.verify_tls)?;
        Ok(config)
    }

    fn endpoint_from<C: ConfigSource>(
        source: &C,
        addr: String,
        credentials: AppRoleCredentials,
    ) -> VaultResult<Self> {
        let verify_tls = env::flag_or(source, "VAULT_VERIFY_SSL", true)?;
        let timeout = Duration::from_secs(env::parse_or(source, "VAULT_TIMEOUT_SECS", 30)?);

        let mut config = Self::new(addr, credentials)
            .with_verify_tls(verify_tls)
            .with_timeout(timeout);
        config.namespace = env::optional(source, "VAULT_NAMESPACE");
        Ok(config)
    }

    /// Replace the server address.
    #[must_use]
    pub fn with_addr(mut self, addr: impl Into<String>) -> Self {
        self.addr = addr.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the namespace.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Enable or disable TLS verification.
    #[must_use]
    pub const fn with_verify_tls(mut self, verify: bool) -> Self {
        self.verify_tls = verify;
        self
    }

    /// Set request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// HTTP client settings derived from this configuration.
    #[must_use]
    pub fn http_config(&self) -> HttpConfig {
        HttpConfig::default()
            .with_timeout(self.timeout)
            .with_verify_tls(self.verify_tls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_from_source() {
        let src = map(&[
            ("VAULT_ADDR", "https://vault.example.com:8200/"),
            ("VAULT_NAMESPACE", "admin"),
            ("VAULT_ROLE_ID", "r1"),
            ("VAULT_SECRET_ID", "s1"),
            ("VAULT_VERIFY_SSL", "false"),
        ]);
        let config = VaultConfig::from_source(&src).unwrap();
        assert_eq!(config.addr, "https://vault.example.com:8200");
        assert_eq!(config.namespace.as_deref(), Some("admin"));
        assert!(!config.verify_tls);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.credentials.role_id, "r1");
        assert_eq!(config.credentials.secret_id.expose_secret(), "s1");
    }

    #[test]
    fn test_from_source_requires_credentials_and_addr() {
        let src = map(&[("VAULT_ADDR", "http://127.0.0.1:8200")]);
        assert!(VaultConfig::from_source(&src).is_err());

        let src = map(&[("VAULT_ROLE_ID", "r1"), ("VAULT_SECRET_ID", "s1")]);
        assert!(VaultConfig::from_source(&src).is_err());
    }

    #[test]
    fn test_from_source_rejects_bad_flag() {
        let src = map(&[
            ("VAULT_ADDR", "http://127.0.0.1:8200"),
            ("VAULT_ROLE_ID", "r1"),
            ("VAULT_SECRET_ID", "s1"),
            ("VAULT_VERIFY_SSL", "sometimes"),
        ]);
        assert!(VaultConfig::from_source(&src).is_err());
    }

    #[test]
    fn test_from_connection_overrides_defaults() {
        let conn = map(&[
            ("role_id", "r1"),
            ("secret_id", "s1"),
            ("namespace", "team-a"),
            ("verify_ssl", "false"),
        ]);
        let defaults = map(&[
            ("VAULT_ADDR", "http://vault:8200"),
            ("VAULT_NAMESPACE", "admin"),
        ]);
        let config = VaultConfig::from_connection(&conn, &defaults).unwrap();
        assert_eq!(config.addr, "http://vault:8200");
        assert_eq!(config.namespace.as_deref(), Some("team-a"));
        assert!(!config.verify_tls);
        assert_eq!(config.credentials.role_id, "r1");
    }

    #[test]
    fn test_from_connection_with_own_addr() {
        let conn = map(&[
            ("role_id", "r1"),
            ("secret_id", "s1"),
            ("vault_addr", "http://10.0.0.5:8200"),
        ]);
        let config = VaultConfig::from_connection(&conn, &map(&[])).unwrap();
        assert_eq!(config.addr, "http://10.0.0.5:8200");
        assert!(config.verify_tls);
    }

    #[test]
    fn test_from_connection_missing_secret() {
        let conn = map(&[("role_id", "r1"), ("vault_addr", "http://vault:8200")]);
        let err = VaultConfig::from_connection(&conn, &map(&[])).unwrap_err();
        assert_eq!(err.to_string(), "Missing credentials: secret_id");
    }

    #[test]
    fn test_http_config() {
        let config = VaultConfig::new("http://vault:8200", AppRoleCredentials::new("r1", "s1"))
            .with_verify_tls(false)
            .with_timeout(Duration::from_secs(5));
        let http = config.http_config();
        assert!(!http.verify_tls);
        assert_eq!(http.timeout, Duration::from_secs(5));
    }
}
