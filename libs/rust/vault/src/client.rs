//! Vault client: an AppRole session paired with a secret path resolver.

use crate::{
    config::VaultConfig,
    error::{VaultError, VaultResult},
    http_store::HttpSecretStore,
    resolver::{MountStrategy, SecretResolver},
    secrets::SecretPayload,
    session::AuthSession,
    store::SecretStore,
};
use tracing::{error, warn};

/// Vault client exposing the public operations.
///
/// `authenticate`, `renew_token`, `read_secret` and `write_secret` never
/// surface a fault: failures are logged and reported as `false` / `None`.
/// The `try_*` variants return the classified [`VaultError`] instead.
#[derive(Debug)]
pub struct VaultClient<S = HttpSecretStore> {
    session: AuthSession<S>,
    resolver: SecretResolver,
}

impl VaultClient<HttpSecretStore> {
    /// Create a client talking HTTP to the configured endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: VaultConfig) -> VaultResult<Self> {
        let store = HttpSecretStore::new(&config)?;
        Ok(Self::with_store(store, config))
    }

    /// Create a client from `VAULT_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required variables are missing or invalid.
    pub fn from_env() -> VaultResult<Self> {
        Self::new(VaultConfig::from_env()?)
    }
}

impl<S: SecretStore> VaultClient<S> {
    /// Create a client over any store, using the default candidate list.
    pub fn with_store(store: S, config: VaultConfig) -> Self {
        Self {
            session: AuthSession::new(store, config),
            resolver: SecretResolver::default(),
        }
    }

    /// Replace the candidate list.
    #[must_use]
    pub fn with_strategies(mut self, strategies: Vec<MountStrategy>) -> Self {
        self.resolver = SecretResolver::new(strategies);
        self
    }

    /// The underlying session.
    pub const fn session(&self) -> &AuthSession<S> {
        &self.session
    }

    /// The resolver in use.
    pub const fn resolver(&self) -> &SecretResolver {
        &self.resolver
    }

    /// Whether a verified token is held.
    pub const fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Log in with the configured AppRole pair.
    pub async fn authenticate(&mut self) -> bool {
        self.session.authenticate().await
    }

    /// Renew the current token.
    pub async fn renew_token(&mut self) -> bool {
        self.session.renew().await
    }

    /// Read a secret, trying every candidate in order.
    ///
    /// # Errors
    ///
    /// See [`SecretResolver::read`].
    pub async fn try_read_secret(&self, path: &str) -> VaultResult<SecretPayload> {
        self.resolver.read(&self.session, path).await
    }

    /// Write a secret to the first candidate that accepts it.
    ///
    /// # Errors
    ///
    /// See [`SecretResolver::write`].
    pub async fn try_write_secret(
        &self,
        path: &str,
        payload: &SecretPayload,
    ) -> VaultResult<&MountStrategy> {
        self.resolver.write(&self.session, path, payload).await
    }

    /// Read a secret; `None` when it cannot be resolved.
    pub async fn read_secret(&self, path: &str) -> Option<SecretPayload> {
        match self.try_read_secret(path).await {
            Ok(payload) => Some(payload),
            Err(e) => {
                report(&e, path, "read");
                None
            }
        }
    }

    /// Write a secret; `false` when every candidate failed.
    pub async fn write_secret(&self, path: &str, payload: &SecretPayload) -> bool {
        match self.try_write_secret(path, payload).await {
            Ok(_) => true,
            Err(e) => {
                report(&e, path, "write");
                false
            }
        }
    }
}

fn report(err: &VaultError, path: &str, op: &str) {
    match err {
        VaultError::NotAuthenticated => error!(path, op, "Not authenticated with Vault"),
        VaultError::NotFound(_) => warn!(path, op, "No secret found"),
        other => error!(path, op, kind = other.kind(), error = %other, "Secret operation failed"),
    }
}
