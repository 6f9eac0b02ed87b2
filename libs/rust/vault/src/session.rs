//! AppRole session: login, token verification and renewal.

use crate::{
    config::VaultConfig,
    error::{VaultError, VaultResult},
    store::{SecretStore, TokenInfo},
};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, error, info, instrument, warn};

/// A single authenticated session against the secret store.
///
/// The session starts unauthenticated. `authenticated` is only ever set
/// after the store confirmed the freshly issued token with a self-lookup,
/// so an authenticated session always holds a non-empty, verified token.
/// Mutating operations take `&mut self`; share a session across tasks only
/// behind your own synchronization.
#[derive(Debug)]
pub struct AuthSession<S> {
    store: S,
    config: VaultConfig,
    token: Option<SecretString>,
    authenticated: bool,
    token_info: Option<TokenInfo>,
}

impl<S: SecretStore> AuthSession<S> {
    /// Create an unauthenticated session.
    pub const fn new(store: S, config: VaultConfig) -> Self {
        Self {
            store,
            config,
            token: None,
            authenticated: false,
            token_info: None,
        }
    }

    /// Underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Session configuration.
    pub const fn config(&self) -> &VaultConfig {
        &self.config
    }

    /// Whether a verified token is held.
    pub const fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Token details from the last verification or renewal.
    pub const fn token_info(&self) -> Option<&TokenInfo> {
        self.token_info.as_ref()
    }

    /// The verified token.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::NotAuthenticated`] before a successful login.
    pub fn token(&self) -> VaultResult<&SecretString> {
        match (&self.token, self.authenticated) {
            (Some(token), true) => Ok(token),
            _ => Err(VaultError::NotAuthenticated),
        }
    }

    fn reset(&mut self) {
        self.token = None;
        self.authenticated = false;
        self.token_info = None;
    }

    /// Log in and verify the issued token.
    ///
    /// Any previous token is dropped first, so a failed re-authentication
    /// leaves the session unauthenticated.
    ///
    /// # Errors
    ///
    /// - [`VaultError::MissingCredentials`] without contacting the store
    /// - [`VaultError::AuthFailure`] when the pair is rejected or the token
    ///   does not verify
    /// - transport and store errors as classified by the store
    #[instrument(skip(self), fields(role_id = %self.config.credentials.role_id))]
    pub async fn try_authenticate(&mut self) -> VaultResult<&TokenInfo> {
        self.reset();

        let credentials = &self.config.credentials;
        if !credentials.is_complete() {
            return Err(VaultError::MissingCredentials(
                "role_id or secret_id".to_string(),
            ));
        }

        info!("Authenticating with AppRole");
        let auth = self
            .store
            .approle_login(&credentials.role_id, &credentials.secret_id)
            .await?;

        if auth.client_token.expose_secret().is_empty() {
            return Err(VaultError::auth_failed("login returned an empty client token"));
        }
        debug!(
            accessor = auth.accessor.as_deref().unwrap_or("-"),
            lease_secs = auth.lease_duration,
            "Login accepted, verifying token"
        );

        let info = match self.store.lookup_self(&auth.client_token).await {
            Ok(info) => info,
            Err(e) => {
                error!(error = %e, "Authentication failed - token invalid");
                return Err(match e {
                    VaultError::PermissionDenied(msg) | VaultError::InvalidRequest(msg) => {
                        VaultError::auth_failed(format!("token verification failed: {msg}"))
                    }
                    other => other,
                });
            }
        };

        info!(
            policies = ?info.policies,
            ttl_secs = info.ttl,
            renewable = info.renewable,
            "Authenticated with Vault"
        );
        self.token = Some(auth.client_token);
        self.authenticated = true;
        self.log_mounts().await;

        Ok(self.token_info.insert(info))
    }

    /// Log in; `true` only once the token has been verified.
    ///
    /// Never propagates a fault: every failure is logged with its
    /// classification and reported as `false`.
    pub async fn authenticate(&mut self) -> bool {
        match self.try_authenticate().await {
            Ok(_) => true,
            Err(e) => {
                error!(kind = e.kind(), error = %e, "Vault authentication failed");
                false
            }
        }
    }

    /// Extend the current token's lease.
    ///
    /// Returns the new lease duration in seconds. A token the store now
    /// refuses outright drops the session back to unauthenticated; other
    /// failures leave the session as it was. No re-login is attempted.
    ///
    /// # Errors
    ///
    /// [`VaultError::NotAuthenticated`] without contacting the store when no
    /// verified token is held; otherwise the classified store error.
    #[instrument(skip(self))]
    pub async fn try_renew(&mut self) -> VaultResult<u64> {
        let token = self.token()?;

        info!("Renewing token");
        match self.store.renew_self(token).await {
            Ok(auth) => {
                if !auth.client_token.expose_secret().is_empty() {
                    self.token = Some(auth.client_token);
                }
                if let Some(info) = self.token_info.as_mut() {
                    info.ttl = auth.lease_duration;
                    info.renewable = auth.renewable;
                }
                info!(lease_secs = auth.lease_duration, "Token renewed");
                Ok(auth.lease_duration)
            }
            Err(e) => {
                if matches!(e, VaultError::PermissionDenied(_)) {
                    warn!("Store rejected the token, session is no longer authenticated");
                    self.reset();
                }
                Err(e)
            }
        }
    }

    /// Renew the token; `false` when not authenticated or on any error.
    pub async fn renew(&mut self) -> bool {
        match self.try_renew().await {
            Ok(_) => true,
            Err(VaultError::NotAuthenticated) => {
                error!("Not authenticated with Vault");
                false
            }
            Err(e) => {
                error!(kind = e.kind(), error = %e, "Error renewing token");
                false
            }
        }
    }

    async fn log_mounts(&self) {
        let Some(token) = self.token.as_ref() else {
            return;
        };

        match self.store.list_mounts(token).await {
            Ok(mounts) => {
                for mount in mounts {
                    debug!(
                        path = %mount.path,
                        engine = %mount.engine_type,
                        version = mount.version.as_deref().unwrap_or("-"),
                        "Available secret engine"
                    );
                }
            }
            Err(e) => warn!(error = %e, "Could not list mounted secret engines"),
        }
    }
}
