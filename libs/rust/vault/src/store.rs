//! Capability surface of the secret store.
//!
//! The session and the resolver only ever talk to the store through this
//! trait, so tests can swap the HTTP implementation for an in-memory fake.
//! Tokens are passed per call; the store itself holds no session state.

use crate::error::VaultResult;
use crate::secrets::SecretPayload;
use async_trait::async_trait;
use secrecy::SecretString;
use serde_json::Value;
use std::fmt;

/// Key-value engine version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KvVersion {
    /// Unversioned engine: `{mount}/{path}`
    V1,
    /// Versioned engine: `{mount}/data/{path}`
    V2,
}

impl fmt::Display for KvVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V1 => f.write_str("v1"),
            Self::V2 => f.write_str("v2"),
        }
    }
}

/// Result of a successful login or token renewal.
#[derive(Debug, Clone)]
pub struct AuthInfo {
    /// Client token to send as `X-Vault-Token`
    pub client_token: SecretString,
    /// Token accessor, safe to log
    pub accessor: Option<String>,
    /// Policies attached to the token
    pub policies: Vec<String>,
    /// Lease duration in seconds
    pub lease_duration: u64,
    /// Whether the token can be renewed
    pub renewable: bool,
}

/// Result of a token self-lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenInfo {
    /// Policies attached to the token
    pub policies: Vec<String>,
    /// Remaining time to live in seconds
    pub ttl: u64,
    /// Whether the token can be renewed
    pub renewable: bool,
    /// Display name assigned by the auth method
    pub display_name: Option<String>,
}

/// A mounted secrets engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountInfo {
    /// Mount path including the trailing slash, e.g. `secret/`
    pub path: String,
    /// Engine type, e.g. `kv`
    pub engine_type: String,
    /// Engine version option for `kv` mounts
    pub version: Option<String>,
}

/// Operations the secret store must offer.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Log in with an AppRole role/secret pair.
    async fn approle_login(&self, role_id: &str, secret_id: &SecretString) -> VaultResult<AuthInfo>;

    /// Look up the token itself; succeeds only for a valid token.
    async fn lookup_self(&self, token: &SecretString) -> VaultResult<TokenInfo>;

    /// Extend the token's lease.
    async fn renew_self(&self, token: &SecretString) -> VaultResult<AuthInfo>;

    /// Read a key-value secret; returns the full response body.
    async fn kv_read(
        &self,
        token: &SecretString,
        version: KvVersion,
        mount: &str,
        path: &str,
    ) -> VaultResult<Value>;

    /// Create or update a key-value secret.
    async fn kv_write(
        &self,
        token: &SecretString,
        version: KvVersion,
        mount: &str,
        path: &str,
        payload: &SecretPayload,
    ) -> VaultResult<()>;

    /// Read an arbitrary API path; returns the full response body.
    async fn raw_read(&self, token: &SecretString, path: &str) -> VaultResult<Value>;

    /// Write an arbitrary API path.
    async fn raw_write(
        &self,
        token: &SecretString,
        path: &str,
        payload: &SecretPayload,
    ) -> VaultResult<()>;

    /// List mounted secrets engines.
    async fn list_mounts(&self, token: &SecretString) -> VaultResult<Vec<MountInfo>>;
}

#[async_trait]
impl<S: SecretStore + ?Sized> SecretStore for std::sync::Arc<S> {
    async fn approle_login(&self, role_id: &str, secret_id: &SecretString) -> VaultResult<AuthInfo> {
        (**self).approle_login(role_id, secret_id).await
    }

    async fn lookup_self(&self, token: &SecretString) -> VaultResult<TokenInfo> {
        (**self).lookup_self(token).await
    }

    async fn renew_self(&self, token: &SecretString) -> VaultResult<AuthInfo> {
        (**self).renew_self(token).await
    }

    async fn kv_read(
        &self,
        token: &SecretString,
        version: KvVersion,
        mount: &str,
        path: &str,
    ) -> VaultResult<Value> {
        (**self).kv_read(token, version, mount, path).await
    }

    async fn kv_write(
        &self,
        token: &SecretString,
        version: KvVersion,
        mount: &str,
        path: &str,
        payload: &SecretPayload,
    ) -> VaultResult<()> {
        (**self).kv_write(token, version, mount, path, payload).await
    }

    async fn raw_read(&self, token: &SecretString, path: &str) -> VaultResult<Value> {
        (**self).raw_read(token, path).await
    }

    async fn raw_write(
        &self,
        token: &SecretString,
        path: &str,
        payload: &SecretPayload,
    ) -> VaultResult<()> {
        (**self).raw_write(token, path, payload).await
    }

    async fn list_mounts(&self, token: &SecretString) -> VaultResult<Vec<MountInfo>> {
        (**self).list_mounts(token).await
    }
}
