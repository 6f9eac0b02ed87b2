//! In-memory secret store for testing.
//!
//! [`FakeSecretStore`] implements [`SecretStore`] with configurable
//! credentials, per-location secrets and failures, and counts every call so
//! tests can assert exactly which candidates were tried.

use approle_vault_client::{
    AuthInfo, Engine, KvVersion, MountInfo, MountStrategy, SecretPayload, SecretStore, TokenInfo,
    VaultError, VaultResult,
};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Token issued by the fake store on a successful login.
pub const FAKE_TOKEN: &str = "hvs.fake-token";

/// A concrete place a secret can live: engine, mount and path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    /// Engine addressing mode
    pub engine: Engine,
    /// Mount point name, without slashes
    pub mount: String,
    /// Path under the mount
    pub path: String,
}

impl Location {
    /// Location a strategy addresses for `path`.
    #[must_use]
    pub fn of(strategy: &MountStrategy, path: &str) -> Self {
        Self {
            engine: strategy.engine,
            mount: strategy.mount.trim_matches('/').to_string(),
            path: path.to_string(),
        }
    }

    /// KV v2 location.
    #[must_use]
    pub fn kv_v2(mount: &str, path: &str) -> Self {
        Self::of(&MountStrategy::kv_v2(mount), path)
    }

    /// KV v1 location.
    #[must_use]
    pub fn kv_v1(mount: &str, path: &str) -> Self {
        Self::of(&MountStrategy::kv_v1(mount), path)
    }

    /// Raw location.
    #[must_use]
    pub fn raw(mount: &str, path: &str) -> Self {
        Self::of(&MountStrategy::raw(mount), path)
    }

    fn from_raw_path(full: &str) -> Self {
        let (mount, path) = full.split_once('/').unwrap_or((full, ""));
        Self::raw(mount, path)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let engine = match self.engine {
            Engine::Kv(version) => format!("kv-{version}"),
            Engine::Raw => "raw".to_string(),
        };
        write!(f, "{engine}:{}/{}", self.mount, self.path)
    }
}

/// Number of calls per store capability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    /// `approle_login`
    pub login: usize,
    /// `lookup_self`
    pub lookup: usize,
    /// `renew_self`
    pub renew: usize,
    /// `kv_read` and `raw_read`
    pub reads: usize,
    /// `kv_write` and `raw_write`
    pub writes: usize,
    /// `list_mounts`
    pub list_mounts: usize,
}

impl CallCounts {
    /// Total number of store calls.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.login + self.lookup + self.renew + self.reads + self.writes + self.list_mounts
    }
}

#[derive(Debug, Default)]
struct FakeState {
    accepted: Option<(String, String)>,
    valid_tokens: HashSet<String>,
    reject_lookup: bool,
    reject_renew: bool,
    secrets: HashMap<Location, SecretPayload>,
    versions: HashMap<Location, u64>,
    forbidden: HashSet<Location>,
    failing: HashSet<Location>,
    calls: CallCounts,
    attempts: Vec<Location>,
}

/// In-memory [`SecretStore`].
///
/// Unknown locations behave like unmounted paths and report not found.
#[derive(Debug, Default)]
pub struct FakeSecretStore {
    state: Mutex<FakeState>,
}

impl FakeSecretStore {
    /// Create a store that accepts no credentials.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Accept exactly this role/secret pair.
    #[must_use]
    pub fn accepting(self, role_id: &str, secret_id: &str) -> Self {
        self.state().accepted = Some((role_id.to_string(), secret_id.to_string()));
        self
    }

    /// Store a secret at `location`.
    #[must_use]
    pub fn with_secret(self, location: Location, payload: SecretPayload) -> Self {
        {
            let mut state = self.state();
            state.versions.insert(location.clone(), 1);
            state.secrets.insert(location, payload);
        }
        self
    }

    /// Answer `location` with permission denied.
    #[must_use]
    pub fn forbidding(self, location: Location) -> Self {
        self.state().forbidden.insert(location);
        self
    }

    /// Answer `location` with a transport failure.
    #[must_use]
    pub fn failing(self, location: Location) -> Self {
        self.state().failing.insert(location);
        self
    }

    /// Fail every token self-lookup.
    #[must_use]
    pub fn rejecting_lookup(self) -> Self {
        self.state().reject_lookup = true;
        self
    }

    /// Fail every renewal with a store error.
    #[must_use]
    pub fn rejecting_renew(self) -> Self {
        self.state().reject_renew = true;
        self
    }

    /// Invalidate every issued token.
    pub fn revoke_tokens(&self) {
        self.state().valid_tokens.clear();
    }

    /// Calls made so far.
    #[must_use]
    pub fn calls(&self) -> CallCounts {
        self.state().calls
    }

    /// Read and write locations in the order they were tried.
    #[must_use]
    pub fn attempts(&self) -> Vec<Location> {
        self.state().attempts.clone()
    }

    /// Secret currently stored at `location`.
    #[must_use]
    pub fn stored(&self, location: &Location) -> Option<SecretPayload> {
        self.state().secrets.get(location).cloned()
    }

    fn check_token(state: &FakeState, token: &SecretString) -> VaultResult<()> {
        if state.valid_tokens.contains(token.expose_secret()) {
            Ok(())
        } else {
            Err(VaultError::PermissionDenied("invalid token".to_string()))
        }
    }

    fn check_location(state: &FakeState, location: &Location) -> VaultResult<()> {
        if state.failing.contains(location) {
            return Err(VaultError::transport(format!("connection reset at {location}")));
        }
        if state.forbidden.contains(location) {
            return Err(VaultError::PermissionDenied(location.to_string()));
        }
        Ok(())
    }

    fn read(&self, token: &SecretString, location: Location) -> VaultResult<Value> {
        let mut state = self.state();
        state.calls.reads += 1;
        state.attempts.push(location.clone());
        Self::check_token(&state, token)?;
        Self::check_location(&state, &location)?;

        let payload = state
            .secrets
            .get(&location)
            .ok_or_else(|| VaultError::not_found(location.to_string()))?;
        let version = state.versions.get(&location).copied().unwrap_or(1);

        Ok(match location.engine {
            Engine::Kv(KvVersion::V2) => json!({
                "data": {"data": payload, "metadata": {"version": version}},
                "lease_duration": 0
            }),
            Engine::Kv(KvVersion::V1) | Engine::Raw => json!({
                "data": payload,
                "lease_duration": 2_764_800
            }),
        })
    }

    fn write(
        &self,
        token: &SecretString,
        location: Location,
        payload: &SecretPayload,
    ) -> VaultResult<()> {
        let mut state = self.state();
        state.calls.writes += 1;
        state.attempts.push(location.clone());
        Self::check_token(&state, token)?;
        Self::check_location(&state, &location)?;

        *state.versions.entry(location.clone()).or_insert(0) += 1;
        state.secrets.insert(location, payload.clone());
        Ok(())
    }
}

#[async_trait]
impl SecretStore for FakeSecretStore {
    async fn approle_login(&self, role_id: &str, secret_id: &SecretString) -> VaultResult<AuthInfo> {
        let mut state = self.state();
        state.calls.login += 1;

        let accepted = state
            .accepted
            .as_ref()
            .is_some_and(|(r, s)| r == role_id && s == secret_id.expose_secret());
        if !accepted {
            return Err(VaultError::auth_failed("invalid role_id or secret_id"));
        }

        state.valid_tokens.insert(FAKE_TOKEN.to_string());
        Ok(AuthInfo {
            client_token: SecretString::from(FAKE_TOKEN),
            accessor: Some("fake-accessor".to_string()),
            policies: vec!["default".to_string()],
            lease_duration: 3600,
            renewable: true,
        })
    }

    async fn lookup_self(&self, token: &SecretString) -> VaultResult<TokenInfo> {
        let mut state = self.state();
        state.calls.lookup += 1;
        if state.reject_lookup {
            return Err(VaultError::PermissionDenied("token lookup denied".to_string()));
        }
        Self::check_token(&state, token)?;

        Ok(TokenInfo {
            policies: vec!["default".to_string()],
            ttl: 3600,
            renewable: true,
            display_name: Some("approle".to_string()),
        })
    }

    async fn renew_self(&self, token: &SecretString) -> VaultResult<AuthInfo> {
        let mut state = self.state();
        state.calls.renew += 1;
        if state.reject_renew {
            return Err(VaultError::store(500, "renewal unavailable"));
        }
        Self::check_token(&state, token)?;

        Ok(AuthInfo {
            client_token: token.clone(),
            accessor: Some("fake-accessor".to_string()),
            policies: vec!["default".to_string()],
            lease_duration: 7200,
            renewable: true,
        })
    }

    async fn kv_read(
        &self,
        token: &SecretString,
        version: KvVersion,
        mount: &str,
        path: &str,
    ) -> VaultResult<Value> {
        let strategy = match version {
            KvVersion::V1 => MountStrategy::kv_v1(mount),
            KvVersion::V2 => MountStrategy::kv_v2(mount),
        };
        self.read(token, Location::of(&strategy, path))
    }

    async fn kv_write(
        &self,
        token: &SecretString,
        version: KvVersion,
        mount: &str,
        path: &str,
        payload: &SecretPayload,
    ) -> VaultResult<()> {
        let strategy = match version {
            KvVersion::V1 => MountStrategy::kv_v1(mount),
            KvVersion::V2 => MountStrategy::kv_v2(mount),
        };
        self.write(token, Location::of(&strategy, path), payload)
    }

    async fn raw_read(&self, token: &SecretString, path: &str) -> VaultResult<Value> {
        self.read(token, Location::from_raw_path(path))
    }

    async fn raw_write(
        &self,
        token: &SecretString,
        path: &str,
        payload: &SecretPayload,
    ) -> VaultResult<()> {
        self.write(token, Location::from_raw_path(path), payload)
    }

    async fn list_mounts(&self, token: &SecretString) -> VaultResult<Vec<MountInfo>> {
        let mut state = self.state();
        state.calls.list_mounts += 1;
        Self::check_token(&state, token)?;

        Ok(vec![
            MountInfo {
                path: "kv/".to_string(),
                engine_type: "kv".to_string(),
                version: Some("1".to_string()),
            },
            MountInfo {
                path: "secret/".to_string(),
                engine_type: "kv".to_string(),
                version: Some("2".to_string()),
            },
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_display() {
        assert_eq!(Location::kv_v2("secret", "app/config").to_string(), "kv-v2:secret/app/config");
        assert_eq!(Location::from_raw_path("secret/app/config"), Location::raw("secret", "app/config"));
    }

    #[test]
    fn test_call_counts_total() {
        let counts = CallCounts {
            login: 1,
            lookup: 1,
            reads: 3,
            ..CallCounts::default()
        };
        assert_eq!(counts.total(), 5);
    }
}
