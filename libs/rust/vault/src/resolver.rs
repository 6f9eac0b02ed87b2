//! Mount-point / engine-version fallback for logical secret paths.
//!
//! A logical path such as `app/config` says nothing about which engine
//! version or mount backs it. The resolver walks a fixed, ordered list of
//! [`MountStrategy`] candidates and stops at the first one that answers.
//! Every per-candidate failure is recorded as a [`MissReason`] and the scan
//! moves on; only exhaustion of the list is reported to the caller.

use crate::{
    error::{VaultError, VaultResult},
    secrets::{SecretPayload, payload_from_value},
    session::AuthSession,
    store::{KvVersion, SecretStore},
};
use serde_json::Value;
use std::fmt;
use tracing::{debug, error, info, instrument};

/// Alternate key-value mount tried before the default one.
pub const ALTERNATE_MOUNT: &str = "kv";
/// Default key-value mount.
pub const DEFAULT_MOUNT: &str = "secret";

/// How a candidate addresses the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Engine {
    /// Key-value engine of the given version
    Kv(KvVersion),
    /// Plain API read/write of `{mount}/{path}`
    Raw,
}

/// One (engine, mount) candidate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MountStrategy {
    /// Engine addressing mode
    pub engine: Engine,
    /// Mount point name
    pub mount: String,
}

impl MountStrategy {
    /// KV v2 at `mount`.
    #[must_use]
    pub fn kv_v2(mount: impl Into<String>) -> Self {
        Self {
            engine: Engine::Kv(KvVersion::V2),
            mount: mount.into(),
        }
    }

    /// KV v1 at `mount`.
    #[must_use]
    pub fn kv_v1(mount: impl Into<String>) -> Self {
        Self {
            engine: Engine::Kv(KvVersion::V1),
            mount: mount.into(),
        }
    }

    /// Raw read/write under `mount`.
    #[must_use]
    pub fn raw(mount: impl Into<String>) -> Self {
        Self {
            engine: Engine::Raw,
            mount: mount.into(),
        }
    }

    /// The fixed candidate order used by default.
    #[must_use]
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::kv_v2(ALTERNATE_MOUNT),
            Self::kv_v2(DEFAULT_MOUNT),
            Self::kv_v1(ALTERNATE_MOUNT),
            Self::kv_v1(DEFAULT_MOUNT),
            Self::raw(DEFAULT_MOUNT),
        ]
    }

    fn raw_path(&self, path: &str) -> String {
        format!("{}/{}", self.mount.trim_matches('/'), path)
    }

    /// Strip the engine envelope from a read response.
    ///
    /// KV v2 nests the secret under `data.data`, KV v1 under `data`. A raw
    /// read takes `data.data` when it is an object, else `data`, and the
    /// whole body only when there is no `data` key at all. Returns `None`
    /// when the selected value is not an object (for instance a soft-deleted
    /// KV v2 version whose inner data is `null`).
    #[must_use]
    pub fn unwrap_payload(&self, body: &Value) -> Option<SecretPayload> {
        let data = body.get("data");
        let inner = match self.engine {
            Engine::Kv(KvVersion::V2) => data.and_then(|d| d.get("data")),
            Engine::Kv(KvVersion::V1) => data,
            Engine::Raw => match data {
                Some(d) if d.get("data").is_some_and(Value::is_object) => d.get("data"),
                Some(d) => Some(d),
                None => Some(body),
            },
        }?;
        payload_from_value(inner)
    }
}

impl fmt::Display for MountStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.engine {
            Engine::Kv(version) => write!(f, "kv-{version}@{}", self.mount),
            Engine::Raw => write!(f, "raw@{}", self.mount),
        }
    }
}

/// Why a candidate did not produce a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissReason {
    /// The store has nothing at this candidate
    NotFound,
    /// The token may not access this candidate
    Forbidden,
    /// Any other failure, including transport errors
    Failed(String),
}

impl From<&VaultError> for MissReason {
    fn from(err: &VaultError) -> Self {
        match err {
            VaultError::NotFound(_) => Self::NotFound,
            VaultError::PermissionDenied(_) => Self::Forbidden,
            other => Self::Failed(other.to_string()),
        }
    }
}

/// Outcome of a single candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt<T> {
    /// The candidate answered
    Hit(T),
    /// The candidate missed; the scan continues
    Miss(MissReason),
}

/// Resolves logical secret paths against an ordered candidate list.
#[derive(Debug, Clone)]
pub struct SecretResolver {
    strategies: Vec<MountStrategy>,
}

impl Default for SecretResolver {
    fn default() -> Self {
        Self::new(MountStrategy::defaults())
    }
}

impl SecretResolver {
    /// Create a resolver trying `strategies` in order.
    #[must_use]
    pub const fn new(strategies: Vec<MountStrategy>) -> Self {
        Self { strategies }
    }

    /// Candidates in the order they are tried.
    #[must_use]
    pub fn strategies(&self) -> &[MountStrategy] {
        &self.strategies
    }

    /// Read the secret at `path` from the first candidate that has it.
    ///
    /// # Errors
    ///
    /// - [`VaultError::NotAuthenticated`] before login, without store contact
    /// - [`VaultError::InvalidPath`] for an empty path
    /// - [`VaultError::PermissionDenied`] when every candidate was forbidden
    /// - [`VaultError::NotFound`] when the candidates are exhausted otherwise
    #[instrument(skip(self, session), fields(path = %path))]
    pub async fn read<S: SecretStore>(
        &self,
        session: &AuthSession<S>,
        path: &str,
    ) -> VaultResult<SecretPayload> {
        let token = session.token()?;
        let path = normalize_path(path)?;
        let store = session.store();
        let mut misses = Vec::with_capacity(self.strategies.len());

        for (i, strategy) in self.strategies.iter().enumerate() {
            debug!(attempt = i + 1, %strategy, "Reading secret");

            let outcome = match strategy.engine {
                Engine::Kv(version) => store.kv_read(token, version, &strategy.mount, path).await,
                Engine::Raw => store.raw_read(token, &strategy.raw_path(path)).await,
            };

            let attempt = match outcome {
                Ok(body) => strategy
                    .unwrap_payload(&body)
                    .map_or(Attempt::Miss(MissReason::NotFound), Attempt::Hit),
                Err(e) => Attempt::Miss(MissReason::from(&e)),
            };

            match attempt {
                Attempt::Hit(payload) => {
                    info!(attempt = i + 1, %strategy, keys = payload.len(), "Secret read");
                    return Ok(payload);
                }
                Attempt::Miss(reason) => {
                    debug!(attempt = i + 1, %strategy, ?reason, "Candidate missed");
                    misses.push(reason);
                }
            }
        }

        error!(attempts = misses.len(), "Secret not found (tried all candidates)");
        Err(exhausted(path, &misses, VaultError::not_found(path)))
    }

    /// Write `payload` to the first candidate that accepts it.
    ///
    /// Returns the candidate that took the write.
    ///
    /// # Errors
    ///
    /// - [`VaultError::NotAuthenticated`] before login, without store contact
    /// - [`VaultError::InvalidPath`] for an empty path
    /// - [`VaultError::PermissionDenied`] when every candidate was forbidden
    /// - [`VaultError::WriteFailed`] when the candidates are exhausted otherwise
    #[instrument(skip(self, session, payload), fields(path = %path, keys = payload.len()))]
    pub async fn write<S: SecretStore>(
        &self,
        session: &AuthSession<S>,
        path: &str,
        payload: &SecretPayload,
    ) -> VaultResult<&MountStrategy> {
        let token = session.token()?;
        let path = normalize_path(path)?;
        let store = session.store();
        let mut misses = Vec::with_capacity(self.strategies.len());

        for (i, strategy) in self.strategies.iter().enumerate() {
            debug!(attempt = i + 1, %strategy, "Writing secret");

            let outcome = match strategy.engine {
                Engine::Kv(version) => {
                    store
                        .kv_write(token, version, &strategy.mount, path, payload)
                        .await
                }
                Engine::Raw => store.raw_write(token, &strategy.raw_path(path), payload).await,
            };

            match outcome {
                Ok(()) => {
                    info!(attempt = i + 1, %strategy, "Secret written");
                    return Ok(strategy);
                }
                Err(e) => {
                    let reason = MissReason::from(&e);
                    debug!(attempt = i + 1, %strategy, ?reason, "Candidate rejected write");
                    misses.push(reason);
                }
            }
        }

        error!(attempts = misses.len(), "Failed to write secret (tried all candidates)");
        Err(exhausted(
            path,
            &misses,
            VaultError::WriteFailed {
                path: path.to_string(),
                attempts: misses.len(),
            },
        ))
    }
}

/// Trim surrounding slashes; reject paths that end up empty.
fn normalize_path(path: &str) -> VaultResult<&str> {
    let trimmed = path.trim().trim_matches('/');
    if trimmed.is_empty() {
        return Err(VaultError::InvalidPath(path.to_string()));
    }
    Ok(trimmed)
}

/// Pick the error for an exhausted scan.
fn exhausted(path: &str, misses: &[MissReason], otherwise: VaultError) -> VaultError {
    if !misses.is_empty() && misses.iter().all(|m| *m == MissReason::Forbidden) {
        VaultError::PermissionDenied(path.to_string())
    } else {
        otherwise
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_order() {
        let names: Vec<String> = MountStrategy::defaults()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            names,
            ["kv-v2@kv", "kv-v2@secret", "kv-v1@kv", "kv-v1@secret", "raw@secret"]
        );
        assert_eq!(SecretResolver::default().strategies().len(), 5);
    }

    #[test]
    fn test_unwrap_kv_v2() {
        let body = json!({"data": {"data": {"user": "app"}, "metadata": {"version": 3}}});
        let payload = MountStrategy::kv_v2("secret").unwrap_payload(&body).unwrap();
        assert_eq!(payload.len(), 1);
        assert_eq!(payload["user"], "app");
    }

    #[test]
    fn test_unwrap_kv_v2_deleted_version() {
        let body = json!({"data": {"data": null, "metadata": {"deletion_time": "2024-01-01"}}});
        assert!(MountStrategy::kv_v2("secret").unwrap_payload(&body).is_none());
    }

    #[test]
    fn test_unwrap_kv_v1_keeps_data_key() {
        let body = json!({"data": {"data": {"nested": "x"}, "user": "app"}});
        let payload = MountStrategy::kv_v1("kv").unwrap_payload(&body).unwrap();
        assert_eq!(payload["user"], "app");
        assert_eq!(payload["data"], r#"{"nested":"x"}"#);
    }

    #[test]
    fn test_unwrap_raw_variants() {
        let raw = MountStrategy::raw("secret");
        let nested = json!({"data": {"data": {"a": "1"}}});
        assert_eq!(raw.unwrap_payload(&nested).unwrap()["a"], "1");

        let flat = json!({"data": {"a": "2"}});
        assert_eq!(raw.unwrap_payload(&flat).unwrap()["a"], "2");

        let bare = json!({"a": "3"});
        assert_eq!(raw.unwrap_payload(&bare).unwrap()["a"], "3");
    }

    #[test]
    fn test_unwrap_raw_null_data_is_a_miss() {
        let raw = MountStrategy::raw("secret");
        let body = json!({"request_id": "abc", "lease_id": "", "data": null, "warnings": null});
        assert!(raw.unwrap_payload(&body).is_none());

        let body = json!({"request_id": "abc", "data": "text"});
        assert!(raw.unwrap_payload(&body).is_none());
    }

    #[test]
    fn test_unwrap_non_object_data_per_engine() {
        let v1 = MountStrategy::kv_v1("kv");
        assert!(v1.unwrap_payload(&json!({"data": null})).is_none());
        assert!(v1.unwrap_payload(&json!({"lease_duration": 60})).is_none());

        let v2 = MountStrategy::kv_v2("secret");
        assert!(v2.unwrap_payload(&json!({"data": {"data": "plain"}})).is_none());
        assert!(v2.unwrap_payload(&json!({"data": null})).is_none());
        assert!(v2.unwrap_payload(&json!({"data": {"metadata": {}}})).is_none());
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/app/config/").unwrap(), "app/config");
        assert!(matches!(normalize_path(" / "), Err(VaultError::InvalidPath(_))));
        assert!(normalize_path("").is_err());
    }

    #[test]
    fn test_miss_reason_classification() {
        assert_eq!(MissReason::from(&VaultError::not_found("p")), MissReason::NotFound);
        assert_eq!(
            MissReason::from(&VaultError::PermissionDenied("p".into())),
            MissReason::Forbidden
        );
        assert!(matches!(
            MissReason::from(&VaultError::transport("reset")),
            MissReason::Failed(_)
        ));
    }

    #[test]
    fn test_exhausted_selection() {
        let all_forbidden = [MissReason::Forbidden, MissReason::Forbidden];
        let err = exhausted("p", &all_forbidden, VaultError::not_found("p"));
        assert!(matches!(err, VaultError::PermissionDenied(_)));

        let mixed = [MissReason::Forbidden, MissReason::NotFound];
        let err = exhausted("p", &mixed, VaultError::not_found("p"));
        assert!(matches!(err, VaultError::NotFound(_)));

        let err = exhausted("p", &[], VaultError::not_found("p"));
        assert!(matches!(err, VaultError::NotFound(_)));
    }
}
