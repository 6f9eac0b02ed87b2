//! HashiCorp Vault AppRole client.
//!
//! Logs in with a role/secret pair, verifies and renews the issued token,
//! and reads or writes key-value secrets through a fixed, ordered fallback
//! over mount points and engine versions.

pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod http_store;
pub mod resolver;
pub mod secrets;
pub mod session;
pub mod store;

pub use client::VaultClient;
pub use config::VaultConfig;
pub use credentials::{AppRoleCredentials, CredentialSource, KeyedCredentials};
pub use error::{VaultError, VaultResult};
pub use http_store::HttpSecretStore;
pub use resolver::{Attempt, Engine, MissReason, MountStrategy, SecretResolver};
pub use secrets::SecretPayload;
pub use session::AuthSession;
pub use store::{AuthInfo, KvVersion, MountInfo, SecretStore, TokenInfo};
