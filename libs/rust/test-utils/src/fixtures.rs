//! Test fixtures with sample data.

use approle_vault_client::{AppRoleCredentials, SecretPayload, VaultConfig};

/// Role id accepted by fixture stores.
pub const ROLE_ID: &str = "r1";
/// Secret id accepted by fixture stores.
pub const SECRET_ID: &str = "s1";
/// Address used when no real server is involved.
pub const FAKE_ADDR: &str = "http://127.0.0.1:8200";

/// Configuration carrying the fixture credentials.
#[must_use]
pub fn sample_config() -> VaultConfig {
    config_with(ROLE_ID, SECRET_ID)
}

/// Configuration carrying the given credentials.
#[must_use]
pub fn config_with(role_id: &str, secret_id: &str) -> VaultConfig {
    VaultConfig::new(FAKE_ADDR, AppRoleCredentials::new(role_id, secret_id)).with_namespace("admin")
}

/// Sample model configuration secret.
#[must_use]
pub fn sample_payload() -> SecretPayload {
    [
        ("api_key", "sk-1234567890abcdef"),
        ("endpoint", "https://api.example.com/v1"),
        ("model", "llama-2-70b-chat"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Sample login secret.
#[must_use]
pub fn sample_login() -> SecretPayload {
    [("username", "testuser"), ("password", "testpass")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
