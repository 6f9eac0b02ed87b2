//! Secret payloads and Vault wire structures.

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Key/value secret contents. No schema is enforced.
pub type SecretPayload = BTreeMap<String, String>;

/// Convert a JSON object into a payload.
///
/// String values are kept as-is; any other JSON value is stored as its JSON
/// text. Returns `None` when `value` is not an object.
#[must_use]
pub fn payload_from_value(value: &Value) -> Option<SecretPayload> {
    let object = value.as_object()?;
    Some(
        object
            .iter()
            .map(|(k, v)| {
                let rendered = match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (k.clone(), rendered)
            })
            .collect(),
    )
}

/// Vault auth response (login and renew-self)
#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    pub auth: AuthData,
}

#[derive(Debug, Deserialize)]
pub struct AuthData {
    pub client_token: String,
    #[serde(default)]
    pub accessor: Option<String>,
    #[serde(default)]
    pub policies: Vec<String>,
    #[serde(default)]
    pub lease_duration: u64,
    #[serde(default)]
    pub renewable: bool,
}

/// Vault token lookup-self response
#[derive(Debug, Deserialize)]
pub struct TokenLookupResponse {
    pub data: TokenLookupData,
}

#[derive(Debug, Deserialize)]
pub struct TokenLookupData {
    #[serde(default)]
    pub policies: Vec<String>,
    #[serde(default)]
    pub ttl: u64,
    #[serde(default)]
    pub renewable: bool,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Vault `sys/mounts` response
#[derive(Debug, Deserialize)]
pub struct MountsResponse {
    pub data: BTreeMap<String, MountEntry>,
}

#[derive(Debug, Deserialize)]
pub struct MountEntry {
    #[serde(rename = "type")]
    pub engine_type: String,
    #[serde(default)]
    pub options: Option<BTreeMap<String, String>>,
}

/// Vault error body
#[derive(Debug, Default, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub errors: Vec<String>,
}
