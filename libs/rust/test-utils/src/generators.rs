//! Shared proptest generators for the Vault AppRole crates.

use approle_vault_client::{MountStrategy, SecretPayload};
use proptest::prelude::*;

/// Generate AppRole role ids shaped like Vault's UUIDs.
pub fn role_id_strategy() -> impl Strategy<Value = String> {
    "[a-f0-9]{8}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{12}"
}

/// Generate AppRole secret ids.
pub fn secret_id_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z0-9]{16,40}"
}

/// Generate logical secret paths without empty segments.
pub fn secret_path_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("myapp/config".to_string()),
        Just("watsonxdemo/config".to_string()),
        prop::collection::vec("[a-z][a-z0-9_-]{1,10}", 1..4).prop_map(|s| s.join("/")),
    ]
}

/// Generate non-empty secret payloads.
pub fn payload_strategy() -> impl Strategy<Value = SecretPayload> {
    prop::collection::btree_map("[a-z][a-z0-9_]{0,15}", "[ -~]{0,48}", 1..6)
}

/// Generate an index into the default candidate list.
pub fn default_candidate_index() -> impl Strategy<Value = usize> {
    0..MountStrategy::defaults().len()
}
