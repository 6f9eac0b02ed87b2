//! Logging configuration for the Vault tools CLI.
//!
//! Vault settings come from [`VaultConfig`](approle_vault_client::VaultConfig);
//! this module only resolves how the CLI logs. Values are read after `.env`
//! has been loaded, so the file overrides the process environment.

use crate::error::ToolError;
use rust_common::TracingConfig;
use rust_common::env::{self, ConfigSource};

/// Service name reported in logs.
pub const SERVICE_NAME: &str = "vault-tools";

/// Logging settings from `LOG_LEVEL` and `LOG_FORMAT` (`json` or `text`).
///
/// An explicit `level` replaces `LOG_LEVEL`, and `json` forces JSON output
/// whatever `LOG_FORMAT` says. The level defaults to `info`.
///
/// # Errors
///
/// Returns an error if `LOG_FORMAT` is neither `json` nor `text`.
pub fn tracing_from(
    source: &impl ConfigSource,
    level: Option<&str>,
    json: bool,
) -> Result<TracingConfig, ToolError> {
    let level = level
        .map(str::to_string)
        .or_else(|| env::optional(source, "LOG_LEVEL"))
        .map_or_else(|| "info".to_string(), |l| l.trim().to_string());
    let config = TracingConfig::default()
        .with_service_name(SERVICE_NAME)
        .with_log_level(level);

    let format = env::optional(source, "LOG_FORMAT").map(|f| f.trim().to_lowercase());
    match format.as_deref() {
        _ if json => Ok(config.with_json_output()),
        None | Some("text") => Ok(config),
        Some("json") => Ok(config.with_json_output()),
        Some(other) => Err(ToolError::Config(format!("Invalid LOG_FORMAT: {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_tracing_defaults() {
        let config = tracing_from(&map(&[]), None, false).unwrap();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.service_name, SERVICE_NAME);
        assert!(!config.json_output);
    }

    #[test]
    fn test_log_level_from_source_is_kept_without_flag() {
        let src = map(&[("LOG_LEVEL", "debug"), ("LOG_FORMAT", "JSON")]);
        let config = tracing_from(&src, None, false).unwrap();
        assert_eq!(config.log_level, "debug");
        assert!(config.json_output);
    }

    #[test]
    fn test_explicit_level_wins() {
        let src = map(&[("LOG_LEVEL", "debug")]);
        let config = tracing_from(&src, Some("warn"), true).unwrap();
        assert_eq!(config.log_level, "warn");
        assert!(config.json_output);
    }

    #[test]
    fn test_invalid_log_format() {
        let err = tracing_from(&map(&[("LOG_FORMAT", "xml")]), None, false).unwrap_err();
        assert!(matches!(err, ToolError::Config(_)));
    }
}
