//! Configuration lookups over flat key/value sources.
//!
//! Both the process environment and the key-value connections handed over by
//! an orchestration runtime are flat string maps, so configuration loaders
//! are written against [`ConfigSource`] and work with either.

use crate::PlatformError;
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::path::PathBuf;
use std::str::FromStr;

/// A flat source of named configuration strings.
pub trait ConfigSource {
    /// Look up a raw value by key.
    fn get(&self, key: &str) -> Option<String>;
}

/// The process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl ConfigSource for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl<S: BuildHasher> ConfigSource for HashMap<String, String, S> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

impl ConfigSource for BTreeMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        BTreeMap::get(self, key).cloned()
    }
}

/// Load a `.env` file from the working directory (or its parents).
///
/// Values in the file override variables already set in the process.
/// Returns the path of the loaded file, or `None` when there is none.
pub fn load_dotenv() -> Option<PathBuf> {
    match dotenvy::dotenv_override() {
        Ok(path) => {
            tracing::debug!(path = %path.display(), "Loaded .env file");
            Some(path)
        }
        Err(_) => None,
    }
}

/// Look up a value, treating blank strings as absent.
///
/// Non-blank values are returned exactly as given.
pub fn optional(source: &impl ConfigSource, key: &str) -> Option<String> {
    source.get(key).filter(|v| !v.trim().is_empty())
}

/// Look up a value that must be present and non-blank.
///
/// # Errors
///
/// Returns [`PlatformError::MissingConfig`] when the key is absent or blank.
pub fn required(source: &impl ConfigSource, key: &str) -> Result<String, PlatformError> {
    optional(source, key).ok_or_else(|| PlatformError::missing_config(key))
}

/// Parse a value with a default when absent.
///
/// # Errors
///
/// Returns [`PlatformError::InvalidConfig`] when the value does not parse.
pub fn parse_or<T>(source: &impl ConfigSource, key: &str, default: T) -> Result<T, PlatformError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional(source, key) {
        Some(val) => val
            .trim()
            .parse()
            .map_err(|e: T::Err| PlatformError::invalid_config(key, e.to_string())),
        None => Ok(default),
    }
}

/// Parse a boolean flag with a default when absent.
///
/// Accepts `true/false`, `1/0`, `yes/no` and `on/off`, case-insensitively.
///
/// # Errors
///
/// Returns [`PlatformError::InvalidConfig`] for any other value.
pub fn flag_or(source: &impl ConfigSource, key: &str, default: bool) -> Result<bool, PlatformError> {
    let Some(val) = optional(source, key) else {
        return Ok(default);
    };

    match val.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(PlatformError::invalid_config(
            key,
            format!("expected a boolean, got {val:?}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_optional_ignores_blank() {
        let src = source(&[("A", "  "), ("B", " value ")]);
        assert_eq!(optional(&src, "A"), None);
        assert_eq!(optional(&src, "B").as_deref(), Some(" value "));
        assert_eq!(optional(&src, "C"), None);
    }

    #[test]
    fn test_required_reports_key() {
        let src = source(&[]);
        let err = required(&src, "VAULT_ROLE_ID").unwrap_err();
        assert!(matches!(err, PlatformError::MissingConfig(ref k) if k == "VAULT_ROLE_ID"));
    }

    #[test]
    fn test_parse_or() {
        let src = source(&[("TIMEOUT", " 12 "), ("BAD", "twelve")]);
        assert_eq!(parse_or(&src, "TIMEOUT", 30u64).unwrap(), 12);
        assert_eq!(parse_or(&src, "MISSING", 30u64).unwrap(), 30);
        assert!(parse_or(&src, "BAD", 30u64).is_err());
    }

    #[test]
    fn test_flag_or() {
        let src = source(&[("T", "TRUE"), ("F", "off"), ("X", "maybe")]);
        assert!(flag_or(&src, "T", false).unwrap());
        assert!(!flag_or(&src, "F", true).unwrap());
        assert!(flag_or(&src, "MISSING", true).unwrap());
        assert!(flag_or(&src, "X", true).is_err());
    }

    #[test]
    fn test_btreemap_source() {
        let mut src = BTreeMap::new();
        src.insert("role_id".to_string(), "r1".to_string());
        assert_eq!(required(&src, "role_id").unwrap(), "r1");
    }

    proptest::proptest! {
        #[test]
        fn prop_flag_words_ignore_case(
            word in proptest::sample::select(vec!["true", "false", "yes", "no", "on", "off"]),
            upper in proptest::bool::ANY,
        ) {
            let raw = if upper { word.to_uppercase() } else { word.to_string() };
            let src = source(&[("FLAG", raw.as_str())]);
            let expected = matches!(word, "true" | "yes" | "on");
            proptest::prop_assert_eq!(flag_or(&src, "FLAG", !expected).unwrap(), expected);
        }

        #[test]
        fn prop_parse_or_round_trips(n in proptest::num::u64::ANY) {
            let src = source(&[("N", n.to_string().as_str())]);
            proptest::prop_assert_eq!(parse_or(&src, "N", 0u64).unwrap(), n);
        }
    }
}
