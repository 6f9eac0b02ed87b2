//! Vault tools library.
//!
//! Single-call tool adapters around the AppRole Vault client, meant to be
//! registered with an agent orchestration runtime, plus the configuration
//! shared with the `vault-tools` CLI.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod tools;

// Re-exports for convenience
pub use error::ToolError;
pub use tools::{VaultTools, greetings_tool};
