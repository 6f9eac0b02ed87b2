//! Shared test utilities for the Vault AppRole crates.
//!
//! This crate provides:
//! - An in-memory [`FakeSecretStore`](mocks::FakeSecretStore) with call counters
//! - Proptest generators for credentials, paths and payloads
//! - Test fixtures with sample data

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod mocks;

pub use generators::*;
pub use mocks::{CallCounts, FakeSecretStore, Location};
