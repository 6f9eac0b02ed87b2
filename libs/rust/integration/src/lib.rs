//! Behaviour tests for the AppRole session and secret resolver.
//!
//! The tests live under `tests/`; this crate only wires dependencies.
