//! Test utilities shared across the deskhand workspace
//!
//! Provides environment-variable guards and temporary config-file fixtures so
//! tests that exercise the env/config precedence rules can run without
//! leaking state into each other.
//!
//! The clippy dead_code lint is disabled for this crate because test utilities
//! may not be used by all tests, and the compiler cannot detect usage across
//! crate boundaries in development dependencies.

#![allow(dead_code)]

pub mod config;
pub mod env;

// Re-export commonly used items
pub use config::ConfigFileGuard;
pub use env::EnvVarGuard;
