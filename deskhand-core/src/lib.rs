//! # Deskhand Core Library
//!
//! Shared plumbing for the deskhand automation commands: the JSON config
//! file resolver, connection settings with flag/env/config precedence, the
//! error taxonomy used by both API clients, issue-key intake helpers, and
//! terminal output formatting.

pub mod config;
pub mod error;
pub mod issues;
pub mod merge;
pub mod output;
pub mod settings;

// Re-export main types for the client crates and CLI
pub use config::{Config, env_str, env_u64};
pub use error::{Error, Result};
pub use issues::{extract_issue_key, issue_url, read_issue_keys};
pub use output::{ColorMode, print_error, print_header, print_info, print_success, print_warning};
pub use settings::{ConfluenceSettings, DEFAULT_TIMEOUT_SECS, JiraSettings};
