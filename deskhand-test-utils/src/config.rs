//! Temporary config-file fixtures
//!
//! Writes a JSON config file into a temporary directory and points
//! `JIRA_CONFIG_FILE` at it for the lifetime of the guard.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::env::EnvVarGuard;

/// Environment variable naming the config file location.
pub const CONFIG_PATH_ENV: &str = "JIRA_CONFIG_FILE";

/// A temporary `config.json` wired into the environment.
pub struct ConfigFileGuard {
  temp_dir: TempDir,
  path: PathBuf,
  env_guard: EnvVarGuard,
}

impl ConfigFileGuard {
  /// Write `contents` to a temporary config file and export its path via
  /// `JIRA_CONFIG_FILE`.
  pub fn new(contents: &str) -> Self {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let path = temp_dir.path().join("config.json");
    fs::write(&path, contents).expect("Failed to write config file");

    let env_guard = EnvVarGuard::new(CONFIG_PATH_ENV);
    env_guard.set(&path.to_string_lossy());

    Self {
      temp_dir,
      path,
      env_guard,
    }
  }

  /// Path of the temporary config file.
  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Replace the config file contents in place.
  pub fn rewrite(&self, contents: &str) {
    fs::write(&self.path, contents).expect("Failed to rewrite config file");
  }
}
