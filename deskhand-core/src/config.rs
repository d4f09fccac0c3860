//! # Configuration File Handling
//!
//! Loads the optional JSON config file and resolves individual values with
//! the precedence CLI flag > environment variable > config file > built-in
//! default. A missing or malformed file resolves to an empty config so the
//! commands keep working from environment variables alone.

use std::path::{Path, PathBuf};
use std::{env, fs};

use serde_json::Value;

/// Default config file location, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "JIRA_CONFIG_FILE";

/// Parsed config file contents.
///
/// Values are addressed with dotted paths into the JSON object tree, e.g.
/// `jira.base_url` or `defaults.update.add_labels`.
#[derive(Debug, Clone, Default)]
pub struct Config {
  root: Value,
}

impl Config {
  /// Load the config file from `path`, falling back to `JIRA_CONFIG_FILE`
  /// and then `config.json`. Missing or invalid files yield an empty config.
  pub fn load(path: Option<&Path>) -> Self {
    let target: PathBuf = match path {
      Some(p) => p.to_path_buf(),
      None => env_str(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE)),
    };

    if !target.is_file() {
      return Self::default();
    }

    let contents = match fs::read_to_string(&target) {
      Ok(contents) => contents,
      Err(_) => return Self::default(),
    };
    match serde_json::from_str::<Value>(&contents) {
      Ok(root @ Value::Object(_)) => Self { root },
      _ => Self::default(),
    }
  }

  /// Build a config directly from a JSON value (tests, embedding).
  pub fn from_value(root: Value) -> Self {
    match root {
      root @ Value::Object(_) => Self { root },
      _ => Self::default(),
    }
  }

  /// Fetch a value using dot notation. Explicit JSON `null` counts as unset.
  pub fn get(&self, dotted_path: &str) -> Option<&Value> {
    let mut current = &self.root;
    for part in dotted_path.split('.') {
      current = current.as_object()?.get(part)?;
    }
    if current.is_null() { None } else { Some(current) }
  }

  /// Fetch a string value; numbers are rendered to strings.
  pub fn get_str(&self, dotted_path: &str) -> Option<String> {
    match self.get(dotted_path)? {
      Value::String(s) if !s.is_empty() => Some(s.clone()),
      Value::Number(n) => Some(n.to_string()),
      _ => None,
    }
  }

  /// Fetch an unsigned integer; numeric strings are parsed.
  pub fn get_u64(&self, dotted_path: &str) -> Option<u64> {
    match self.get(dotted_path)? {
      Value::Number(n) => n.as_u64(),
      Value::String(s) => s.trim().parse().ok(),
      _ => None,
    }
  }

  /// Fetch a boolean; accepts JSON booleans, numbers, and the usual truthy
  /// strings (`1`, `true`, `yes`, `y`, `on`).
  pub fn get_bool(&self, dotted_path: &str) -> Option<bool> {
    match self.get(dotted_path)? {
      Value::Bool(b) => Some(*b),
      Value::Number(n) => Some(n.as_f64().is_some_and(|f| f != 0.0)),
      Value::String(s) => Some(truthy(s)),
      _ => None,
    }
  }

  /// Fetch a list of strings; scalar strings are comma-split.
  pub fn get_str_list(&self, dotted_path: &str) -> Option<Vec<String>> {
    match self.get(dotted_path)? {
      Value::Array(items) => Some(
        items
          .iter()
          .filter_map(|item| match item {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
          })
          .filter(|s| !s.is_empty())
          .collect(),
      ),
      Value::String(s) => Some(crate::merge::split_tokens(s)),
      _ => None,
    }
  }
}

/// Whether a string spells a truthy value.
pub fn truthy(raw: &str) -> bool {
  matches!(raw.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "y" | "on")
}

/// Read an environment variable, treating empty values as unset.
pub fn env_str(name: &str) -> Option<String> {
  match env::var(name) {
    Ok(value) if !value.is_empty() => Some(value),
    _ => None,
  }
}

/// Read an integer environment variable; unparsable values count as unset.
pub fn env_u64(name: &str) -> Option<u64> {
  env_str(name).and_then(|value| value.trim().parse().ok())
}

/// Read a boolean environment variable.
pub fn env_bool(name: &str) -> Option<bool> {
  env_str(name).map(|value| truthy(&value))
}

/// Prefer an environment variable, then a config value.
pub fn resolve_env_or_config_str(env_name: &str, config: &Config, dotted_path: &str) -> Option<String> {
  env_str(env_name).or_else(|| config.get_str(dotted_path))
}

/// Prefer an integer environment variable, then a config value.
pub fn resolve_env_or_config_u64(env_name: &str, config: &Config, dotted_path: &str) -> Option<u64> {
  env_u64(env_name).or_else(|| config.get_u64(dotted_path))
}

/// Prefer a boolean environment variable, then a config value.
pub fn resolve_env_or_config_bool(env_name: &str, config: &Config, dotted_path: &str) -> Option<bool> {
  env_bool(env_name).or_else(|| config.get_bool(dotted_path))
}

#[cfg(test)]
mod tests {
  use deskhand_test_utils::{ConfigFileGuard, EnvVarGuard};
  use serde_json::json;

  use super::*;

  #[test]
  fn test_dotted_path_lookup() {
    let config = Config::from_value(json!({
      "jira": {"base_url": "https://jira.example.com", "timeout": 30},
      "defaults": {"update": {"add_labels": ["ops", "audited"]}}
    }));

    assert_eq!(
      config.get_str("jira.base_url").as_deref(),
      Some("https://jira.example.com")
    );
    assert_eq!(config.get_u64("jira.timeout"), Some(30));
    assert_eq!(
      config.get_str_list("defaults.update.add_labels"),
      Some(vec!["ops".to_string(), "audited".to_string()])
    );
    assert!(config.get("jira.username").is_none());
    assert!(config.get("missing.entirely").is_none());
  }

  #[test]
  fn test_null_counts_as_unset() {
    let config = Config::from_value(json!({"jira": {"username": null}}));
    assert!(config.get("jira.username").is_none());
  }

  #[test]
  fn test_scalar_list_is_comma_split() {
    let config = Config::from_value(json!({"defaults": {"list_statuses": "Open, Waiting"}}));
    assert_eq!(
      config.get_str_list("defaults.list_statuses"),
      Some(vec!["Open".to_string(), "Waiting".to_string()])
    );
  }

  #[test]
  fn test_load_missing_file_is_empty() {
    let config = Config::load(Some(std::path::Path::new("/nonexistent/deskhand-config.json")));
    assert!(config.get("jira.base_url").is_none());
  }

  #[test]
  fn test_load_invalid_json_is_empty() {
    let guard = ConfigFileGuard::new("{not json");
    let config = Config::load(Some(guard.path()));
    assert!(config.get("jira.base_url").is_none());
  }

  #[test]
  fn test_load_from_env_path() {
    let _guard = ConfigFileGuard::new(r#"{"jira": {"base_url": "https://jira.example.com"}}"#);

    let config = Config::load(None);
    assert_eq!(
      config.get_str("jira.base_url").as_deref(),
      Some("https://jira.example.com")
    );
  }

  #[test]
  fn test_env_precedes_config() {
    let config = Config::from_value(json!({"jira": {"timeout": 30}}));
    let guard = EnvVarGuard::new("DESKHAND_TEST_TIMEOUT");
    guard.set("45");

    assert_eq!(
      resolve_env_or_config_u64("DESKHAND_TEST_TIMEOUT", &config, "jira.timeout"),
      Some(45)
    );
    guard.clear();
    assert_eq!(
      resolve_env_or_config_u64("DESKHAND_TEST_TIMEOUT", &config, "jira.timeout"),
      Some(30)
    );
  }

  #[test]
  fn test_truthy_strings() {
    for value in ["1", "true", "Yes", " on ", "Y"] {
      assert!(truthy(value), "{value} should be truthy");
    }
    for value in ["0", "false", "no", "", "off"] {
      assert!(!truthy(value), "{value} should be falsy");
    }
  }
}
