//! # Connection Settings
//!
//! Resolved per invocation from CLI flags, environment variables, and the
//! config file (in that order of precedence) and immutable afterwards.
//! Construction fails with a configuration error naming the variables that
//! are still unset after the merge.

use std::time::Duration;

use url::Url;

use crate::config::{Config, env_str, env_u64};
use crate::error::{Error, Result};

/// Connection timeout applied when nothing else is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Jira connection settings for one process run.
#[derive(Debug, Clone)]
pub struct JiraSettings {
  pub base_url: String,
  pub username: String,
  pub password: String,
  pub timeout: Duration,
}

impl JiraSettings {
  /// Merge flag, environment, and config-file values.
  ///
  /// `timeout_flag` is the `--timeout` value when the user passed one.
  pub fn resolve(config: &Config, timeout_flag: Option<u64>) -> Result<Self> {
    let base_url = env_str("JIRA_BASE_URL").or_else(|| config.get_str("jira.base_url"));
    let username = env_str("JIRA_USERNAME").or_else(|| config.get_str("jira.username"));
    let password = env_str("JIRA_PASSWORD").or_else(|| config.get_str("jira.password"));

    let base_url = require(&[
      ("JIRA_BASE_URL", &base_url),
      ("JIRA_USERNAME", &username),
      ("JIRA_PASSWORD", &password),
    ])?;
    let timeout = timeout_flag
      .or_else(|| env_u64("JIRA_TIMEOUT"))
      .or_else(|| config.get_u64("jira.timeout"))
      .unwrap_or(DEFAULT_TIMEOUT_SECS);

    Ok(Self {
      base_url: normalize_base_url(&base_url)?,
      // `require` already proved these are set
      username: username.unwrap_or_default(),
      password: password.unwrap_or_default(),
      timeout: Duration::from_secs(timeout),
    })
  }
}

/// Confluence connection settings for one process run.
#[derive(Debug, Clone)]
pub struct ConfluenceSettings {
  pub base_url: String,
  pub username: String,
  pub password: String,
  pub timeout: Duration,
}

impl ConfluenceSettings {
  /// Merge flag, environment, and config-file values.
  pub fn resolve(config: &Config, timeout_flag: Option<u64>) -> Result<Self> {
    let base_url = env_str("CONFLUENCE_BASE_URL").or_else(|| config.get_str("confluence.base_url"));
    let username = env_str("CONFLUENCE_USERNAME").or_else(|| config.get_str("confluence.username"));
    let password = env_str("CONFLUENCE_PASSWORD").or_else(|| config.get_str("confluence.password"));

    let base_url = require(&[
      ("CONFLUENCE_BASE_URL", &base_url),
      ("CONFLUENCE_USERNAME", &username),
      ("CONFLUENCE_PASSWORD", &password),
    ])?;
    let timeout = timeout_flag
      .or_else(|| env_u64("CONFLUENCE_TIMEOUT"))
      .or_else(|| config.get_u64("confluence.timeout"))
      .unwrap_or(DEFAULT_TIMEOUT_SECS);

    Ok(Self {
      base_url: normalize_base_url(&base_url)?,
      username: username.unwrap_or_default(),
      password: password.unwrap_or_default(),
      timeout: Duration::from_secs(timeout),
    })
  }
}

/// Check that every listed value is present; return the first (the base URL)
/// on success, and a configuration error naming the missing variables
/// otherwise.
fn require(values: &[(&str, &Option<String>)]) -> Result<String> {
  let missing: Vec<&str> = values
    .iter()
    .filter(|(_, value)| value.is_none())
    .map(|(name, _)| *name)
    .collect();
  if !missing.is_empty() {
    return Err(Error::Config(format!(
      "{} must be set via environment or config file.",
      missing.join(", ")
    )));
  }
  values[0]
    .1
    .clone()
    .ok_or_else(|| Error::Config("base URL is required".to_string()))
}

/// Validate a base URL and normalize it: default to https, require a host,
/// drop any trailing slash.
pub fn normalize_base_url(raw: &str) -> Result<String> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return Err(Error::Config("base URL cannot be empty".to_string()));
  }

  let candidate = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
    trimmed.to_string()
  } else {
    format!("https://{trimmed}")
  };

  let url =
    Url::parse(&candidate).map_err(|e| Error::Config(format!("invalid base URL '{candidate}': {e}")))?;
  if url.host_str().is_none() {
    return Err(Error::Config(format!("base URL must have a host: {candidate}")));
  }

  Ok(candidate.trim_end_matches('/').to_string())
}
