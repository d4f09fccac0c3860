//! # Issue Key Intake
//!
//! Batch commands accept issue references as positional arguments, a
//! `--file` of one reference per line, or piped stdin. References may be
//! bare keys (`PROJ-123`) or browse URLs; keys are extracted, uppercased,
//! and de-duplicated preserving first-seen order.

use std::fs;
use std::io::{BufRead, IsTerminal};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};

static ISSUE_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
  #[allow(clippy::unwrap_used)]
  Regex::new(r"(?i)[A-Z][A-Z0-9]+-\d+").unwrap()
});

/// Return a clickable browse URL for an issue.
pub fn issue_url(base_url: &str, issue_key: &str) -> String {
  format!("{}/browse/{}", base_url.trim_end_matches('/'), issue_key)
}

/// Pull a Jira issue key out of a key or browse URL.
pub fn extract_issue_key(raw: &str) -> Option<String> {
  ISSUE_KEY_RE
    .find(raw.trim())
    .map(|m| m.as_str().to_uppercase())
}

/// Collect unique issue keys from CLI args, an optional file, or piped stdin.
///
/// Stdin is only consulted when the other sources produced nothing and stdin
/// is not a terminal.
pub fn read_issue_keys(values: &[String], file_path: Option<&Path>) -> Result<Vec<String>> {
  let mut collected: Vec<String> = Vec::new();

  if let Some(path) = file_path {
    let contents = fs::read_to_string(path)
      .map_err(|e| Error::Config(format!("Failed to read issue list from {}: {e}", path.display())))?;
    collected.extend(contents.lines().map(str::trim).filter(|l| !l.is_empty()).map(String::from));
  }

  collected.extend(values.iter().cloned());

  if collected.is_empty() && !std::io::stdin().is_terminal() {
    for line in std::io::stdin().lock().lines() {
      let line = line.map_err(|e| Error::Config(format!("Failed to read issue list from stdin: {e}")))?;
      let trimmed = line.trim();
      if !trimmed.is_empty() {
        collected.push(trimmed.to_string());
      }
    }
  }

  let mut keys = Vec::new();
  for reference in &collected {
    let Some(key) = extract_issue_key(reference) else {
      continue;
    };
    if !keys.contains(&key) {
      keys.push(key);
    }
  }
  if keys.is_empty() {
    return Err(Error::Config(
      "No valid issue keys found. Provide URLs or keys.".to_string(),
    ));
  }
  Ok(keys)
}
