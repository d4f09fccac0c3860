//! Error taxonomy shared by the Jira and Confluence clients.
//!
//! Four failure classes cover everything the commands can hit: missing or
//! invalid configuration, transport failures (network, timeout), non-2xx API
//! responses carrying the status and a message extracted from the body, and
//! lookup misses (field, transition, queue). Partial-batch failures are not
//! an error variant; batch commands collect per-item outcomes and decide the
//! exit code themselves.

use thiserror::Error;

/// Result alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
  /// A mandatory setting is missing or an input could not be read.
  #[error("{0}")]
  Config(String),

  /// The HTTP request never produced a response.
  #[error("request failed: {0}")]
  Transport(#[from] reqwest::Error),

  /// The API answered with a non-2xx status.
  #[error("{message} (HTTP {status})")]
  Api { status: u16, message: String },

  /// A named field, transition, queue, or service desk could not be found.
  #[error("{0}")]
  NotFound(String),
}

impl Error {
  /// Build an API error from a status code and an already-extracted message.
  pub fn api(status: u16, message: impl Into<String>) -> Self {
    Self::Api {
      status,
      message: message.into(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_api_error_display() {
    let err = Error::api(404, "Issue does not exist");
    assert_eq!(err.to_string(), "Issue does not exist (HTTP 404)");
  }

  #[test]
  fn test_not_found_display() {
    let err = Error::NotFound("No transition to 'Done' found for issue PROJ-1.".to_string());
    assert!(err.to_string().contains("PROJ-1"));
  }
}
