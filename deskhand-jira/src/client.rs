//! HTTP session wrapper for the Jira REST API.
//!
//! Holds the base URL, credentials, and timeout from [`JiraSettings`] and
//! exposes generic verbs returning parsed JSON. Non-2xx responses become
//! [`Error::Api`] values carrying the status code and a message extracted
//! from the response body; network failures become [`Error::Transport`].
//! No retries, no pooling beyond the reqwest defaults.

use std::collections::HashMap;
use std::sync::Mutex;

use reqwest::header::ACCEPT;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;

use deskhand_core::{Error, JiraSettings, Result};

/// Represents a Jira API client
pub struct JiraClient {
  pub(crate) client: Client,
  pub(crate) base_url: String,
  pub(crate) username: String,
  pub(crate) password: String,
  // Display-name (lowercased) to field-id map, filled on first use.
  pub(crate) field_cache: Mutex<HashMap<String, String>>,
}

impl JiraClient {
  /// Create a new Jira client from resolved settings.
  pub fn new(settings: &JiraSettings) -> Result<Self> {
    let client = Client::builder().timeout(settings.timeout).build()?;
    Ok(Self {
      client,
      base_url: settings.base_url.trim_end_matches('/').to_string(),
      username: settings.username.clone(),
      password: settings.password.clone(),
      field_cache: Mutex::new(HashMap::new()),
    })
  }

  /// The normalized base URL this client talks to.
  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  /// Validate connectivity and credentials by fetching the current user.
  pub async fn connect(&self) -> Result<()> {
    self.send_json::<Value>(self.request(Method::GET, "/rest/api/2/myself")).await?;
    Ok(())
  }

  pub(crate) fn url(&self, path: &str) -> String {
    if path.starts_with('/') {
      format!("{}{}", self.base_url, path)
    } else {
      format!("{}/{}", self.base_url, path)
    }
  }

  /// Start a request with authentication and JSON accept header attached.
  pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
    self
      .client
      .request(method, self.url(path))
      .basic_auth(&self.username, Some(&self.password))
      .header(ACCEPT, "application/json")
  }

  /// Send a request and surface non-2xx responses as API errors.
  pub(crate) async fn send(&self, builder: RequestBuilder) -> Result<Response> {
    let response = builder.send().await?;
    let status = response.status();
    if status.is_success() {
      return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(Error::api(status.as_u16(), extract_error_message(status.as_u16(), &body)))
  }

  /// Send a request and parse the response body as JSON.
  pub(crate) async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
    let response = self.send(builder).await?;
    response.json::<T>().await.map_err(Error::from)
  }
}

/// Pull a human-readable message out of a Jira error body.
///
/// Jira reports errors either as an `errorMessages` list or an `errors`
/// object keyed by field name; anything else falls back to a generic
/// message with the status code.
pub(crate) fn extract_error_message(status: u16, body: &str) -> String {
  if let Ok(payload) = serde_json::from_str::<Value>(body) {
    if let Some(messages) = payload.get("errorMessages").and_then(Value::as_array) {
      let joined: Vec<&str> = messages.iter().filter_map(Value::as_str).collect();
      if !joined.is_empty() {
        return joined.join("; ");
      }
    }
    if let Some(errors) = payload.get("errors").and_then(Value::as_object) {
      if !errors.is_empty() {
        return errors
          .iter()
          .map(|(key, value)| format!("{key}: {}", value.as_str().unwrap_or_default()))
          .collect::<Vec<_>>()
          .join("; ");
      }
    }
  }
  format!("Jira API call failed ({status})")
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use wiremock::matchers::{basic_auth, method, path};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  use super::*;

  fn test_settings(base_url: &str) -> JiraSettings {
    JiraSettings {
      base_url: base_url.to_string(),
      username: "test_user".to_string(),
      password: "test_token".to_string(),
      timeout: Duration::from_secs(10),
    }
  }

  #[test]
  fn test_client_creation_trims_base_url() -> Result<()> {
    let client = JiraClient::new(&test_settings("https://test.atlassian.net/"))?;
    assert_eq!(client.base_url(), "https://test.atlassian.net");
    assert_eq!(client.url("/rest/api/2/myself"), "https://test.atlassian.net/rest/api/2/myself");
    Ok(())
  }

  #[tokio::test]
  async fn test_connect_uses_basic_auth() -> anyhow::Result<()> {
    let mock_server = MockServer::start().await;
    let client = JiraClient::new(&test_settings(&mock_server.uri()))?;

    Mock::given(method("GET"))
      .and(path("/rest/api/2/myself"))
      .and(basic_auth("test_user", "test_token"))
      .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
          "name": "test_user",
          "displayName": "Test User"
      })))
      .mount(&mock_server)
      .await;

    client.connect().await?;
    Ok(())
  }

  #[tokio::test]
  async fn test_connect_unauthorized_is_api_error() -> anyhow::Result<()> {
    let mock_server = MockServer::start().await;
    let client = JiraClient::new(&test_settings(&mock_server.uri()))?;

    Mock::given(method("GET"))
      .and(path("/rest/api/2/myself"))
      .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
          "errorMessages": ["Authentication failed"],
          "errors": {}
      })))
      .mount(&mock_server)
      .await;

    let err = client.connect().await.expect_err("should fail");
    match err {
      Error::Api { status, message } => {
        assert_eq!(status, 401);
        assert_eq!(message, "Authentication failed");
      }
      other => panic!("expected Api error, got {other:?}"),
    }
    Ok(())
  }

  #[test]
  fn test_extract_error_message_variants() {
    assert_eq!(
      extract_error_message(404, r#"{"errorMessages": ["Issue does not exist"], "errors": {}}"#),
      "Issue does not exist"
    );
    assert_eq!(
      extract_error_message(400, r#"{"errorMessages": [], "errors": {"labels": "invalid value"}}"#),
      "labels: invalid value"
    );
    assert_eq!(extract_error_message(500, "<html>oops</html>"), "Jira API call failed (500)");
  }
}
