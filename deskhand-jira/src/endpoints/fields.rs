//! # Jira Field Metadata
//!
//! Field listing and display-name → field-id resolution. The field list is
//! fetched once per process and cached; display names are matched after
//! lowercasing.

use reqwest::Method;
use tracing::debug;

use deskhand_core::Result;

use crate::client::JiraClient;
use crate::models::FieldInfo;

/// Field ids that may be used directly without a metadata lookup.
const RAW_FIELD_IDS: &[&str] = &["summary", "status", "labels", "description", "assignee", "priority"];

impl JiraClient {
  /// Fetch the full field metadata list.
  pub async fn list_fields(&self) -> Result<Vec<FieldInfo>> {
    let builder = self.request(Method::GET, "/rest/api/2/field");
    self.send_json(builder).await
  }

  /// Map a display name to its field id, or `None` when no field matches.
  ///
  /// Raw ids (`customfield_*` and the well-known built-ins) pass through
  /// unchanged.
  pub async fn resolve_field_id(&self, field_name: &str) -> Result<Option<String>> {
    if field_name.is_empty() {
      return Ok(None);
    }
    if field_name.starts_with("customfield_") || RAW_FIELD_IDS.contains(&field_name) {
      return Ok(Some(field_name.to_string()));
    }

    let lowered = field_name.to_lowercase();
    {
      #[allow(clippy::unwrap_used)]
      let cache = self.field_cache.lock().unwrap();
      if !cache.is_empty() {
        return Ok(cache.get(&lowered).cloned());
      }
    }

    let fields = self.list_fields().await?;
    debug!(count = fields.len(), "field metadata fetched");
    #[allow(clippy::unwrap_used)]
    let mut cache = self.field_cache.lock().unwrap();
    for field in fields {
      if field.name.is_empty() || field.id.is_empty() {
        continue;
      }
      cache.insert(field.name.to_lowercase(), field.id);
    }
    Ok(cache.get(&lowered).cloned())
  }
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use wiremock::matchers::{method, path};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  use deskhand_core::JiraSettings;

  use super::*;

  async fn test_client(mock_server: &MockServer) -> JiraClient {
    let settings = JiraSettings {
      base_url: mock_server.uri(),
      username: "test_user".to_string(),
      password: "test_token".to_string(),
      timeout: Duration::from_secs(10),
    };
    JiraClient::new(&settings).expect("client should build")
  }

  #[tokio::test]
  async fn test_resolve_field_id_fetches_once() -> anyhow::Result<()> {
    let mock_server = MockServer::start().await;
    let client = test_client(&mock_server).await;

    Mock::given(method("GET"))
      .and(path("/rest/api/2/field"))
      .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
          {"id": "customfield_10100", "name": "Monitoring Dependencies (FQDN)"},
          {"id": "customfield_10101", "name": "Epic Link"}
      ])))
      .expect(1)
      .mount(&mock_server)
      .await;

    assert_eq!(
      client.resolve_field_id("Monitoring Dependencies (FQDN)").await?,
      Some("customfield_10100".to_string())
    );
    // Second lookup is served from the cache; the mock allows one call only.
    assert_eq!(
      client.resolve_field_id("epic link").await?,
      Some("customfield_10101".to_string())
    );
    assert_eq!(client.resolve_field_id("No Such Field").await?, None);
    Ok(())
  }

  #[tokio::test]
  async fn test_resolve_field_id_passthrough() -> anyhow::Result<()> {
    let mock_server = MockServer::start().await;
    let client = test_client(&mock_server).await;

    // No field mock mounted: passthrough ids must not hit the API.
    assert_eq!(
      client.resolve_field_id("customfield_12345").await?,
      Some("customfield_12345".to_string())
    );
    assert_eq!(client.resolve_field_id("summary").await?, Some("summary".to_string()));
    assert_eq!(client.resolve_field_id("").await?, None);
    Ok(())
  }
}
