//! # Jira Transition Endpoints
//!
//! Listing the transitions available to an issue and posting one.

use reqwest::Method;

use deskhand_core::Result;

use crate::client::JiraClient;
use crate::models::{Transition, TransitionId, TransitionRequest, Transitions};

impl JiraClient {
  /// Get available transitions for an issue.
  pub async fn get_transitions(&self, issue_key: &str) -> Result<Vec<Transition>> {
    let builder = self.request(Method::GET, &format!("/rest/api/2/issue/{issue_key}/transitions"));
    let transitions: Transitions = self.send_json(builder).await?;
    Ok(transitions.transitions)
  }

  /// Perform a transition by id. Jira answers 204 with an empty body.
  pub async fn transition_issue(&self, issue_key: &str, transition_id: &str) -> Result<()> {
    let payload = TransitionRequest {
      transition: TransitionId {
        id: transition_id.to_string(),
      },
    };
    let builder = self
      .request(Method::POST, &format!("/rest/api/2/issue/{issue_key}/transitions"))
      .json(&payload);
    self.send(builder).await?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use wiremock::matchers::{basic_auth, body_json, method, path};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  use deskhand_core::{Error, JiraSettings};

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
  async fn test_get_transitions() -> anyhow::Result<()> {
    let mock_server = MockServer::start().await;
    let client = test_client(&mock_server).await;

    Mock::given(method("GET"))
      .and(path("/rest/api/2/issue/TEST-123/transitions"))
      .and(basic_auth("test_user", "test_token"))
      .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
          "transitions": [
              {"id": "11", "name": "Start work", "to": {"id": "3", "name": "In Progress"}},
              {"id": "31", "name": "Resolve", "to": {"id": "5", "name": "Resolved"}}
          ]
      })))
      .mount(&mock_server)
      .await;

    let transitions = client.get_transitions("TEST-123").await?;
    assert_eq!(transitions.len(), 2);
    assert_eq!(transitions[1].to.as_ref().map(|s| s.name.as_str()), Some("Resolved"));
    Ok(())
  }

  #[tokio::test]
  async fn test_transition_issue_posts_id() -> anyhow::Result<()> {
    let mock_server = MockServer::start().await;
    let client = test_client(&mock_server).await;

    Mock::given(method("POST"))
      .and(path("/rest/api/2/issue/TEST-123/transitions"))
      .and(body_json(serde_json::json!({"transition": {"id": "31"}})))
      .respond_with(ResponseTemplate::new(204))
      .mount(&mock_server)
      .await;

    client.transition_issue("TEST-123", "31").await?;
    Ok(())
  }

  #[tokio::test]
  async fn test_transition_issue_invalid_is_api_error() -> anyhow::Result<()> {
    let mock_server = MockServer::start().await;
    let client = test_client(&mock_server).await;

    Mock::given(method("POST"))
      .and(path("/rest/api/2/issue/TEST-123/transitions"))
      .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
          "errorMessages": ["Transition is not valid for the current status"],
          "errors": {}
      })))
      .mount(&mock_server)
      .await;

    let err = client.transition_issue("TEST-123", "99").await.expect_err("should fail");
    assert!(matches!(err, Error::Api { status: 400, .. }));
    Ok(())
  }
}
