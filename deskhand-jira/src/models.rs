//! Wire models for the Jira REST and Service Desk APIs.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Represents a Jira issue
#[derive(Debug, Deserialize)]
pub struct Issue {
  pub id: Option<String>,
  pub key: String,
  #[serde(default)]
  pub fields: IssueFields,
}

/// Represents Jira issue fields; custom fields land in `extra` keyed by
/// their raw field id.
#[derive(Debug, Default, Deserialize)]
pub struct IssueFields {
  pub summary: Option<String>,
  pub status: Option<IssueStatus>,
  #[serde(default)]
  pub labels: Vec<String>,
  pub issuetype: Option<IssueType>,
  pub assignee: Option<User>,
  #[serde(flatten)]
  pub extra: serde_json::Map<String, Value>,
}

/// Represents a Jira issue status
#[derive(Debug, Clone, Deserialize)]
pub struct IssueStatus {
  pub id: Option<String>,
  pub name: String,
}

/// Represents a Jira issue type
#[derive(Debug, Deserialize)]
pub struct IssueType {
  pub name: String,
}

/// Represents a Jira user
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub account_id: Option<String>,
  pub display_name: Option<String>,
}

impl Issue {
  /// Current status name, when the status field was returned.
  pub fn status_name(&self) -> Option<&str> {
    self.fields.status.as_ref().map(|s| s.name.as_str())
  }

  /// Issue type name, when the issuetype field was returned.
  pub fn issue_type_name(&self) -> Option<&str> {
    self.fields.issuetype.as_ref().map(|t| t.name.as_str())
  }

  /// Look up a field value by raw field id.
  pub fn field(&self, field_id: &str) -> Option<Value> {
    match field_id {
      "summary" => self.fields.summary.clone().map(Value::String),
      "status" => self.status_name().map(|s| Value::String(s.to_string())),
      "labels" => Some(Value::Array(
        self.fields.labels.iter().cloned().map(Value::String).collect(),
      )),
      _ => self.fields.extra.get(field_id).filter(|v| !v.is_null()).cloned(),
    }
  }
}

/// One page of `/rest/api/2/search` results
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
  #[serde(default)]
  pub issues: Vec<Issue>,
  pub start_at: Option<u64>,
  pub total: Option<u64>,
}

/// Field metadata entry from `/rest/api/2/field`
#[derive(Debug, Clone, Deserialize)]
pub struct FieldInfo {
  pub id: String,
  pub name: String,
}

/// Represents a Jira transition; `to` is the status the transition leads to
#[derive(Debug, Deserialize)]
pub struct Transition {
  pub id: String,
  pub name: String,
  pub to: Option<IssueStatus>,
}

/// Represents a list of Jira transitions
#[derive(Debug, Deserialize)]
pub struct Transitions {
  pub transitions: Vec<Transition>,
}

/// Represents a transition request payload
#[derive(Debug, Serialize)]
pub struct TransitionRequest {
  pub transition: TransitionId,
}

/// Represents a transition ID for the request
#[derive(Debug, Serialize)]
pub struct TransitionId {
  pub id: String,
}

/// One page of a Service Desk API listing
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedValues<T> {
  #[serde(default = "Vec::new")]
  pub values: Vec<T>,
  #[serde(default)]
  pub is_last_page: bool,
}

/// Service desk entry from `/rest/servicedeskapi/servicedesk`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDesk {
  pub id: String,
  pub project_key: Option<String>,
}

/// Queue entry from `/rest/servicedeskapi/servicedesk/{id}/queue`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Queue {
  pub id: Option<String>,
  pub queue_id: Option<String>,
  pub name: Option<String>,
  pub jql: Option<String>,
}

/// Issue entry from a queue listing
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueIssue {
  pub issue_key: Option<String>,
}

/// Resolved queue identity reported back to the user.
#[derive(Debug, Clone)]
pub struct QueueInfo {
  pub service_desk_id: String,
  pub queue_id: String,
  pub name: String,
  pub jql: Option<String>,
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn test_issue_deserialization_with_custom_fields() {
    let json = json!({
        "id": "10000",
        "key": "PROJ-123",
        "fields": {
            "summary": "Test issue",
            "status": {"id": "3", "name": "In Progress"},
            "labels": ["ops"],
            "issuetype": {"name": "Task"},
            "customfield_10100": "db01.example.com"
        }
    });

    let issue: Issue = serde_json::from_value(json).expect("issue should parse");
    assert_eq!(issue.key, "PROJ-123");
    assert_eq!(issue.status_name(), Some("In Progress"));
    assert_eq!(issue.issue_type_name(), Some("Task"));
    assert_eq!(issue.fields.labels, vec!["ops"]);
    assert_eq!(
      issue.field("customfield_10100"),
      Some(json!("db01.example.com"))
    );
    assert_eq!(issue.field("summary"), Some(json!("Test issue")));
    assert_eq!(issue.field("customfield_99999"), None);
  }

  #[test]
  fn test_transitions_deserialization_with_target_status() {
    let json = json!({
        "transitions": [
            {"id": "11", "name": "Start work", "to": {"id": "3", "name": "In Progress"}},
            {"id": "31", "name": "Done"}
        ]
    });

    let transitions: Transitions = serde_json::from_value(json).expect("transitions should parse");
    assert_eq!(transitions.transitions.len(), 2);
    assert_eq!(transitions.transitions[0].id, "11");
    assert_eq!(
      transitions.transitions[0].to.as_ref().map(|s| s.name.as_str()),
      Some("In Progress")
    );
    assert!(transitions.transitions[1].to.is_none());
  }

  #[test]
  fn test_transition_request_serialization() {
    let request = TransitionRequest {
      transition: TransitionId { id: "21".to_string() },
    };
    let json = serde_json::to_value(&request).expect("request should serialize");
    assert_eq!(json, json!({"transition": {"id": "21"}}));
  }

  #[test]
  fn test_paged_values_defaults() {
    let page: PagedValues<QueueIssue> = serde_json::from_value(json!({})).expect("page should parse");
    assert!(page.values.is_empty());
    assert!(!page.is_last_page);
  }
}
