//! # Issue Tracker Service
//!
//! The operations the CLI commands call into, composed from the endpoint
//! primitives: queue-aware issue listing, guarded status transitions, label
//! merging, field updates by display name, and batch field reporting.

use std::collections::BTreeMap;

use serde_json::{Value, json};
use tracing::{debug, warn};

use deskhand_core::{Error, Result, issue_url};

use crate::client::JiraClient;
use crate::jql::build_list_jql;
use crate::models::{Issue, QueueInfo};

/// Options controlling `list_issues`.
#[derive(Debug, Default, Clone)]
pub struct ListOptions {
  /// Project key the listing is scoped to.
  pub project: String,
  /// Maximum number of issues to return.
  pub max_results: usize,
  /// Queue id or name; resolved through the Service Desk API when set.
  pub queue: Option<String>,
  /// Service desk id, when already known. Skips the project lookup.
  pub service_desk_id: Option<String>,
  /// Force plain JQL even when a queue is set.
  pub use_jql: bool,
  /// Status names to keep; empty means "anything not Done".
  pub statuses: Vec<String>,
}

/// Result of a guarded transition attempt.
#[derive(Debug, Clone)]
pub struct TransitionOutcome {
  /// Status before the attempt, when the issue reported one.
  pub before: Option<String>,
  /// Status after the attempt.
  pub after: Option<String>,
  /// Whether a transition was actually performed.
  pub changed: bool,
}

/// Field values for one issue, keyed by display name. Missing fields are
/// reported as `None` rather than dropped.
#[derive(Debug)]
pub struct IssueFieldReport {
  pub key: String,
  pub url: String,
  pub status: Option<String>,
  pub fields: BTreeMap<String, Option<Value>>,
}

/// Merge label edits into an existing label set, preserving order.
///
/// Removals are applied first, then additions that are not already present
/// are appended. Comparison is exact.
pub fn merge_labels(existing: &[String], add: &[String], remove: &[String]) -> Vec<String> {
  let mut merged: Vec<String> = existing
    .iter()
    .filter(|label| !remove.contains(label))
    .cloned()
    .collect();
  for label in add {
    if !merged.contains(label) {
      merged.push(label.clone());
    }
  }
  merged
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
  a.eq_ignore_ascii_case(b)
}

/// High-level issue-tracker operations built on [`JiraClient`].
pub struct JiraService {
  client: JiraClient,
}

impl JiraService {
  pub fn new(client: JiraClient) -> Self {
    Self { client }
  }

  pub fn base_url(&self) -> &str {
    self.client.base_url()
  }

  pub fn client(&self) -> &JiraClient {
    &self.client
  }

  /// Browse URL for an issue key.
  pub fn issue_url(&self, issue_key: &str) -> String {
    issue_url(self.client.base_url(), issue_key)
  }

  /// List issues for a project, optionally scoped to a service-desk queue.
  ///
  /// With a queue, the queue's stored JQL is preferred so pagination and
  /// ordering stay server-side; when the queue carries no JQL the listing
  /// falls back to enumerating the queue's members. Plain JQL is used when no
  /// queue is given or `use_jql` forces it.
  pub async fn list_issues(&self, options: &ListOptions) -> Result<(Vec<Issue>, Option<QueueInfo>)> {
    let queue = match (&options.queue, options.use_jql) {
      (Some(queue), false) => Some(self.resolve_queue(&options.project, options.service_desk_id.as_deref(), queue).await?),
      _ => None,
    };

    let Some(queue) = queue else {
      let jql = build_list_jql(&options.project, None, &options.statuses);
      debug!(%jql, "listing issues by JQL");
      let issues = self.client.search_issues(&jql, options.max_results).await?;
      return Ok((issues, None));
    };

    let issues = if let Some(queue_jql) = queue.jql.as_deref() {
      let jql = build_list_jql(&options.project, Some(queue_jql), &options.statuses);
      debug!(%jql, queue = %queue.name, "listing issues by queue JQL");
      let issues = self.client.search_issues(&jql, options.max_results).await?;
      filter_by_status(issues, &options.statuses)
    } else {
      let keys = self
        .client
        .queue_issue_keys(&queue.service_desk_id, &queue.queue_id, options.max_results)
        .await?;
      let mut issues = Vec::with_capacity(keys.len());
      for key in keys {
        match self.client.get_issue(&key).await {
          Ok(issue) => issues.push(issue),
          Err(err) => warn!(%key, %err, "skipping queue issue that failed to load"),
        }
      }
      filter_by_status(issues, &options.statuses)
    };
    Ok((issues, Some(queue)))
  }

  async fn resolve_queue(&self, project: &str, service_desk_id: Option<&str>, queue: &str) -> Result<QueueInfo> {
    let service_desk_id = match service_desk_id {
      Some(id) => id.to_string(),
      None => self.client.find_service_desk_id(project).await?,
    };
    self.client.find_queue(&service_desk_id, queue).await
  }

  /// Transition an issue to the status named `target`.
  ///
  /// When `only_status` is set the transition is skipped unless the issue is
  /// currently in that status. An issue already in the target status is also
  /// skipped. Matching is case-insensitive against both the transition name
  /// and the status it leads to.
  pub async fn transition_issue(&self, issue_key: &str, only_status: Option<&str>, target: &str) -> Result<TransitionOutcome> {
    let issue = self.client.get_issue(issue_key).await?;
    let before = issue.status_name().map(str::to_string);

    if let (Some(only), Some(current)) = (only_status, before.as_deref())
      && !eq_ignore_case(only, current)
    {
      return Ok(TransitionOutcome {
        after: before.clone(),
        before,
        changed: false,
      });
    }
    if let Some(current) = before.as_deref()
      && eq_ignore_case(current, target)
    {
      return Ok(TransitionOutcome {
        after: before.clone(),
        before,
        changed: false,
      });
    }

    let transitions = self.client.get_transitions(issue_key).await?;
    let matched = transitions.iter().find(|transition| {
      eq_ignore_case(&transition.name, target)
        || transition
          .to
          .as_ref()
          .is_some_and(|status| eq_ignore_case(&status.name, target))
    });
    let Some(transition) = matched else {
      return Err(Error::NotFound(format!(
        "No transition to '{target}' found for issue {issue_key}."
      )));
    };

    self.client.transition_issue(issue_key, &transition.id).await?;
    let after = transition
      .to
      .as_ref()
      .map(|status| status.name.clone())
      .unwrap_or_else(|| target.to_string());
    Ok(TransitionOutcome {
      before,
      after: Some(after),
      changed: true,
    })
  }

  /// Apply label additions and removals with a single field update.
  ///
  /// The current labels are fetched, merged, and written back as one
  /// `labels` PUT. Returns the final label set.
  pub async fn merge_issue_labels(&self, issue_key: &str, add: &[String], remove: &[String]) -> Result<Vec<String>> {
    let issue = self.client.get_issue(issue_key).await?;
    let merged = merge_labels(&issue.fields.labels, add, remove);
    if merged == issue.fields.labels {
      debug!(%issue_key, "labels already in desired state");
      return Ok(merged);
    }
    self
      .client
      .update_issue_fields(issue_key, &json!({ "labels": merged }))
      .await?;
    Ok(merged)
  }

  /// Update issue fields given by display name.
  ///
  /// Names are resolved to field ids through the metadata cache; a name with
  /// no match is used as-is so raw ids keep working. Fails before any network
  /// write when the map is empty.
  pub async fn update_fields(&self, issue_key: &str, fields: &BTreeMap<String, Value>) -> Result<()> {
    if fields.is_empty() {
      return Err(Error::Config("No valid fields to update.".to_string()));
    }
    let mut payload = serde_json::Map::new();
    for (name, value) in fields {
      let field_id = self
        .client
        .resolve_field_id(name)
        .await?
        .unwrap_or_else(|| name.clone());
      payload.insert(field_id, value.clone());
    }
    self.client.update_issue_fields(issue_key, &Value::Object(payload)).await
  }

  /// Assign an issue to an account id.
  pub async fn assign_issue(&self, issue_key: &str, account_id: &str) -> Result<()> {
    self.client.assign_issue(issue_key, account_id).await
  }

  /// Fetch the named fields for each issue key.
  ///
  /// Failures are collected per key rather than aborting the batch; the
  /// second element pairs each failed key with its error message.
  pub async fn fetch_issue_fields(
    &self,
    issue_keys: &[String],
    field_names: &[String],
  ) -> Result<(Vec<IssueFieldReport>, Vec<(String, String)>)> {
    let mut resolved: Vec<(String, String)> = Vec::with_capacity(field_names.len());
    for name in field_names {
      let field_id = self
        .client
        .resolve_field_id(name)
        .await?
        .unwrap_or_else(|| name.clone());
      resolved.push((name.clone(), field_id));
    }

    let mut reports = Vec::with_capacity(issue_keys.len());
    let mut failures = Vec::new();
    for key in issue_keys {
      let issue = match self.client.get_issue(key).await {
        Ok(issue) => issue,
        Err(err) => {
          failures.push((key.clone(), err.to_string()));
          continue;
        }
      };
      let mut fields = BTreeMap::new();
      for (name, field_id) in &resolved {
        fields.insert(name.clone(), issue.field(field_id));
      }
      reports.push(IssueFieldReport {
        key: issue.key.clone(),
        url: self.issue_url(&issue.key),
        status: issue.status_name().map(str::to_string),
        fields,
      });
    }
    Ok((reports, failures))
  }

  /// Search by JQL and return matching issue keys.
  pub async fn search_issue_keys(&self, jql: &str, max_results: usize) -> Result<Vec<String>> {
    let issues = self.client.search_issues(jql, max_results).await?;
    Ok(issues.into_iter().map(|issue| issue.key).collect())
  }

  /// Find field metadata entries by display name, exact or substring,
  /// case-insensitive either way.
  pub async fn find_fields(&self, name: &str, contains: bool) -> Result<Vec<crate::models::FieldInfo>> {
    let lowered = name.to_lowercase();
    let fields = self.client.list_fields().await?;
    Ok(
      fields
        .into_iter()
        .filter(|field| {
          let candidate = field.name.to_lowercase();
          if contains {
            candidate.contains(&lowered)
          } else {
            candidate == lowered
          }
        })
        .collect(),
    )
  }
}

/// Keep only issues whose status matches one of `statuses`, case-insensitive.
/// An empty status list keeps everything.
fn filter_by_status(issues: Vec<Issue>, statuses: &[String]) -> Vec<Issue> {
  if statuses.is_empty() {
    return issues;
  }
  issues
    .into_iter()
    .filter(|issue| {
      issue
        .status_name()
        .is_some_and(|current| statuses.iter().any(|status| eq_ignore_case(status, current)))
    })
    .collect()
}
