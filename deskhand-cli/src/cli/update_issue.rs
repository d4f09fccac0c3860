//! # Update Issue Command
//!
//! Applies field, label, summary, assignee, and epic-link updates to a batch
//! of issues selected by key, file, stdin, or JQL. Every update source can be
//! preloaded from the environment or the config file's `defaults.update`
//! block, so recurring cleanups need only the issue selection.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Args;
use serde_json::Value;

use deskhand_core::config::{env_str, resolve_env_or_config_str};
use deskhand_core::merge::{merge_fields, merge_labels};
use deskhand_core::{Config, read_issue_keys};

use crate::cli::batch::BatchSummary;
use crate::clients::create_jira_runtime_and_service;

/// Display name of the epic link field when none is configured.
const DEFAULT_EPIC_FIELD: &str = "Epic Link";

/// Cap on issues selected through --jql.
const JQL_SELECTION_LIMIT: usize = 500;

/// Arguments for the update-issue command
#[derive(Args)]
pub struct UpdateIssueArgs {
  /// Issue keys or browse URLs
  #[arg(value_name = "ISSUE")]
  pub issues: Vec<String>,

  /// File with one issue key or URL per line
  #[arg(long, short = 'f', value_name = "PATH")]
  pub file: Option<PathBuf>,

  /// Select issues with a JQL query instead of explicit keys
  #[arg(long)]
  pub jql: Option<String>,

  /// Label to add; repeatable (default: $JIRA_UPDATE_ADD_LABELS)
  #[arg(long = "add-label", value_name = "LABEL")]
  pub add_labels: Vec<String>,

  /// Label to remove; repeatable (default: $JIRA_UPDATE_REMOVE_LABELS)
  #[arg(long = "remove-label", value_name = "LABEL")]
  pub remove_labels: Vec<String>,

  /// New summary (default: $JIRA_UPDATE_SUMMARY)
  #[arg(long)]
  pub set_summary: Option<String>,

  /// Field assignment NAME=VALUE; repeatable (default: $JIRA_UPDATE_FIELDS)
  #[arg(long = "set-field", value_name = "NAME=VALUE")]
  pub set_fields: Vec<String>,

  /// Account id to assign the issues to (default: $JIRA_UPDATE_ASSIGNEE)
  #[arg(long)]
  pub assignee: Option<String>,

  /// Only update issues of this type (default: $JIRA_UPDATE_ISSUE_TYPE)
  #[arg(long)]
  pub issue_type: Option<String>,

  /// Epic issue key to link the issues to (default: $JIRA_UPDATE_EPIC)
  #[arg(long)]
  pub epic: Option<String>,

  /// Display name of the epic link field
  #[arg(long, value_name = "NAME")]
  pub epic_field: Option<String>,

  /// Request timeout in seconds
  #[arg(long)]
  pub timeout: Option<u64>,
}

/// Update actions resolved from flags, environment, and config defaults.
struct UpdateActions {
  add_labels: Vec<String>,
  remove_labels: Vec<String>,
  fields: BTreeMap<String, String>,
  summary: Option<String>,
  assignee: Option<String>,
  epic: Option<String>,
  epic_field: String,
  issue_type: Option<String>,
}

impl UpdateActions {
  fn resolve(config: &Config, args: &UpdateIssueArgs) -> Self {
    Self {
      add_labels: merge_labels(
        config.get("defaults.update.add_labels"),
        env_str("JIRA_UPDATE_ADD_LABELS").as_deref(),
        &args.add_labels,
      ),
      remove_labels: merge_labels(
        config.get("defaults.update.remove_labels"),
        env_str("JIRA_UPDATE_REMOVE_LABELS").as_deref(),
        &args.remove_labels,
      ),
      fields: merge_fields(
        config.get("defaults.update.fields"),
        env_str("JIRA_UPDATE_FIELDS").as_deref(),
        &args.set_fields,
      ),
      summary: args
        .set_summary
        .clone()
        .or_else(|| resolve_env_or_config_str("JIRA_UPDATE_SUMMARY", config, "defaults.update.summary")),
      assignee: args
        .assignee
        .clone()
        .or_else(|| resolve_env_or_config_str("JIRA_UPDATE_ASSIGNEE", config, "defaults.update.assignee")),
      epic: args
        .epic
        .clone()
        .or_else(|| resolve_env_or_config_str("JIRA_UPDATE_EPIC", config, "defaults.update.epic")),
      epic_field: args
        .epic_field
        .clone()
        .or_else(|| config.get_str("defaults.update.epic_field"))
        .unwrap_or_else(|| DEFAULT_EPIC_FIELD.to_string()),
      issue_type: args
        .issue_type
        .clone()
        .or_else(|| resolve_env_or_config_str("JIRA_UPDATE_ISSUE_TYPE", config, "defaults.update.issue_type")),
    }
  }

  fn is_empty(&self) -> bool {
    self.add_labels.is_empty()
      && self.remove_labels.is_empty()
      && self.fields.is_empty()
      && self.summary.is_none()
      && self.assignee.is_none()
      && self.epic.is_none()
  }

  /// The field assignments for one update call: explicit fields, summary,
  /// and the epic link.
  fn field_map(&self) -> BTreeMap<String, Value> {
    let mut map: BTreeMap<String, Value> = self
      .fields
      .iter()
      .map(|(name, value)| (name.clone(), Value::String(value.clone())))
      .collect();
    if let Some(summary) = &self.summary {
      map.insert("summary".to_string(), Value::String(summary.clone()));
    }
    if let Some(epic) = &self.epic {
      map.insert(self.epic_field.clone(), Value::String(epic.clone()));
    }
    map
  }
}

pub(crate) fn handle_update_issue_command(config: &Config, args: UpdateIssueArgs) -> Result<()> {
  let jql = args
    .jql
    .clone()
    .or_else(|| resolve_env_or_config_str("JIRA_UPDATE_JQL", config, "defaults.update.jql"));
  let actions = UpdateActions::resolve(config, &args);
  if actions.is_empty() {
    bail!(
      "No update actions specified. Use --add-label, --remove-label, --set-field, --set-summary, --assignee, or --epic."
    );
  }

  let (rt, service) = create_jira_runtime_and_service(config, args.timeout)?;

  let keys = match &jql {
    Some(jql) if args.issues.is_empty() && args.file.is_none() => {
      rt.block_on(service.search_issue_keys(jql, JQL_SELECTION_LIMIT))?
    }
    _ => read_issue_keys(&args.issues, args.file.as_deref())?,
  };
  if keys.is_empty() {
    bail!("The JQL query matched no issues.");
  }

  let field_map = actions.field_map();
  let mut summary = BatchSummary::new();
  for key in &keys {
    match rt.block_on(update_one(&service, key, &actions, &field_map)) {
      Ok(true) => {
        println!("[ok] {key}");
        summary.record_updated();
      }
      Ok(false) => {
        println!("[skip] {key}: issue type does not match '{}'.", actions.issue_type.as_deref().unwrap_or(""));
        summary.record_skipped();
      }
      Err(err) => {
        println!("[fail] {key}: {err}");
        summary.record_failure(key, err.to_string());
      }
    }
  }
  summary.finish("issue", false)
}

/// Apply every resolved action to one issue. Returns `Ok(false)` when the
/// issue-type filter skipped it.
async fn update_one(
  service: &deskhand_jira::JiraService,
  key: &str,
  actions: &UpdateActions,
  field_map: &BTreeMap<String, Value>,
) -> deskhand_core::Result<bool> {
  if let Some(wanted_type) = &actions.issue_type {
    let issue = service.client().get_issue(key).await?;
    let matches = issue
      .issue_type_name()
      .is_some_and(|t| t.eq_ignore_ascii_case(wanted_type));
    if !matches {
      return Ok(false);
    }
  }

  if !field_map.is_empty() {
    service.update_fields(key, field_map).await?;
  }
  if !actions.add_labels.is_empty() || !actions.remove_labels.is_empty() {
    service.merge_issue_labels(key, &actions.add_labels, &actions.remove_labels).await?;
  }
  if let Some(assignee) = &actions.assignee {
    service.assign_issue(key, assignee).await?;
  }
  Ok(true)
}
