//! # Copy Issue Field Command
//!
//! Copies a field value from a source field to a target field across the
//! issues matched by a project/type/JQL selection. Issues whose source field
//! is empty, or whose target already carries the same text, are skipped.

use std::collections::BTreeMap;

use anyhow::{Result, bail};
use clap::Args;
use serde_json::Value;

use deskhand_core::config::resolve_env_or_config_str;
use deskhand_core::{Config, print_info};
use deskhand_jira::JiraService;
use deskhand_jira::jql::quote;

use crate::cli::batch::BatchSummary;
use crate::clients::create_jira_runtime_and_service;

/// Issue type the copy is restricted to when none is configured.
const DEFAULT_ISSUE_TYPE: &str = "Sub-task";

/// Default cap on issues fetched by the selection query.
const DEFAULT_MAX_RESULTS: usize = 200;

/// Arguments for the copy-issue-field command
#[derive(Args)]
pub struct CopyIssueFieldArgs {
  /// Jira project key to filter (default: $JIRA_PROJECT)
  #[arg(long)]
  pub project: Option<String>,

  /// Only update issues of this type; empty disables the filter
  /// (default: $JIRA_COPY_ISSUE_TYPE)
  #[arg(long)]
  pub issue_type: Option<String>,

  /// Field name or id to copy from
  #[arg(long, value_name = "NAME")]
  pub source_field: String,

  /// Field name or id to copy to
  #[arg(long, value_name = "NAME")]
  pub target_field: String,

  /// Additional JQL filter combined with the project and type clauses
  #[arg(long)]
  pub jql: Option<String>,

  /// Maximum number of issues to fetch
  #[arg(long, default_value_t = DEFAULT_MAX_RESULTS)]
  pub max_results: usize,

  /// Print updates without sending changes to Jira
  #[arg(long)]
  pub dry_run: bool,

  /// Request timeout in seconds
  #[arg(long)]
  pub timeout: Option<u64>,
}

/// Combine the project and issue-type clauses with an optional extra filter.
/// Returns `None` when nothing narrows the selection.
fn build_copy_jql(project: Option<&str>, issue_type: Option<&str>, extra: Option<&str>) -> Option<String> {
  let mut parts = Vec::new();
  if let Some(project) = project.filter(|p| !p.is_empty()) {
    parts.push(format!("project = {}", quote(project)));
  }
  if let Some(issue_type) = issue_type.filter(|t| !t.is_empty()) {
    parts.push(format!("issuetype = {}", quote(issue_type)));
  }
  let base = parts.join(" AND ");
  match extra.filter(|e| !e.trim().is_empty()) {
    Some(extra) if base.is_empty() => Some(extra.to_string()),
    Some(extra) => Some(format!("({base}) AND ({extra})")),
    None if base.is_empty() => None,
    None => Some(base),
  }
}

/// Flatten a field value into comparable text. Option objects render as
/// their first human-readable member; arrays join their parts.
fn stringify_value(value: &Value) -> String {
  match value {
    Value::Null => String::new(),
    Value::String(s) => s.trim().to_string(),
    Value::Object(map) => {
      for key in ["name", "value", "displayName", "key", "id"] {
        match map.get(key) {
          Some(Value::String(s)) if !s.trim().is_empty() => return s.trim().to_string(),
          Some(Value::Number(n)) => return n.to_string(),
          Some(Value::Bool(b)) => return b.to_string(),
          _ => {}
        }
      }
      value.to_string()
    }
    Value::Array(items) => {
      let parts: Vec<String> = items.iter().map(stringify_value).filter(|part| !part.is_empty()).collect();
      parts.join(", ")
    }
    other => other.to_string(),
  }
}

enum CopyOutcome {
  Copied,
  SkippedType,
  SkippedEmpty,
  SkippedSame,
}

pub(crate) fn handle_copy_issue_field_command(config: &Config, args: CopyIssueFieldArgs) -> Result<()> {
  let project = args
    .project
    .clone()
    .or_else(|| resolve_env_or_config_str("JIRA_PROJECT", config, "defaults.project"));
  let issue_type = args
    .issue_type
    .clone()
    .or_else(|| resolve_env_or_config_str("JIRA_COPY_ISSUE_TYPE", config, "defaults.copy_field.issue_type"))
    .unwrap_or_else(|| DEFAULT_ISSUE_TYPE.to_string());

  let Some(jql) = build_copy_jql(project.as_deref(), Some(&issue_type), args.jql.as_deref()) else {
    bail!("A project or --jql filter is required.");
  };

  let (rt, service) = create_jira_runtime_and_service(config, args.timeout)?;

  let keys = rt.block_on(service.search_issue_keys(&jql, args.max_results))?;
  if keys.is_empty() {
    println!("No matching Jira issues found.");
    return Ok(());
  }

  // Resolve both display names once; unknown names pass through as raw ids.
  let source_id = rt
    .block_on(service.client().resolve_field_id(&args.source_field))?
    .unwrap_or_else(|| args.source_field.clone());
  let target_id = rt
    .block_on(service.client().resolve_field_id(&args.target_field))?
    .unwrap_or_else(|| args.target_field.clone());

  let mut summary = BatchSummary::new();
  for key in &keys {
    match rt.block_on(copy_one(
      &service,
      key,
      &issue_type,
      &source_id,
      &target_id,
      &args.target_field,
      args.dry_run,
    )) {
      Ok(CopyOutcome::Copied) => {
        if args.dry_run {
          println!("[dry-run] {key} -> {}", args.target_field);
        } else {
          println!("[ok] {key}");
        }
        summary.record_updated();
      }
      Ok(CopyOutcome::SkippedType) => {
        println!("[skip] {key}: issue type is not '{issue_type}'.");
        summary.record_skipped();
      }
      Ok(CopyOutcome::SkippedEmpty) => {
        println!("[skip] {key}: source field is empty.");
        summary.record_skipped();
      }
      Ok(CopyOutcome::SkippedSame) => {
        println!("[skip] {key}: target already matches.");
        summary.record_skipped();
      }
      Err(err) => {
        println!("[fail] {key}: {err}");
        summary.record_failure(key, err.to_string());
      }
    }
  }

  if args.dry_run {
    print_info("Dry-run enabled. No changes were sent to Jira.");
  }
  summary.finish("issue", false)
}

/// Copy the source field onto one issue, or report why it was skipped.
async fn copy_one(
  service: &JiraService,
  key: &str,
  issue_type: &str,
  source_id: &str,
  target_id: &str,
  target_field: &str,
  dry_run: bool,
) -> deskhand_core::Result<CopyOutcome> {
  let issue = service.client().get_issue(key).await?;
  if !issue_type.is_empty() {
    let matches = issue
      .issue_type_name()
      .is_some_and(|t| t.eq_ignore_ascii_case(issue_type));
    if !matches {
      return Ok(CopyOutcome::SkippedType);
    }
  }

  let source_text = issue.field(source_id).as_ref().map(stringify_value).unwrap_or_default();
  if source_text.is_empty() {
    return Ok(CopyOutcome::SkippedEmpty);
  }
  let target_text = issue.field(target_id).as_ref().map(stringify_value).unwrap_or_default();
  if source_text == target_text {
    return Ok(CopyOutcome::SkippedSame);
  }

  if !dry_run {
    let mut fields = BTreeMap::new();
    fields.insert(target_field.to_string(), Value::String(source_text));
    service.update_fields(key, &fields).await?;
  }
  Ok(CopyOutcome::Copied)
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn test_build_copy_jql_combines_clauses() {
    assert_eq!(
      build_copy_jql(Some("OPS"), Some("Sub-task"), None).as_deref(),
      Some("project = \"OPS\" AND issuetype = \"Sub-task\"")
    );
    assert_eq!(
      build_copy_jql(Some("OPS"), None, Some("labels = audit")).as_deref(),
      Some("(project = \"OPS\") AND (labels = audit)")
    );
    assert_eq!(
      build_copy_jql(None, Some(""), Some("labels = audit")).as_deref(),
      Some("labels = audit")
    );
    assert!(build_copy_jql(None, None, None).is_none());
  }

  #[test]
  fn test_stringify_value_unwraps_objects_and_arrays() {
    assert_eq!(stringify_value(&json!("  text  ")), "text");
    assert_eq!(stringify_value(&json!({"name": "Team SRE"})), "Team SRE");
    assert_eq!(stringify_value(&json!({"value": "MySQL"})), "MySQL");
    assert_eq!(stringify_value(&json!(["a", {"name": "b"}, ""])), "a, b");
    assert_eq!(stringify_value(&json!(null)), "");
    assert_eq!(stringify_value(&json!(42)), "42");
  }
}
