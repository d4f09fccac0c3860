//! # Confluence Labeler Command
//!
//! Scans Jira macros on a wiki page (or its children) for issue keys and JQL
//! queries, then merges the requested label changes into every referenced
//! issue.

use anyhow::{Result, bail};
use clap::Args;

use deskhand_confluence::service::PageTarget;
use deskhand_confluence::{extract_page_id, parse_macro_params};
use deskhand_core::config::{env_str, resolve_env_or_config_bool, resolve_env_or_config_str, resolve_env_or_config_u64};
use deskhand_core::merge::merge_labels;
use deskhand_core::{Config, extract_issue_key, print_info};

use crate::cli::batch::BatchSummary;
use crate::clients::{create_confluence_runtime_and_service, create_jira_service_on};

/// Macro name scanned when none is configured.
const DEFAULT_MACRO: &str = "jira";

/// Cap on issues pulled in per JQL query found on a page.
const JQL_EXPANSION_LIMIT: usize = 500;

/// Macro parameters that carry issue references.
const KEY_PARAMS: &[&str] = &["key", "issuekey", "issuekeys", "issues"];

/// Macro parameters that carry JQL queries.
const JQL_PARAMS: &[&str] = &["jql", "jqlquery"];

/// Arguments for the confluence-labeler command
#[derive(Args)]
pub struct ConfluenceLabelerArgs {
  /// Page id or URL
  #[arg(value_name = "PAGE", required = true)]
  pub page: String,

  /// Macro name to scan for issue references (default: $CONFLUENCE_LABEL_MACRO or "jira")
  #[arg(long = "macro", value_name = "NAME")]
  pub macro_name: Option<String>,

  /// Process the page's children instead of the page itself
  #[arg(long)]
  pub is_parent: bool,

  /// Maximum number of child pages to process
  #[arg(long)]
  pub max_children: Option<u64>,

  /// Only label issues of this type (default: $CONFLUENCE_LABEL_ISSUE_TYPE)
  #[arg(long)]
  pub issue_type: Option<String>,

  /// Label to add; repeatable (default: $CONFLUENCE_LABEL_ADD)
  #[arg(long = "add-label", value_name = "LABEL")]
  pub add_labels: Vec<String>,

  /// Label to remove; repeatable (default: $CONFLUENCE_LABEL_REMOVE)
  #[arg(long = "remove-label", value_name = "LABEL")]
  pub remove_labels: Vec<String>,

  /// Request timeout in seconds
  #[arg(long)]
  pub timeout: Option<u64>,
}

/// Pull issue keys and JQL queries out of one macro body's parameters.
fn references_from_macro(body: &str) -> (Vec<String>, Vec<String>) {
  let params: std::collections::BTreeMap<String, String> = parse_macro_params(body)
    .into_iter()
    .map(|(name, value)| (name.to_lowercase(), value))
    .collect();

  let mut keys = Vec::new();
  for name in KEY_PARAMS {
    if let Some(value) = params.get(*name) {
      keys.extend(value.split(',').filter_map(extract_issue_key));
    }
  }
  let mut queries = Vec::new();
  for name in JQL_PARAMS {
    if let Some(value) = params.get(*name)
      && !value.trim().is_empty()
    {
      queries.push(value.trim().to_string());
    }
  }
  (keys, queries)
}

fn push_unique(keys: &mut Vec<String>, candidates: Vec<String>) {
  for key in candidates {
    if !keys.contains(&key) {
      keys.push(key);
    }
  }
}

pub(crate) fn handle_confluence_labeler_command(config: &Config, args: ConfluenceLabelerArgs) -> Result<()> {
  let Some(page_id) = extract_page_id(&args.page) else {
    bail!("'{}' is not a page id or page URL.", args.page);
  };
  let macro_name = args
    .macro_name
    .clone()
    .or_else(|| resolve_env_or_config_str("CONFLUENCE_LABEL_MACRO", config, "defaults.confluence_labeler.macro"))
    .unwrap_or_else(|| DEFAULT_MACRO.to_string());
  let add_labels = merge_labels(
    config.get("defaults.confluence_labeler.add_labels"),
    env_str("CONFLUENCE_LABEL_ADD").as_deref(),
    &args.add_labels,
  );
  let remove_labels = merge_labels(
    config.get("defaults.confluence_labeler.remove_labels"),
    env_str("CONFLUENCE_LABEL_REMOVE").as_deref(),
    &args.remove_labels,
  );
  if add_labels.is_empty() && remove_labels.is_empty() {
    bail!("No label changes specified. Use --add-label or --remove-label.");
  }
  let issue_type = args.issue_type.clone().or_else(|| {
    resolve_env_or_config_str("CONFLUENCE_LABEL_ISSUE_TYPE", config, "defaults.confluence_labeler.issue_type")
  });
  let is_parent =
    args.is_parent || resolve_env_or_config_bool("CONFLUENCE_IS_PARENT", config, "confluence.is_parent").unwrap_or(false);
  let max_children = args
    .max_children
    .or_else(|| resolve_env_or_config_u64("CONFLUENCE_MAX_CHILDREN", config, "confluence.max_children"))
    .map(|n| n as usize);

  let (rt, confluence) = create_confluence_runtime_and_service(config, args.timeout)?;
  let jira = create_jira_service_on(&rt, config, args.timeout)?;

  let target = PageTarget {
    page_id,
    children: is_parent,
    max_children,
  };
  let (contents, page_failures) = rt.block_on(confluence.fetch_pages_with_content(&target, None, Some(&macro_name)))?;

  let mut keys: Vec<String> = Vec::new();
  let mut queries: Vec<String> = Vec::new();
  for content in &contents {
    for body in &content.macros {
      let (macro_keys, macro_queries) = references_from_macro(body);
      push_unique(&mut keys, macro_keys);
      queries.extend(macro_queries);
    }
  }
  for query in &queries {
    let from_search = rt.block_on(jira.search_issue_keys(query, JQL_EXPANSION_LIMIT))?;
    push_unique(&mut keys, from_search);
  }
  if keys.is_empty() {
    bail!("No issue references found in '{macro_name}' macros.");
  }
  print_info(&format!(
    "Labeling {} issue(s) from {} page(s).",
    keys.len(),
    contents.len()
  ));

  let mut summary = BatchSummary::new();
  for key in &keys {
    let outcome = rt.block_on(label_one(&jira, key, issue_type.as_deref(), &add_labels, &remove_labels));
    match outcome {
      Ok(Some(labels)) => {
        println!("[ok] {key}: labels now [{}]", labels.join(", "));
        summary.record_updated();
      }
      Ok(None) => {
        println!("[skip] {key}: issue type does not match '{}'.", issue_type.as_deref().unwrap_or(""));
        summary.record_skipped();
      }
      Err(err) => {
        println!("[fail] {key}: {err}");
        summary.record_failure(key, err.to_string());
      }
    }
  }
  for (id, message) in &page_failures {
    summary.record_failure(&format!("page {id}"), message.clone());
  }
  summary.finish("issue", false)
}

/// Merge labels into one issue, honoring the optional issue-type filter.
/// Returns the final label set, or `None` when the filter skipped the issue.
async fn label_one(
  jira: &deskhand_jira::JiraService,
  key: &str,
  issue_type: Option<&str>,
  add: &[String],
  remove: &[String],
) -> deskhand_core::Result<Option<Vec<String>>> {
  if let Some(wanted_type) = issue_type {
    let issue = jira.client().get_issue(key).await?;
    let matches = issue
      .issue_type_name()
      .is_some_and(|t| t.eq_ignore_ascii_case(wanted_type));
    if !matches {
      return Ok(None);
    }
  }
  let labels = jira.merge_issue_labels(key, add, remove).await?;
  Ok(Some(labels))
}
