//! # Group Issue Fields Command
//!
//! Fetches two fields for a batch of issues and groups the primary values by
//! keyword matches against the secondary value. The grouping labels and
//! keywords are fully configurable, so one command covers every
//! "bucket these issues by that field" report.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, ValueEnum};
use serde_json::Value;

use deskhand_core::config::env_str;
use deskhand_core::merge::{merge_labels, split_tokens};
use deskhand_core::{Config, print_error, print_header, print_success, read_issue_keys};

use crate::clients::create_jira_runtime_and_service;

/// Placeholder for an empty field value in reports.
const NO_VALUE: &str = "<no value>";

/// Output file format for --output.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum ExportFormat {
  #[default]
  Txt,
  Csv,
}

/// Arguments for the group-issue-fields command
#[derive(Args)]
pub struct GroupIssueFieldsArgs {
  /// Issue keys or browse URLs
  #[arg(value_name = "ISSUE")]
  pub issues: Vec<String>,

  /// File with one issue key or URL per line
  #[arg(long, short = 'f', value_name = "PATH")]
  pub file: Option<PathBuf>,

  /// Field name for the displayed value (default: $JIRA_FIELD_PRIMARY)
  #[arg(long, value_name = "NAME")]
  pub field_primary: Option<String>,

  /// Field name the keywords are matched against (default: $JIRA_FIELD_SECONDARY)
  #[arg(long, value_name = "NAME")]
  pub field_secondary: Option<String>,

  /// Label for the first match group (default: $JIRA_GROUP_A_LABEL)
  #[arg(long, value_name = "LABEL")]
  pub group_a_label: Option<String>,

  /// Keyword(s) mapping to group A; repeatable or comma-separated
  /// (default: $JIRA_GROUP_A_KEYWORDS)
  #[arg(long = "group-a-keyword", value_name = "TOKEN[,TOKEN...]")]
  pub group_a_keywords: Vec<String>,

  /// Label for the second match group (default: $JIRA_GROUP_B_LABEL)
  #[arg(long, value_name = "LABEL")]
  pub group_b_label: Option<String>,

  /// Keyword(s) mapping to group B; repeatable or comma-separated
  /// (default: $JIRA_GROUP_B_KEYWORDS)
  #[arg(long = "group-b-keyword", value_name = "TOKEN[,TOKEN...]")]
  pub group_b_keywords: Vec<String>,

  /// Label for issues matching neither group (default: $JIRA_LABEL_OTHER)
  #[arg(long, value_name = "LABEL")]
  pub label_other: Option<String>,

  /// Write the report to a file instead of stdout
  #[arg(long, value_name = "PATH")]
  pub output: Option<PathBuf>,

  /// File format for --output
  #[arg(long, value_enum, default_value_t = ExportFormat::Txt)]
  pub format: ExportFormat,

  /// Request timeout in seconds
  #[arg(long)]
  pub timeout: Option<u64>,
}

/// One grouped report row.
struct GroupedEntry {
  key: String,
  url: String,
  primary: Option<String>,
  secondary: Option<String>,
}

/// Keyword list from config default, env string, and repeatable CLI flags,
/// lowercased for matching. CLI tokens may be comma-separated.
fn resolve_keywords(config_value: Option<&Value>, env_raw: Option<&str>, cli_values: &[String]) -> Vec<String> {
  let mut tokens = merge_labels(config_value, env_raw, &[]);
  for raw in cli_values {
    tokens.extend(split_tokens(raw));
  }
  tokens.iter().map(|token| token.to_lowercase()).collect()
}

/// Flatten a field value into display text. Arrays join their parts.
fn normalize_value(value: Option<&Value>) -> Option<String> {
  match value? {
    Value::Null => None,
    Value::String(s) => Some(s.trim().to_string()),
    Value::Array(items) => {
      let parts: Vec<String> = items
        .iter()
        .filter_map(|item| normalize_value(Some(item)))
        .filter(|part| !part.is_empty())
        .collect();
      Some(parts.join(", "))
    }
    other => Some(other.to_string()),
  }
}

/// Pick the first group whose keyword list matches `value`, case-insensitive
/// substring match. Empty values and misses fall into `other_label`.
fn categorize<'a>(value: Option<&str>, groups: &[(&'a str, &[String])], other_label: &'a str) -> &'a str {
  let Some(value) = value.filter(|v| !v.is_empty()) else {
    return other_label;
  };
  let lowered = value.to_lowercase();
  for (label, keywords) in groups {
    if keywords.iter().any(|keyword| !keyword.is_empty() && lowered.contains(keyword)) {
      return label;
    }
  }
  other_label
}

/// Plain-text rendering: one line per issue with both field values.
fn render_txt(
  grouped: &[(&str, Vec<GroupedEntry>)],
  field_primary: &str,
  field_secondary: &str,
) -> String {
  let total: usize = grouped.iter().map(|(_, entries)| entries.len()).sum();
  let mut lines = vec![format!("Total issues: {total}")];
  for (label, entries) in grouped {
    if entries.is_empty() {
      continue;
    }
    lines.push(format!("\n{label}:"));
    for entry in entries {
      lines.push(format!(
        "- {}: {field_primary}={}; {field_secondary}={}",
        entry.key,
        entry.primary.as_deref().unwrap_or(NO_VALUE),
        entry.secondary.as_deref().unwrap_or(NO_VALUE),
      ));
    }
  }
  lines.join("\n")
}

fn csv_escape(value: &str) -> String {
  if value.contains([',', '"', '\n']) {
    format!("\"{}\"", value.replace('"', "\"\""))
  } else {
    value.to_string()
  }
}

/// CSV rendering: parameter/value pairs per issue, blank row between issues.
fn render_csv(
  grouped: &[(&str, Vec<GroupedEntry>)],
  field_primary: &str,
  field_secondary: &str,
) -> String {
  let mut rows = vec!["parameter_name,parameter_value".to_string()];
  for (label, entries) in grouped {
    for entry in entries {
      rows.push(format!("key,{}", csv_escape(&entry.key)));
      rows.push(format!("url,{}", csv_escape(&entry.url)));
      rows.push(format!(
        "{},{}",
        csv_escape(field_primary),
        csv_escape(entry.primary.as_deref().unwrap_or_default())
      ));
      rows.push(format!(
        "{},{}",
        csv_escape(field_secondary),
        csv_escape(entry.secondary.as_deref().unwrap_or_default())
      ));
      rows.push(format!("group,{}", csv_escape(label)));
      rows.push(",".to_string());
    }
  }
  rows.join("\n")
}

pub(crate) fn handle_group_issue_fields_command(config: &Config, args: GroupIssueFieldsArgs) -> Result<()> {
  let field_primary = args
    .field_primary
    .clone()
    .or_else(|| env_str("JIRA_FIELD_PRIMARY"))
    .or_else(|| config.get_str("defaults.field_primary"));
  let field_secondary = args
    .field_secondary
    .clone()
    .or_else(|| env_str("JIRA_FIELD_SECONDARY"))
    .or_else(|| config.get_str("defaults.field_secondary"));
  let (Some(field_primary), Some(field_secondary)) = (field_primary, field_secondary) else {
    bail!("Both --field-primary and --field-secondary are required (or set via config/env).");
  };

  let group_a_label = args
    .group_a_label
    .clone()
    .or_else(|| env_str("JIRA_GROUP_A_LABEL"))
    .or_else(|| config.get_str("defaults.group_a_label"));
  let group_b_label = args
    .group_b_label
    .clone()
    .or_else(|| env_str("JIRA_GROUP_B_LABEL"))
    .or_else(|| config.get_str("defaults.group_b_label"));
  let other_label = args
    .label_other
    .clone()
    .or_else(|| env_str("JIRA_LABEL_OTHER"))
    .or_else(|| config.get_str("defaults.label_other"));
  let (Some(group_a_label), Some(group_b_label), Some(other_label)) = (group_a_label, group_b_label, other_label)
  else {
    bail!("Labels for group A, group B, and other are required (set via flags, env, or config).");
  };

  let group_a_keywords = resolve_keywords(
    config.get("defaults.group_a_keywords"),
    env_str("JIRA_GROUP_A_KEYWORDS").as_deref(),
    &args.group_a_keywords,
  );
  let group_b_keywords = resolve_keywords(
    config.get("defaults.group_b_keywords"),
    env_str("JIRA_GROUP_B_KEYWORDS").as_deref(),
    &args.group_b_keywords,
  );

  let keys = read_issue_keys(&args.issues, args.file.as_deref())?;
  let (rt, service) = create_jira_runtime_and_service(config, args.timeout)?;

  let field_names = vec![field_primary.clone(), field_secondary.clone()];
  let (reports, failures) = rt.block_on(service.fetch_issue_fields(&keys, &field_names))?;

  if !failures.is_empty() {
    for (key, message) in &failures {
      print_error(&format!("{key}: {message}"));
    }
  }
  if reports.is_empty() {
    bail!("No issue details fetched.");
  }

  let mut grouped: Vec<(&str, Vec<GroupedEntry>)> = vec![
    (group_a_label.as_str(), Vec::new()),
    (group_b_label.as_str(), Vec::new()),
    (other_label.as_str(), Vec::new()),
  ];
  let match_groups: [(&str, &[String]); 2] = [
    (group_a_label.as_str(), &group_a_keywords),
    (group_b_label.as_str(), &group_b_keywords),
  ];
  for report in &reports {
    let primary = normalize_value(report.fields.get(&field_primary).and_then(|v| v.as_ref()));
    let secondary = normalize_value(report.fields.get(&field_secondary).and_then(|v| v.as_ref()));
    let label = categorize(secondary.as_deref(), &match_groups, other_label.as_str());
    let entry = GroupedEntry {
      key: report.key.clone(),
      url: report.url.clone(),
      primary,
      secondary,
    };
    if let Some((_, entries)) = grouped.iter_mut().find(|(name, _)| *name == label) {
      entries.push(entry);
    }
  }

  if let Some(output) = &args.output {
    let rendered = match args.format {
      ExportFormat::Txt => render_txt(&grouped, &field_primary, &field_secondary),
      ExportFormat::Csv => render_csv(&grouped, &field_primary, &field_secondary),
    };
    fs::write(output, rendered).with_context(|| format!("Failed to write {}", output.display()))?;
    print_success(&format!("Wrote {}", output.display()));
    return Ok(());
  }

  println!("Fetched {} issues.", reports.len());
  for (label, entries) in &grouped {
    if entries.is_empty() {
      continue;
    }
    print_header(label);
    for entry in entries {
      println!("- {}", entry.primary.as_deref().unwrap_or(NO_VALUE));
    }
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn s(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
  }

  #[test]
  fn test_resolve_keywords_merges_and_lowercases() {
    let config = json!(["MySQL", "Maria"]);
    let keywords = resolve_keywords(Some(&config), Some("Percona"), &["Aurora,RDS".to_string()]);
    assert_eq!(keywords, vec!["mysql", "maria", "percona", "aurora", "rds"]);
  }

  #[test]
  fn test_categorize_matches_in_group_order() {
    let a_keywords = s(&["mysql", "maria"]);
    let b_keywords = s(&["postgres"]);
    let groups: [(&str, &[String]); 2] = [("A", &a_keywords), ("B", &b_keywords)];

    assert_eq!(categorize(Some("MariaDB 10.6"), &groups, "Other"), "A");
    assert_eq!(categorize(Some("PostgreSQL 16"), &groups, "Other"), "B");
    assert_eq!(categorize(Some("Oracle"), &groups, "Other"), "Other");
    assert_eq!(categorize(None, &groups, "Other"), "Other");
  }

  #[test]
  fn test_normalize_value_joins_arrays() {
    assert_eq!(
      normalize_value(Some(&json!(["db01", "db02"]))).as_deref(),
      Some("db01, db02")
    );
    assert_eq!(normalize_value(Some(&json!("  text "))).as_deref(), Some("text"));
    assert_eq!(normalize_value(Some(&json!(null))), None);
    assert_eq!(normalize_value(None), None);
  }

  fn sample_grouped() -> Vec<(&'static str, Vec<GroupedEntry>)> {
    vec![
      (
        "MySQL",
        vec![GroupedEntry {
          key: "OPS-1".to_string(),
          url: "https://jira.example.com/browse/OPS-1".to_string(),
          primary: Some("db01, db02".to_string()),
          secondary: Some("MariaDB".to_string()),
        }],
      ),
      ("Other", Vec::new()),
    ]
  }

  #[test]
  fn test_render_txt_skips_empty_groups() {
    let rendered = render_txt(&sample_grouped(), "FQDN", "DB Type");
    assert!(rendered.starts_with("Total issues: 1"));
    assert!(rendered.contains("MySQL:"));
    assert!(rendered.contains("- OPS-1: FQDN=db01, db02; DB Type=MariaDB"));
    assert!(!rendered.contains("Other:"));
  }

  #[test]
  fn test_render_csv_quotes_embedded_commas() {
    let rendered = render_csv(&sample_grouped(), "FQDN", "DB Type");
    assert!(rendered.starts_with("parameter_name,parameter_value"));
    assert!(rendered.contains("key,OPS-1"));
    assert!(rendered.contains("FQDN,\"db01, db02\""));
    assert!(rendered.contains("group,MySQL"));
  }
}
