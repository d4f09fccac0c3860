//! # Monitoring Dependencies Command
//!
//! Fetches the monitoring dependency custom fields for a batch of issues and
//! groups the reported hostnames by database flavor.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Args;
use serde_json::Value;

use deskhand_core::{Config, print_error, print_header, read_issue_keys};

use crate::clients::create_jira_runtime_and_service;

/// Display name of the FQDN custom field.
const FIELD_FQDN: &str = "Monitoring Dependencies (FQDN)";

/// Display name of the database-type custom field.
const FIELD_DB_TYPE: &str = "Monitoring Dependencies (DB Type)";

const GROUP_MYSQL: &str = "MySQL/MariaDB";
const GROUP_POSTGRES: &str = "PostgreSQL";
const GROUP_OTHER: &str = "Other/Unknown";

/// Arguments for the monitoring-deps command
#[derive(Args)]
pub struct MonitoringDepsArgs {
  /// Issue keys or browse URLs
  #[arg(value_name = "ISSUE")]
  pub issues: Vec<String>,

  /// File with one issue key or URL per line
  #[arg(long, short = 'f', value_name = "PATH")]
  pub file: Option<PathBuf>,

  /// Request timeout in seconds
  #[arg(long)]
  pub timeout: Option<u64>,
}

/// Map a raw database-type value onto a report group.
fn db_group(db_type: Option<&str>) -> &'static str {
  let Some(raw) = db_type else {
    return GROUP_OTHER;
  };
  let lowered = raw.to_lowercase();
  if lowered.contains("mysql") || lowered.contains("maria") {
    GROUP_MYSQL
  } else if lowered.contains("postgres") {
    GROUP_POSTGRES
  } else {
    GROUP_OTHER
  }
}

/// Flatten a field value into hostname tokens. Values arrive as strings,
/// option objects with a `value` key, or arrays of either.
fn fqdn_tokens(value: &Value) -> Vec<String> {
  match value {
    Value::String(s) => s
      .split([',', '\n', ' '])
      .map(str::trim)
      .filter(|token| !token.is_empty())
      .map(String::from)
      .collect(),
    Value::Array(items) => items.iter().flat_map(fqdn_tokens).collect(),
    Value::Object(map) => map.get("value").map(fqdn_tokens).unwrap_or_default(),
    _ => Vec::new(),
  }
}

/// Scalar rendering of a field value, for the DB type.
fn scalar_value(value: &Value) -> Option<String> {
  match value {
    Value::String(s) if !s.is_empty() => Some(s.clone()),
    Value::Object(map) => map.get("value").and_then(scalar_value),
    Value::Array(items) => items.first().and_then(scalar_value),
    _ => None,
  }
}

pub(crate) fn handle_monitoring_deps_command(config: &Config, args: MonitoringDepsArgs) -> Result<()> {
  let keys = read_issue_keys(&args.issues, args.file.as_deref())?;
  let (rt, service) = create_jira_runtime_and_service(config, args.timeout)?;

  let field_names = vec![FIELD_FQDN.to_string(), FIELD_DB_TYPE.to_string()];
  let (reports, failures) = rt.block_on(service.fetch_issue_fields(&keys, &field_names))?;

  // group -> (fqdn, issue key) entries, in report order
  let mut groups: BTreeMap<&'static str, Vec<(String, String)>> = BTreeMap::new();
  for report in &reports {
    let db_type = report
      .fields
      .get(FIELD_DB_TYPE)
      .and_then(|v| v.as_ref())
      .and_then(scalar_value);
    let group = db_group(db_type.as_deref());
    let fqdns = report
      .fields
      .get(FIELD_FQDN)
      .and_then(|v| v.as_ref())
      .map(fqdn_tokens)
      .unwrap_or_default();
    if fqdns.is_empty() {
      groups
        .entry(GROUP_OTHER)
        .or_default()
        .push(("<no FQDN>".to_string(), report.key.clone()));
      continue;
    }
    for fqdn in fqdns {
      groups.entry(group).or_default().push((fqdn, report.key.clone()));
    }
  }

  for group in [GROUP_MYSQL, GROUP_POSTGRES, GROUP_OTHER] {
    let Some(entries) = groups.get(group) else {
      continue;
    };
    print_header(group);
    for (fqdn, key) in entries {
      println!("  {fqdn} ({key})");
    }
  }

  if !failures.is_empty() {
    for (key, message) in &failures {
      print_error(&format!("{key}: {message}"));
    }
    bail!("{} issue(s) failed to load", failures.len());
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn test_db_group_classification() {
    assert_eq!(db_group(Some("MySQL 8")), GROUP_MYSQL);
    assert_eq!(db_group(Some("MariaDB")), GROUP_MYSQL);
    assert_eq!(db_group(Some("PostgreSQL 16")), GROUP_POSTGRES);
    assert_eq!(db_group(Some("Oracle")), GROUP_OTHER);
    assert_eq!(db_group(None), GROUP_OTHER);
  }

  #[test]
  fn test_fqdn_tokens_from_string_and_array() {
    assert_eq!(
      fqdn_tokens(&json!("db01.example.com, db02.example.com")),
      vec!["db01.example.com", "db02.example.com"]
    );
    assert_eq!(
      fqdn_tokens(&json!(["db01.example.com", {"value": "db03.example.com"}])),
      vec!["db01.example.com", "db03.example.com"]
    );
    assert!(fqdn_tokens(&json!(null)).is_empty());
  }

  #[test]
  fn test_scalar_value_unwraps_option_objects() {
    assert_eq!(scalar_value(&json!({"value": "MySQL"})).as_deref(), Some("MySQL"));
    assert_eq!(scalar_value(&json!("PostgreSQL")).as_deref(), Some("PostgreSQL"));
    assert_eq!(scalar_value(&json!(42)), None);
  }
}
