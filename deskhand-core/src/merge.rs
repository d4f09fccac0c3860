//! # Default Merging Helpers
//!
//! Batch commands take their label lists and field assignments from three
//! sources: the config file's `defaults` block, a raw environment string,
//! and repeatable CLI flags. Config values come first, then env tokens, then
//! flags, so later sources can extend (labels) or override (fields) earlier
//! ones.

use std::collections::BTreeMap;

use serde_json::Value;

/// Split a comma-separated string into trimmed, non-empty tokens.
pub fn split_tokens(raw: &str) -> Vec<String> {
  raw
    .split(',')
    .map(str::trim)
    .filter(|token| !token.is_empty())
    .map(String::from)
    .collect()
}

/// Parse `NAME=VALUE` entries; entries without `=` or with an empty name are
/// dropped.
pub fn parse_field_assignments<'a, I>(raw_values: I) -> BTreeMap<String, String>
where
  I: IntoIterator<Item = &'a str>,
{
  let mut assignments = BTreeMap::new();
  for raw in raw_values {
    let Some((key, value)) = raw.split_once('=') else {
      continue;
    };
    let key = key.trim();
    if key.is_empty() {
      continue;
    }
    assignments.insert(key.to_string(), value.trim().to_string());
  }
  assignments
}

/// Merge a label list from config default, env string, and CLI flags.
pub fn merge_labels(config_value: Option<&Value>, env_raw: Option<&str>, cli_values: &[String]) -> Vec<String> {
  let mut merged: Vec<String> = Vec::new();
  match config_value {
    Some(Value::Array(items)) => {
      merged.extend(
        items
          .iter()
          .filter_map(value_to_string)
          .filter(|s| !s.is_empty()),
      );
    }
    Some(value) => {
      if let Some(s) = value_to_string(value) {
        merged.extend(split_tokens(&s));
      }
    }
    None => {}
  }
  if let Some(raw) = env_raw {
    merged.extend(split_tokens(raw));
  }
  merged.extend(cli_values.iter().filter(|v| !v.is_empty()).cloned());
  merged.retain(|value| !value.is_empty());
  merged
}

/// Merge field assignments from config default, env string, and CLI flags.
/// Later sources override earlier ones per field name.
pub fn merge_fields(
  config_value: Option<&Value>,
  env_raw: Option<&str>,
  cli_values: &[String],
) -> BTreeMap<String, String> {
  let mut merged = BTreeMap::new();
  match config_value {
    Some(Value::Object(map)) => {
      for (key, value) in map {
        if key.trim().is_empty() {
          continue;
        }
        if let Some(s) = value_to_string(value) {
          merged.insert(key.clone(), s);
        }
      }
    }
    Some(value) => {
      if let Some(s) = value_to_string(value) {
        let tokens = split_tokens(&s);
        merged.extend(parse_field_assignments(tokens.iter().map(String::as_str)));
      }
    }
    None => {}
  }
  if let Some(raw) = env_raw {
    let tokens = split_tokens(raw);
    merged.extend(parse_field_assignments(tokens.iter().map(String::as_str)));
  }
  merged.extend(parse_field_assignments(cli_values.iter().map(String::as_str)));
  merged
}

fn value_to_string(value: &Value) -> Option<String> {
  match value {
    Value::String(s) => Some(s.trim().to_string()),
    Value::Number(n) => Some(n.to_string()),
    Value::Bool(b) => Some(b.to_string()),
    _ => None,
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn test_split_tokens() {
    assert_eq!(split_tokens("a, b ,,c"), vec!["a", "b", "c"]);
    assert!(split_tokens("").is_empty());
    assert!(split_tokens(" , ").is_empty());
  }

  #[test]
  fn test_parse_field_assignments() {
    let parsed = parse_field_assignments(["Team=SRE", "no-equals", " =empty", "Env = prod "]);
    assert_eq!(parsed.get("Team").map(String::as_str), Some("SRE"));
    assert_eq!(parsed.get("Env").map(String::as_str), Some("prod"));
    assert_eq!(parsed.len(), 2);
  }

  #[test]
  fn test_merge_labels_all_sources() {
    let config = json!(["from-config", " padded "]);
    let merged = merge_labels(Some(&config), Some("from-env,also-env"), &["from-cli".to_string()]);
    assert_eq!(merged, vec!["from-config", "padded", "from-env", "also-env", "from-cli"]);
  }

  #[test]
  fn test_merge_labels_scalar_config_is_split() {
    let config = json!("one,two");
    let merged = merge_labels(Some(&config), None, &[]);
    assert_eq!(merged, vec!["one", "two"]);
  }

  #[test]
  fn test_merge_fields_later_sources_override() {
    let config = json!({"Team": "config-team", "Env": "staging"});
    let merged = merge_fields(
      Some(&config),
      Some("Team=env-team"),
      &["Env=prod".to_string()],
    );
    assert_eq!(merged.get("Team").map(String::as_str), Some("env-team"));
    assert_eq!(merged.get("Env").map(String::as_str), Some("prod"));
  }
}
