//! JQL clause construction for the listing commands.

/// Quote a JQL value, escaping backslashes and double quotes.
pub fn quote(value: &str) -> String {
  let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
  format!("\"{escaped}\"")
}

/// Build the OR group of status equality clauses, or `None` when no statuses
/// were requested.
pub fn status_clause(statuses: &[String]) -> Option<String> {
  if statuses.is_empty() {
    return None;
  }
  let clauses: Vec<String> = statuses.iter().map(|status| format!("status = {}", quote(status))).collect();
  Some(format!("({})", clauses.join(" OR ")))
}

/// Build the listing query: project clause, optional queue clause, optional
/// status OR group, newest first.
///
/// The open-issue guard (`statusCategory != Done`) is only injected when
/// neither a status set nor a queue clause narrows the query. Explicit
/// statuses replace it so closed statuses can still be listed, and a queue's
/// stored JQL already encodes which issues belong in the queue, resolved ones
/// included.
pub fn build_list_jql(project: &str, queue_clause: Option<&str>, statuses: &[String]) -> String {
  let mut clauses = vec![format!("project = {}", quote(project))];
  if statuses.is_empty() && queue_clause.is_none() {
    clauses.push("statusCategory != Done".to_string());
  }
  if let Some(queue) = queue_clause {
    let stripped = strip_order_by(queue).trim();
    if !stripped.is_empty() {
      clauses.push(format!("({stripped})"));
    }
  }
  if let Some(status_group) = status_clause(statuses) {
    clauses.push(status_group);
  }
  format!("{} ORDER BY created DESC", clauses.join(" AND "))
}

/// Drop a trailing `ORDER BY` from a queue's stored JQL so it can be ANDed
/// into a larger query.
fn strip_order_by(clause: &str) -> &str {
  // ASCII lowercasing keeps byte offsets aligned with the original clause;
  // Unicode case mapping can change byte lengths.
  let lowered = clause.to_ascii_lowercase();
  match lowered.find(" order by ") {
    Some(idx) => &clause[..idx],
    None => clause,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_quote_escapes() {
    assert_eq!(quote("Waiting for support"), "\"Waiting for support\"");
    assert_eq!(quote("say \"hi\""), "\"say \\\"hi\\\"\"");
  }

  #[test]
  fn test_build_list_jql_contains_all_clauses() {
    let statuses = vec!["Open".to_string(), "Waiting".to_string()];
    let jql = build_list_jql("P", Some("filter = 42"), &statuses);

    assert!(jql.contains("project = \"P\""));
    assert!(jql.contains("(filter = 42)"));
    assert!(jql.contains("(status = \"Open\" OR status = \"Waiting\")"));
    assert!(jql.ends_with("ORDER BY created DESC"));
  }

  #[test]
  fn test_build_list_jql_without_statuses_keeps_open_guard() {
    let jql = build_list_jql("OPS", None, &[]);
    assert_eq!(
      jql,
      "project = \"OPS\" AND statusCategory != Done ORDER BY created DESC"
    );
  }

  #[test]
  fn test_queue_clause_order_by_is_stripped() {
    let jql = build_list_jql("P", Some("assignee = currentUser() ORDER BY priority"), &[]);
    assert!(jql.contains("(assignee = currentUser())"));
    assert!(!jql.contains("ORDER BY priority"));
  }

  #[test]
  fn test_queue_clause_suppresses_open_guard() {
    // A queue's stored JQL may select resolved issues; the open-issue guard
    // would filter them out server-side before any client-side filtering.
    let jql = build_list_jql("OPS", Some("filter = 9"), &[]);
    assert_eq!(jql, "project = \"OPS\" AND (filter = 9) ORDER BY created DESC");
  }

  #[test]
  fn test_queue_clause_with_statuses_ands_status_group() {
    let jql = build_list_jql("OPS", Some("filter = 9"), &s(&["Resolved"]));
    assert_eq!(
      jql,
      "project = \"OPS\" AND (filter = 9) AND (status = \"Resolved\") ORDER BY created DESC"
    );
  }

  #[test]
  fn test_strip_order_by_with_multibyte_text() {
    // 'İ' lowercases to a longer byte sequence under full Unicode mapping;
    // the slice index must still line up with the original clause.
    let jql = build_list_jql("P", Some("summary ~ \"İstanbul\" ORDER BY created"), &[]);
    assert!(jql.contains("(summary ~ \"İstanbul\")"));
    assert!(!jql.contains("ORDER BY created ORDER BY"));
  }

  fn s(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
  }
}
