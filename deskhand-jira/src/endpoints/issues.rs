//! # Jira Issue Endpoints
//!
//! Issue retrieval, paginated JQL search, field updates, and assignment.

use reqwest::Method;
use serde_json::{Value, json};
use tracing::debug;

use deskhand_core::Result;

use crate::client::JiraClient;
use crate::models::{Issue, SearchResults};

/// Page size for paginated JQL searches.
pub const SEARCH_PAGE_SIZE: usize = 50;

impl JiraClient {
  /// Get a Jira issue by key, with all fields.
  pub async fn get_issue(&self, issue_key: &str) -> Result<Issue> {
    let builder = self
      .request(Method::GET, &format!("/rest/api/2/issue/{issue_key}"))
      .query(&[("fields", "*all")]);
    self.send_json(builder).await
  }

  /// Fetch one page of search results.
  pub async fn search_page(&self, jql: &str, start_at: usize, max_results: usize) -> Result<SearchResults> {
    let builder = self.request(Method::GET, "/rest/api/2/search").query(&[
      ("jql", jql.to_string()),
      ("startAt", start_at.to_string()),
      ("maxResults", max_results.to_string()),
      ("fields", "*all".to_string()),
    ]);
    self.send_json(builder).await
  }

  /// Search issues by JQL, paginating with an offset until a page comes back
  /// short or `max_results` issues have been collected.
  pub async fn search_issues(&self, jql: &str, max_results: usize) -> Result<Vec<Issue>> {
    let mut collected: Vec<Issue> = Vec::new();
    let mut start_at = 0;
    while collected.len() < max_results {
      let page_size = SEARCH_PAGE_SIZE.min(max_results - collected.len());
      let page = self.search_page(jql, start_at, page_size).await?;
      let count = page.issues.len();
      debug!(jql, start_at, count, "search page fetched");
      collected.extend(page.issues);
      if count < page_size {
        break;
      }
      start_at += count;
    }
    Ok(collected)
  }

  /// Update issue fields with a single PUT.
  pub async fn update_issue_fields(&self, issue_key: &str, fields: &Value) -> Result<()> {
    let builder = self
      .request(Method::PUT, &format!("/rest/api/2/issue/{issue_key}"))
      .json(&json!({ "fields": fields }));
    self.send(builder).await?;
    Ok(())
  }

  /// Assign an issue to an account id.
  pub async fn assign_issue(&self, issue_key: &str, account_id: &str) -> Result<()> {
    let builder = self
      .request(Method::PUT, &format!("/rest/api/2/issue/{issue_key}/assignee"))
      .json(&json!({ "accountId": account_id }));
    self.send(builder).await?;
    Ok(())
  }
}
