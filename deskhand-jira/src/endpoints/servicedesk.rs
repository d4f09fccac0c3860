//! # Service Desk Endpoints
//!
//! Queue resolution through the Service Desk API: locating the service desk
//! for a project, matching a queue by id or name, and enumerating the issue
//! keys currently in a queue. Queue endpoints require the experimental-API
//! opt-in header.

use std::collections::HashSet;

use reqwest::Method;
use serde::de::DeserializeOwned;
use tracing::debug;

use deskhand_core::{Error, Result};

use crate::client::JiraClient;
use crate::models::{PagedValues, Queue, QueueInfo, QueueIssue, ServiceDesk};

/// Page size for Service Desk API listings.
pub const SERVICE_DESK_PAGE_LIMIT: usize = 50;

impl JiraClient {
  async fn servicedesk_page<T: DeserializeOwned>(&self, path: &str, start: usize, limit: usize) -> Result<PagedValues<T>> {
    let builder = self
      .request(Method::GET, path)
      .header("X-ExperimentalApi", "opt-in")
      .query(&[("start", start.to_string()), ("limit", limit.to_string())]);
    self.send_json(builder).await
  }

  /// Locate the service desk backing a project key.
  pub async fn find_service_desk_id(&self, project_key: &str) -> Result<String> {
    let mut start = 0;
    loop {
      let page: PagedValues<ServiceDesk> = self
        .servicedesk_page("/rest/servicedeskapi/servicedesk", start, SERVICE_DESK_PAGE_LIMIT)
        .await?;
      for entry in &page.values {
        if entry.project_key.as_deref() == Some(project_key) {
          return Ok(entry.id.clone());
        }
      }
      if page.is_last_page || page.values.is_empty() {
        break;
      }
      start += page.values.len();
    }
    Err(Error::NotFound(format!(
      "Unable to locate service desk for project {project_key}."
    )))
  }

  /// Resolve a queue by identifier or name within a service desk.
  ///
  /// Accepts `custom/123`, a bare numeric id, or the queue display name.
  pub async fn find_queue(&self, service_desk_id: &str, queue_identifier: &str) -> Result<QueueInfo> {
    let wanted_raw = queue_identifier.trim();
    let mut candidates: HashSet<String> = HashSet::new();
    candidates.insert(wanted_raw.to_lowercase());
    if let Some((_, tail)) = wanted_raw.rsplit_once('/') {
      candidates.insert(tail.to_lowercase());
    }
    candidates.insert(format!("custom/{wanted_raw}").to_lowercase());

    let path = format!("/rest/servicedeskapi/servicedesk/{service_desk_id}/queue");
    let mut start = 0;
    loop {
      let page: PagedValues<Queue> = self.servicedesk_page(&path, start, SERVICE_DESK_PAGE_LIMIT).await?;
      for entry in &page.values {
        let entry_id = entry.id.clone().unwrap_or_default();
        let entry_queue_id = entry.queue_id.clone().unwrap_or_else(|| entry_id.clone());
        let entry_name = entry.name.clone().unwrap_or_default().trim().to_string();
        let tokens = [
          entry_id.to_lowercase(),
          entry_queue_id.to_lowercase(),
          entry_name.to_lowercase(),
          format!("custom/{entry_queue_id}").to_lowercase(),
          format!("queue/{entry_queue_id}").to_lowercase(),
        ];
        if tokens.iter().any(|token| candidates.contains(token)) {
          debug!(queue_id = %entry_queue_id, name = %entry_name, "queue resolved");
          return Ok(QueueInfo {
            service_desk_id: service_desk_id.to_string(),
            queue_id: entry_queue_id,
            name: entry_name,
            jql: entry.jql.clone(),
          });
        }
      }
      if page.is_last_page || page.values.is_empty() {
        break;
      }
      start += page.values.len();
    }
    Err(Error::NotFound(format!(
      "Queue '{queue_identifier}' not found in service desk {service_desk_id}."
    )))
  }

  /// Enumerate up to `limit` issue keys currently in a queue.
  pub async fn queue_issue_keys(&self, service_desk_id: &str, queue_id: &str, limit: usize) -> Result<Vec<String>> {
    let path = format!("/rest/servicedeskapi/servicedesk/{service_desk_id}/queue/{queue_id}/issue");
    let mut collected: Vec<String> = Vec::new();
    let mut start = 0;
    while collected.len() < limit {
      let page_limit = SERVICE_DESK_PAGE_LIMIT.min(limit - collected.len());
      let page: PagedValues<QueueIssue> = self.servicedesk_page(&path, start, page_limit).await?;
      let count = page.values.len();
      collected.extend(page.values.into_iter().filter_map(|entry| entry.issue_key));
      if page.is_last_page || count == 0 {
        break;
      }
      start += count;
    }
    Ok(collected)
  }
}
