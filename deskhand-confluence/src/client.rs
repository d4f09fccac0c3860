//! HTTP session wrapper for the Confluence REST API.
//!
//! Same shape as the Jira client: base URL, credentials, and timeout from
//! [`ConfluenceSettings`], non-2xx responses surfaced as [`Error::Api`] with
//! a message pulled from the response body.

use reqwest::header::ACCEPT;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use deskhand_core::{ConfluenceSettings, Error, Result};

use crate::models::{ChildPages, Page};

/// Represents a Confluence API client
pub struct ConfluenceClient {
  client: Client,
  base_url: String,
  username: String,
  password: String,
}

impl ConfluenceClient {
  /// Create a new Confluence client from resolved settings.
  pub fn new(settings: &ConfluenceSettings) -> Result<Self> {
    let client = Client::builder().timeout(settings.timeout).build()?;
    Ok(Self {
      client,
      base_url: settings.base_url.trim_end_matches('/').to_string(),
      username: settings.username.clone(),
      password: settings.password.clone(),
    })
  }

  /// The normalized base URL this client talks to.
  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  /// Validate connectivity and credentials with a minimal space listing.
  pub async fn connect(&self) -> Result<()> {
    let builder = self.request(Method::GET, "/rest/api/space").query(&[("limit", "1")]);
    self.send_json::<Value>(builder).await?;
    Ok(())
  }

  fn url(&self, path: &str) -> String {
    if path.starts_with('/') {
      format!("{}{}", self.base_url, path)
    } else {
      format!("{}/{}", self.base_url, path)
    }
  }

  /// Start a request with authentication and JSON accept header attached.
  fn request(&self, method: Method, path: &str) -> RequestBuilder {
    self
      .client
      .request(method, self.url(path))
      .basic_auth(&self.username, Some(&self.password))
      .header(ACCEPT, "application/json")
  }

  /// Send a request and surface non-2xx responses as API errors.
  async fn send(&self, builder: RequestBuilder) -> Result<Response> {
    let response = builder.send().await?;
    let status = response.status();
    if status.is_success() {
      return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(Error::api(status.as_u16(), extract_error_message(status.as_u16(), &body)))
  }

  async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
    let response = self.send(builder).await?;
    response.json::<T>().await.map_err(Error::from)
  }

  /// Get a page by id, expanding the requested representations.
  pub async fn get_page(&self, page_id: &str, expand: &str) -> Result<Page> {
    let builder = self
      .request(Method::GET, &format!("/rest/api/content/{page_id}"))
      .query(&[("expand", expand)]);
    self.send_json(builder).await
  }

  /// List child pages of a page, following `_links.next` until the listing
  /// is exhausted or `max` pages have been collected.
  pub async fn get_child_pages(&self, page_id: &str, max: Option<usize>) -> Result<Vec<Page>> {
    let mut collected: Vec<Page> = Vec::new();
    let mut next_path = format!("/rest/api/content/{page_id}/child/page");
    loop {
      let listing: ChildPages = self.send_json(self.request(Method::GET, &next_path)).await?;
      debug!(page_id, count = listing.results.len(), "child page listing fetched");
      collected.extend(listing.results);
      if let Some(max) = max
        && collected.len() >= max
      {
        collected.truncate(max);
        break;
      }
      match listing.links.next {
        Some(next) if !next.is_empty() => next_path = next,
        _ => break,
      }
    }
    Ok(collected)
  }
}

/// Pull a human-readable message out of a Confluence error body.
fn extract_error_message(status: u16, body: &str) -> String {
  if let Ok(payload) = serde_json::from_str::<Value>(body) {
    for key in ["message", "reason"] {
      if let Some(message) = payload.get(key).and_then(Value::as_str)
        && !message.is_empty()
      {
        return message.to_string();
      }
    }
  }
  format!("Confluence API call failed ({status})")
}
