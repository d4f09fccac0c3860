//! # Wiki Content Service
//!
//! The operations the CLI wiki commands call into: resolving the set of
//! target pages (a single page or the children of one), fetching their
//! storage bodies, and running the content extractors over each.

use tracing::debug;

use deskhand_core::Result;

use crate::client::ConfluenceClient;
use crate::content::{extract_heading_section, extract_macro_contents, page_url};
use crate::models::Page;

/// Which pages a wiki command operates on.
#[derive(Debug, Clone)]
pub struct PageTarget {
  /// Root page id.
  pub page_id: String,
  /// Operate on the root's children instead of the root itself.
  pub children: bool,
  /// Cap on the number of child pages, when set.
  pub max_children: Option<usize>,
}

/// Extracted content for one page.
#[derive(Debug)]
pub struct PageContent {
  pub id: String,
  pub title: String,
  pub url: String,
  /// Markup under the requested heading, when a heading was requested and
  /// found.
  pub section: Option<String>,
  /// Bodies of the requested macro, in document order.
  pub macros: Vec<String>,
}

/// High-level wiki operations built on [`ConfluenceClient`].
pub struct ConfluenceService {
  client: ConfluenceClient,
}

impl ConfluenceService {
  pub fn new(client: ConfluenceClient) -> Self {
    Self { client }
  }

  pub fn client(&self) -> &ConfluenceClient {
    &self.client
  }

  /// Resolve the target page ids and titles, without bodies.
  pub async fn fetch_targets(&self, target: &PageTarget) -> Result<Vec<(String, String)>> {
    if target.children {
      let children = self.client.get_child_pages(&target.page_id, target.max_children).await?;
      return Ok(children.into_iter().map(|page| (page.id, page.title)).collect());
    }
    let page = self.client.get_page(&target.page_id, "body.storage").await?;
    Ok(vec![(page.id, page.title)])
  }

  /// Fetch each target page with its storage body and run the extractors.
  ///
  /// Pages that fail to load are collected as `(id, message)` pairs instead
  /// of aborting the batch. Passing neither a heading nor a macro name keeps
  /// the page entries with empty extraction results, which the page-listing
  /// command uses.
  pub async fn fetch_pages_with_content(
    &self,
    target: &PageTarget,
    heading: Option<&str>,
    macro_name: Option<&str>,
  ) -> Result<(Vec<PageContent>, Vec<(String, String)>)> {
    let targets = self.fetch_targets(target).await?;
    debug!(count = targets.len(), "wiki targets resolved");

    let mut contents = Vec::with_capacity(targets.len());
    let mut failures = Vec::new();
    for (id, _) in targets {
      let page = match self.client.get_page(&id, "body.storage").await {
        Ok(page) => page,
        Err(err) => {
          failures.push((id, err.to_string()));
          continue;
        }
      };
      contents.push(self.page_content(&page, heading, macro_name));
    }
    Ok((contents, failures))
  }

  fn page_content(&self, page: &Page, heading: Option<&str>, macro_name: Option<&str>) -> PageContent {
    let storage = page.storage_value().unwrap_or_default();
    let section = heading.and_then(|h| extract_heading_section(storage, h));
    let macros = macro_name.map(|name| extract_macro_contents(storage, name)).unwrap_or_default();
    PageContent {
      id: page.id.clone(),
      title: page.title.clone(),
      url: page_url(self.client.base_url(), page.links.webui.as_deref()),
      section,
      macros,
    }
  }
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use wiremock::matchers::{method, path};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  use deskhand_core::ConfluenceSettings;

  use super::*;

  async fn test_service(mock_server: &MockServer) -> ConfluenceService {
    let settings = ConfluenceSettings {
      base_url: mock_server.uri(),
      username: "test_user".to_string(),
      password: "test_token".to_string(),
      timeout: Duration::from_secs(10),
    };
    ConfluenceService::new(ConfluenceClient::new(&settings).expect("client should build"))
  }

  fn page_body(id: &str, title: &str, storage: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "title": title,
        "body": {"storage": {"value": storage}},
        "_links": {"webui": format!("/spaces/OPS/pages/{id}")}
    })
  }

  #[tokio::test]
  async fn test_single_page_heading_extraction() -> anyhow::Result<()> {
    let mock_server = MockServer::start().await;
    let service = test_service(&mock_server).await;

    Mock::given(method("GET"))
      .and(path("/rest/api/content/1"))
      .respond_with(
        ResponseTemplate::new(200)
          .set_body_json(page_body("1", "Runbooks", "<h2>Call Center</h2><p>dial 0</p><h2>Other</h2>")),
      )
      .mount(&mock_server)
      .await;

    let target = PageTarget {
      page_id: "1".to_string(),
      children: false,
      max_children: None,
    };
    let (contents, failures) = service
      .fetch_pages_with_content(&target, Some("Call Center"), None)
      .await?;
    assert!(failures.is_empty());
    assert_eq!(contents.len(), 1);
    assert_eq!(contents[0].section.as_deref(), Some("<p>dial 0</p>"));
    assert!(contents[0].url.ends_with("/spaces/OPS/pages/1"));
    Ok(())
  }

  #[tokio::test]
  async fn test_children_with_macro_extraction_and_failures() -> anyhow::Result<()> {
    let mock_server = MockServer::start().await;
    let service = test_service(&mock_server).await;

    Mock::given(method("GET"))
      .and(path("/rest/api/content/1/child/page"))
      .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
          "results": [{"id": "2", "title": "Good"}, {"id": "3", "title": "Gone"}],
          "_links": {}
      })))
      .mount(&mock_server)
      .await;
    Mock::given(method("GET"))
      .and(path("/rest/api/content/2"))
      .respond_with(ResponseTemplate::new(200).set_body_json(page_body(
        "2",
        "Good",
        r#"<ac:structured-macro ac:name="code"><ac:plain-text-body>SELECT 1</ac:plain-text-body></ac:structured-macro>"#,
      )))
      .mount(&mock_server)
      .await;
    Mock::given(method("GET"))
      .and(path("/rest/api/content/3"))
      .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
          "message": "No content found with id: 3"
      })))
      .mount(&mock_server)
      .await;

    let target = PageTarget {
      page_id: "1".to_string(),
      children: true,
      max_children: None,
    };
    let (contents, failures) = service.fetch_pages_with_content(&target, None, Some("code")).await?;
    assert_eq!(contents.len(), 1);
    assert_eq!(contents[0].macros.len(), 1);
    assert!(contents[0].macros[0].contains("SELECT 1"));
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, "3");
    Ok(())
  }
}
