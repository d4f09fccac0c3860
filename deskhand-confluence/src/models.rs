//! Wire models for the Confluence REST API.

use serde::Deserialize;

/// Represents a Confluence page, as returned by `/rest/api/content/{id}`
#[derive(Debug, Deserialize)]
pub struct Page {
  pub id: String,
  pub title: String,
  #[serde(default)]
  pub body: Option<Body>,
  #[serde(default, rename = "_links")]
  pub links: Links,
}

impl Page {
  /// Storage-format markup of the page body, when it was expanded.
  pub fn storage_value(&self) -> Option<&str> {
    self
      .body
      .as_ref()
      .and_then(|body| body.storage.as_ref())
      .map(|storage| storage.value.as_str())
  }
}

/// Page body container; only the storage representation is requested.
#[derive(Debug, Deserialize)]
pub struct Body {
  pub storage: Option<Storage>,
}

/// Storage-format representation of a page body
#[derive(Debug, Deserialize)]
pub struct Storage {
  #[serde(default)]
  pub value: String,
}

/// The `_links` object attached to pages and listings
#[derive(Debug, Default, Deserialize)]
pub struct Links {
  pub webui: Option<String>,
  pub next: Option<String>,
}

/// One page of a child-content listing
#[derive(Debug, Deserialize)]
pub struct ChildPages {
  #[serde(default)]
  pub results: Vec<Page>,
  #[serde(default, rename = "_links")]
  pub links: Links,
}
