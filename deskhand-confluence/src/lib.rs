//! # Confluence API Client
//!
//! Confluence REST API integration for the deskhand wiki commands: page
//! retrieval with storage-format bodies, child-page traversal, and the
//! content-extraction helpers that pull heading sections and macro bodies out
//! of storage-format markup.

mod client;

pub mod content;
pub mod models;
pub mod service;

// Re-export the client and service
pub use client::ConfluenceClient;
pub use content::{extract_heading_section, extract_macro_contents, extract_page_id, page_url, parse_macro_params};
pub use models::Page;
pub use service::{ConfluenceService, PageContent, PageTarget};
