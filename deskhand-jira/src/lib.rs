//! # Jira API Client
//!
//! Jira REST API integration for the deskhand automation commands: issue
//! search and retrieval, status transitions, field and label updates, field
//! metadata resolution, and service-desk queue access, plus the
//! issue-tracker service layer the CLI calls into.

mod client;
mod endpoints;
pub mod jql;
pub mod models;
pub mod service;

// Re-export the client and service
pub use client::JiraClient;
pub use models::{FieldInfo, Issue, IssueFields, IssueStatus, QueueInfo, Transition};
pub use service::{IssueFieldReport, JiraService, ListOptions, TransitionOutcome, merge_labels};
