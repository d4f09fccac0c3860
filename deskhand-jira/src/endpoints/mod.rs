//! # Jira API Endpoints
//!
//! Organized endpoint implementations for the Jira resource types deskhand
//! touches: issues, transitions, field metadata, and service-desk queues.

pub mod fields;
pub mod issues;
pub mod servicedesk;
pub mod transitions;
