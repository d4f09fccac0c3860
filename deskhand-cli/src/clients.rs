//! # Client Creation
//!
//! Centralized client creation for the Jira and Confluence services. Each
//! helper resolves connection settings from flags, environment, and the
//! config file, builds the client, and validates credentials with a
//! connect check before handing it back alongside the runtime that drives it.

use anyhow::{Context, Result};
use tokio::runtime::Runtime;

use deskhand_confluence::{ConfluenceClient, ConfluenceService};
use deskhand_core::{Config, ConfluenceSettings, JiraSettings};
use deskhand_jira::{JiraClient, JiraService};

/// Creates a tokio runtime and a connected Jira service.
pub fn create_jira_runtime_and_service(config: &Config, timeout_flag: Option<u64>) -> Result<(Runtime, JiraService)> {
  let rt = Runtime::new().context("Failed to create async runtime")?;
  let settings = JiraSettings::resolve(config, timeout_flag)?;
  let client = JiraClient::new(&settings).context("Failed to create Jira client")?;
  rt.block_on(client.connect())
    .with_context(|| format!("Failed to connect to Jira at {}", settings.base_url))?;
  Ok((rt, JiraService::new(client)))
}

/// Creates a tokio runtime and a connected Confluence service.
pub fn create_confluence_runtime_and_service(
  config: &Config,
  timeout_flag: Option<u64>,
) -> Result<(Runtime, ConfluenceService)> {
  let rt = Runtime::new().context("Failed to create async runtime")?;
  let settings = ConfluenceSettings::resolve(config, timeout_flag)?;
  let client = ConfluenceClient::new(&settings).context("Failed to create Confluence client")?;
  rt.block_on(client.connect())
    .with_context(|| format!("Failed to connect to Confluence at {}", settings.base_url))?;
  Ok((rt, ConfluenceService::new(client)))
}

/// Creates a connected Jira service on an existing runtime, for commands that
/// talk to both services.
pub fn create_jira_service_on(rt: &Runtime, config: &Config, timeout_flag: Option<u64>) -> Result<JiraService> {
  let settings = JiraSettings::resolve(config, timeout_flag)?;
  let client = JiraClient::new(&settings).context("Failed to create Jira client")?;
  rt.block_on(client.connect())
    .with_context(|| format!("Failed to connect to Jira at {}", settings.base_url))?;
  Ok(JiraService::new(client))
}
