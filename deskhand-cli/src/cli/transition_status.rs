//! # Transition Status Command
//!
//! Moves a batch of issues to a target status, skipping issues that are
//! already there or that fail the optional only-from guard.

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Args;

use deskhand_core::config::resolve_env_or_config_str;
use deskhand_core::{Config, read_issue_keys};

use crate::cli::batch::BatchSummary;
use crate::clients::create_jira_runtime_and_service;

/// Arguments for the transition-status command
#[derive(Args)]
pub struct TransitionStatusArgs {
  /// Issue keys or browse URLs
  #[arg(value_name = "ISSUE")]
  pub issues: Vec<String>,

  /// File with one issue key or URL per line
  #[arg(long, short = 'f', value_name = "PATH")]
  pub file: Option<PathBuf>,

  /// Only transition issues currently in this status (default: $JIRA_ONLY_STATUS)
  #[arg(long)]
  pub only_status: Option<String>,

  /// Status to transition to (default: $JIRA_TARGET_STATUS)
  #[arg(long)]
  pub target_status: Option<String>,

  /// Request timeout in seconds
  #[arg(long)]
  pub timeout: Option<u64>,
}

pub(crate) fn handle_transition_status_command(config: &Config, args: TransitionStatusArgs) -> Result<()> {
  let only_status = args
    .only_status
    .or_else(|| resolve_env_or_config_str("JIRA_ONLY_STATUS", config, "defaults.only_status"));
  let Some(target_status) = args
    .target_status
    .or_else(|| resolve_env_or_config_str("JIRA_TARGET_STATUS", config, "defaults.target_status"))
  else {
    bail!("No target status given. Use --target-status, JIRA_TARGET_STATUS, or defaults.target_status.");
  };

  let keys = read_issue_keys(&args.issues, args.file.as_deref())?;
  let (rt, service) = create_jira_runtime_and_service(config, args.timeout)?;

  let mut summary = BatchSummary::new();
  for key in &keys {
    println!("Processing {key} ({})", service.issue_url(key));
    match rt.block_on(service.transition_issue(key, only_status.as_deref(), &target_status)) {
      Ok(outcome) if outcome.changed => {
        println!(
          "- Status: {} -> {}",
          outcome.before.as_deref().unwrap_or("?"),
          outcome.after.as_deref().unwrap_or(&target_status)
        );
        summary.record_updated();
      }
      Ok(outcome) => {
        let current = outcome.before.as_deref().unwrap_or("?");
        match only_status.as_deref() {
          Some(only) if !current.eq_ignore_ascii_case(only) => {
            println!("- Skipped: status is '{current}', needed '{only}'.");
          }
          _ => println!("- Skipped: already '{current}'."),
        }
        summary.record_skipped();
      }
      Err(err) => {
        println!("- Failed: {err}");
        summary.record_failure(key, err.to_string());
      }
    }
  }
  summary.finish("issue", true)
}
