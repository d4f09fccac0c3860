//! # List Issues Command
//!
//! Lists open issues for a project or service-desk queue and prints one
//! browse URL per issue, with separators marking each fifth of the list.

use anyhow::{Result, bail};
use clap::Args;

use deskhand_core::config::resolve_env_or_config_str;
use deskhand_core::{Config, print_info, print_warning};
use deskhand_jira::ListOptions;

use crate::clients::create_jira_runtime_and_service;

/// Default cap on the number of issues listed.
const DEFAULT_MAX_RESULTS: u64 = 200;

/// Arguments for the list-issues command
#[derive(Args)]
pub struct ListIssuesArgs {
  /// Project key (default: $JIRA_PROJECT or defaults.project)
  #[arg(long, short = 'p')]
  pub project: Option<String>,

  /// Service-desk queue id or name (default: $JIRA_QUEUE_ID or defaults.queue_id)
  #[arg(long)]
  pub queue_id: Option<String>,

  /// Service-desk id, when already known (default: $JIRA_SERVICE_DESK_ID)
  #[arg(long)]
  pub service_desk_id: Option<String>,

  /// Search with plain JQL even when a queue is configured
  #[arg(long)]
  pub use_jql: bool,

  /// Status to include; repeatable (default: defaults.list_statuses)
  #[arg(long = "status", value_name = "STATUS")]
  pub statuses: Vec<String>,

  /// Maximum number of issues to list
  #[arg(long)]
  pub max_results: Option<u64>,

  /// Request timeout in seconds
  #[arg(long)]
  pub timeout: Option<u64>,
}

pub(crate) fn handle_list_issues_command(config: &Config, args: ListIssuesArgs) -> Result<()> {
  let Some(project) = args
    .project
    .or_else(|| resolve_env_or_config_str("JIRA_PROJECT", config, "defaults.project"))
  else {
    bail!("No project given. Use --project, JIRA_PROJECT, or defaults.project in the config file.");
  };
  let queue = args
    .queue_id
    .or_else(|| resolve_env_or_config_str("JIRA_QUEUE_ID", config, "defaults.queue_id"));
  let service_desk_id = args
    .service_desk_id
    .or_else(|| resolve_env_or_config_str("JIRA_SERVICE_DESK_ID", config, "defaults.service_desk_id"));
  let statuses = if args.statuses.is_empty() {
    config.get_str_list("defaults.list_statuses").unwrap_or_default()
  } else {
    args.statuses
  };
  let max_results = args
    .max_results
    .or_else(|| config.get_u64("defaults.max_results"))
    .unwrap_or(DEFAULT_MAX_RESULTS) as usize;

  let (rt, service) = create_jira_runtime_and_service(config, args.timeout)?;

  let options = ListOptions {
    project,
    max_results,
    queue,
    service_desk_id,
    use_jql: args.use_jql,
    statuses,
  };
  let (issues, queue_info) = rt.block_on(service.list_issues(&options))?;

  if let Some(queue_info) = queue_info {
    print_info(&format!("Queue: {} (id {})", queue_info.name, queue_info.queue_id));
  }
  if issues.is_empty() {
    print_warning("No matching issues found.");
    return Ok(());
  }

  // A separator at each fifth of the list makes long listings scannable.
  let chunk = (issues.len() + 4) / 5;
  for (index, issue) in issues.iter().enumerate() {
    if index > 0 && chunk > 0 && index % chunk == 0 {
      println!("-----");
    }
    println!("{}", service.issue_url(&issue.key));
  }
  print_info(&format!("{} issue(s).", issues.len()));
  Ok(())
}
