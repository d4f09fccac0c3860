//! # Field Id Command
//!
//! Looks up Jira field ids by display name, exact or substring match.

use anyhow::{Result, bail};
use clap::Args;

use deskhand_core::Config;

use crate::clients::create_jira_runtime_and_service;

/// Arguments for the field-id command
#[derive(Args)]
pub struct FieldIdArgs {
  /// Field display name to look up
  #[arg(value_name = "NAME", required = true)]
  pub name: String,

  /// Match any field whose name contains NAME instead of requiring an exact match
  #[arg(long)]
  pub contains: bool,

  /// Request timeout in seconds
  #[arg(long)]
  pub timeout: Option<u64>,
}

pub(crate) fn handle_field_id_command(config: &Config, args: FieldIdArgs) -> Result<()> {
  let (rt, service) = create_jira_runtime_and_service(config, args.timeout)?;

  let matches = rt.block_on(service.find_fields(&args.name, args.contains))?;
  if matches.is_empty() {
    bail!("No field named '{}' found.", args.name);
  }
  for field in &matches {
    println!("FOUND: {}  ->  {}", field.id, field.name);
  }
  Ok(())
}
