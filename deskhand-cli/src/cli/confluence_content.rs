//! # Confluence Content Command
//!
//! Extracts heading sections and macro bodies from a wiki page or its
//! children and prints them per page.

use anyhow::{Result, bail};
use clap::Args;

use deskhand_confluence::service::PageTarget;
use deskhand_core::config::{env_str, resolve_env_or_config_bool, resolve_env_or_config_u64};
use deskhand_core::{Config, print_error, print_header};
use deskhand_confluence::{extract_heading_section, extract_macro_contents, extract_page_id, page_url};

use crate::clients::create_confluence_runtime_and_service;

/// Arguments for the confluence-content command
#[derive(Args)]
pub struct ConfluenceContentArgs {
  /// Page id or URL
  #[arg(value_name = "PAGE", required = true)]
  pub page: String,

  /// Heading whose section should be extracted
  #[arg(long)]
  pub section: Option<String>,

  /// Macro name to extract; repeatable, comma-splitting (default: $CONFLUENCE_MACROS)
  #[arg(long = "macro", value_name = "NAME")]
  pub macros: Vec<String>,

  /// Process the page's children instead of the page itself
  #[arg(long)]
  pub is_parent: bool,

  /// Maximum number of child pages to process
  #[arg(long)]
  pub max_children: Option<u64>,

  /// Request timeout in seconds
  #[arg(long)]
  pub timeout: Option<u64>,
}

pub(crate) fn handle_confluence_content_command(config: &Config, args: ConfluenceContentArgs) -> Result<()> {
  let Some(page_id) = extract_page_id(&args.page) else {
    bail!("'{}' is not a page id or page URL.", args.page);
  };

  let mut macros: Vec<String> = args.macros.iter().flat_map(|raw| deskhand_core::merge::split_tokens(raw)).collect();
  if macros.is_empty() {
    if let Some(raw) = env_str("CONFLUENCE_MACROS") {
      macros = deskhand_core::merge::split_tokens(&raw);
    } else if let Some(from_config) = config.get_str_list("confluence.macros") {
      macros = from_config;
    }
  }
  if args.section.is_none() && macros.is_empty() {
    bail!("Nothing to extract. Use --section and/or --macro.");
  }

  let is_parent =
    args.is_parent || resolve_env_or_config_bool("CONFLUENCE_IS_PARENT", config, "confluence.is_parent").unwrap_or(false);
  let max_children = args
    .max_children
    .or_else(|| resolve_env_or_config_u64("CONFLUENCE_MAX_CHILDREN", config, "confluence.max_children"))
    .map(|n| n as usize);

  let (rt, service) = create_confluence_runtime_and_service(config, args.timeout)?;
  let target = PageTarget {
    page_id,
    children: is_parent,
    max_children,
  };

  let targets = rt.block_on(service.fetch_targets(&target))?;
  if targets.is_empty() {
    bail!("The page has no children to process.");
  }

  let base_url = service.client().base_url().to_string();
  let mut failures: Vec<(String, String)> = Vec::new();
  for (id, _) in &targets {
    let page = match rt.block_on(service.client().get_page(id, "body.storage")) {
      Ok(page) => page,
      Err(err) => {
        failures.push((id.clone(), err.to_string()));
        continue;
      }
    };
    let storage = page.storage_value().unwrap_or_default();

    print_header(&page.title);
    println!("{}", page_url(&base_url, page.links.webui.as_deref()));
    if let Some(heading) = &args.section {
      match extract_heading_section(storage, heading) {
        Some(section) => println!("{section}"),
        None => println!("<section not found>"),
      }
    }
    for name in &macros {
      let bodies = extract_macro_contents(storage, name);
      if bodies.is_empty() {
        println!("<macro not found: {name}>");
        continue;
      }
      for body in bodies {
        println!("{body}");
      }
    }
  }

  if !failures.is_empty() {
    for (id, message) in &failures {
      print_error(&format!("page {id}: {message}"));
    }
    bail!("{} page(s) failed to load", failures.len());
  }
  Ok(())
}
