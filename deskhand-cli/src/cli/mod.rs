//! # Command Line Interface
//!
//! Defines the CLI structure and command handlers for the deskhand tool: one
//! subcommand per automation task, plus the global verbosity, color, and
//! config-file flags shared by all of them.

mod batch;
mod confluence_content;
mod confluence_labeler;
mod copy_issue_field;
mod field_id;
mod group_issue_fields;
mod list_issues;
mod monitoring_deps;
mod transition_status;
mod update_issue;

use std::path::PathBuf;

use anyhow::Result;
use clap::builder::Styles;
use clap::builder::styling::AnsiColor;
use clap::{ArgAction, Parser, Subcommand};

use deskhand_core::{ColorMode, Config};

/// Top-level CLI command for the deskhand tool
#[derive(Parser)]
#[command(name = "deskhand")]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
#[command(about = "Jira and Confluence automation commands")]
#[command(
  long_about = "Deskhand automates routine Jira and Confluence chores from the command line.\n\n\
        It provides commands for listing project or queue issues, transitioning\n\
        statuses in bulk, updating fields and labels, and scraping sections and\n\
        macros out of wiki pages.\n\n\
        Connection settings come from CLI flags, JIRA_*/CONFLUENCE_* environment\n\
        variables, or a JSON config file, in that order of precedence."
)]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(propagate_version = true)]
#[command(subcommand_required(true))]
#[command(disable_help_subcommand = true)]
#[command(max_term_width = 120)]
#[command(styles = Styles::styled()
    .header(AnsiColor::BrightGreen.on_default().bold().underline())
    .usage(AnsiColor::Green.on_default().bold())
    .literal(AnsiColor::BrightGreen.on_default().bold())
    .placeholder(AnsiColor::BrightWhite.on_default().italic())
    .valid(AnsiColor::Green.on_default())
    .invalid(AnsiColor::BrightRed.on_default().bold())
)]
pub struct Cli {
  /// Sets the level of verbosity (can be used multiple times)
  #[arg(
    short = 'v',
    long = "verbose",
    global = true,
    action = ArgAction::Count,
    long_help = "Sets the level of verbosity for tracing and logging output.\n\n\
             -v: Show info level messages\n\
             -vv: Show debug level messages\n\
             -vvv: Show trace level messages"
  )]
  pub verbose: u8,

  /// Controls when colored output is used
  #[arg(
    long,
    global = true,
    value_enum,
    ignore_case = true,
    default_value_t = ColorMode::Auto,
  )]
  pub colors: ColorMode,

  /// Path to the JSON config file (default: $JIRA_CONFIG_FILE, then ./config.json)
  #[arg(long, global = true, value_name = "PATH")]
  pub config: Option<PathBuf>,

  /// Subcommands
  #[command(subcommand)]
  pub command: Commands,
}

/// Subcommands for the deskhand tool
#[derive(Subcommand)]
pub enum Commands {
  /// List open issues for a project or service-desk queue
  #[command(long_about = "List open issues for a Jira project or service-desk queue.\n\n\
            Without a queue this searches the project with JQL, newest first,\n\
            excluding Done issues unless explicit statuses are given. With a queue\n\
            id or name the queue is resolved through the Service Desk API and its\n\
            own JQL is preferred. Prints one browse URL per issue.")]
  #[command(alias = "ls")]
  ListIssues(list_issues::ListIssuesArgs),

  /// Transition issues to a target status
  #[command(long_about = "Transition one or more Jira issues to a target status.\n\n\
            Issues already in the target status are skipped, as are issues whose\n\
            current status differs from --only-status when it is set. The\n\
            transition is matched case-insensitively against the transition name\n\
            and the status it leads to.")]
  TransitionStatus(transition_status::TransitionStatusArgs),

  /// Update fields, labels, summary, or assignee on issues
  #[command(long_about = "Apply field, label, summary, assignee, and epic-link updates to a batch\n\
            of Jira issues.\n\n\
            Issues come from positional keys or URLs, a --file list, piped stdin,\n\
            or a --jql query. Field names are resolved to field ids through the\n\
            field metadata; labels are merged into the existing set with a single\n\
            update. A failure on one issue does not stop the batch.")]
  UpdateIssue(update_issue::UpdateIssueArgs),

  /// Copy one field's value onto another field across matching issues
  #[command(long_about = "Copy a field value from a source field to a target field.\n\n\
            Issues are selected by project, issue type, and an optional extra JQL\n\
            filter. Issues whose source field is empty, or whose target field\n\
            already carries the same text, are skipped. With --dry-run the\n\
            updates are printed but not sent.")]
  CopyIssueField(copy_issue_field::CopyIssueFieldArgs),

  /// Group two issue fields by configurable keyword buckets
  #[command(long_about = "Fetch two fields for a batch of issues and group the primary values by\n\
            keyword matches against the secondary value.\n\n\
            Group labels and keyword lists come from flags, JIRA_GROUP_*\n\
            environment variables, or the config defaults. The report prints to\n\
            stdout, or to a txt/csv file with --output.")]
  GroupIssueFields(group_issue_fields::GroupIssueFieldsArgs),

  /// Look up Jira field ids by display name
  #[command(long_about = "Look up Jira custom-field ids by display name.\n\n\
            By default the name must match exactly (case-insensitive); with\n\
            --contains any field whose name contains the argument is printed.")]
  FieldId(field_id::FieldIdArgs),

  /// Extract sections and macros from Confluence pages
  #[command(long_about = "Extract heading sections and macro bodies from Confluence pages.\n\n\
            The page is addressed by id or URL. With --is-parent the child pages\n\
            are processed instead of the page itself. Sections are matched by\n\
            heading text; macros by their ac:name attribute.")]
  ConfluenceContent(confluence_content::ConfluenceContentArgs),

  /// Apply Jira label changes driven by wiki page macros
  #[command(long_about = "Apply Jira label changes to the issues referenced by a wiki page.\n\n\
            Jira macros on the page (or its children with --is-parent) are scanned\n\
            for issue keys and JQL queries; JQL queries are expanded through\n\
            search. The requested label additions and removals are then merged\n\
            into each issue's label set.")]
  ConfluenceLabeler(confluence_labeler::ConfluenceLabelerArgs),

  /// Report monitoring dependency fields grouped by database type
  #[command(long_about = "Report the monitoring dependency custom fields for a batch of issues.\n\n\
            Fetches the 'Monitoring Dependencies (FQDN)' and '(DB Type)' fields\n\
            and groups the FQDNs under MySQL/MariaDB, PostgreSQL, and\n\
            Other/Unknown headings.")]
  MonitoringDeps(monitoring_deps::MonitoringDepsArgs),
}

pub fn handle_cli(cli: Cli) -> Result<()> {
  // Set global color override based on --colors argument
  match cli.colors {
    ColorMode::Always | ColorMode::Yes => owo_colors::set_override(true),
    ColorMode::Never | ColorMode::No => owo_colors::set_override(false),
    ColorMode::Auto => {
      // Let owo_colors use its default terminal auto-detection
    }
  }

  let config = Config::load(cli.config.as_deref());

  match cli.command {
    Commands::ListIssues(args) => list_issues::handle_list_issues_command(&config, args),
    Commands::TransitionStatus(args) => transition_status::handle_transition_status_command(&config, args),
    Commands::UpdateIssue(args) => update_issue::handle_update_issue_command(&config, args),
    Commands::CopyIssueField(args) => copy_issue_field::handle_copy_issue_field_command(&config, args),
    Commands::GroupIssueFields(args) => group_issue_fields::handle_group_issue_fields_command(&config, args),
    Commands::FieldId(args) => field_id::handle_field_id_command(&config, args),
    Commands::ConfluenceContent(args) => confluence_content::handle_confluence_content_command(&config, args),
    Commands::ConfluenceLabeler(args) => confluence_labeler::handle_confluence_labeler_command(&config, args),
    Commands::MonitoringDeps(args) => monitoring_deps::handle_monitoring_deps_command(&config, args),
  }
}
