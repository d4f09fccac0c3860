//! Batch outcome bookkeeping shared by the multi-issue commands.
//!
//! A failure on one item never aborts the batch; it is recorded here and the
//! command converts the tally into its exit status once every item has been
//! attempted.

use anyhow::{Result, bail};

use deskhand_core::{print_error, print_success, print_warning};

/// Tally of per-item outcomes for one command run.
#[derive(Debug, Default)]
pub struct BatchSummary {
  updated: usize,
  skipped: usize,
  failures: Vec<(String, String)>,
}

impl BatchSummary {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn record_updated(&mut self) {
    self.updated += 1;
  }

  pub fn record_skipped(&mut self) {
    self.skipped += 1;
  }

  pub fn record_failure(&mut self, key: &str, message: String) {
    self.failures.push((key.to_string(), message));
  }

  pub fn updated(&self) -> usize {
    self.updated
  }

  /// Print the summary and turn the tally into an exit status. Any failure
  /// makes the run non-zero; `require_updates` additionally fails an
  /// all-skip run.
  pub fn finish(self, noun: &str, require_updates: bool) -> Result<()> {
    for (key, message) in &self.failures {
      print_error(&format!("{key}: {message}"));
    }
    let line = format!(
      "Updated {} {noun}(s): {} skipped, {} failed.",
      self.updated,
      self.skipped,
      self.failures.len()
    );
    if self.failures.is_empty() {
      print_success(&line);
    } else {
      print_warning(&line);
      bail!("{} {noun}(s) failed", self.failures.len());
    }
    if require_updates && self.updated == 0 {
      bail!("no {noun}s were updated");
    }
    Ok(())
  }
}
