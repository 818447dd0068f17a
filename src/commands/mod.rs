//! Command implementations.
//!
//! Each command has an `execute` entry point taking a [`RetraceContext`](crate::RetraceContext)
//! that opens the registry for one invocation. Commands that act on a loaded
//! registry also expose `run`, which the interactive shell calls with the
//! registry it keeps open.

pub mod backup;
pub mod check;
pub mod config;
pub mod files;
pub mod init;
pub mod restore;
pub mod shell;
pub mod track;

use crate::output;
use crate::tracking::BatchOutcome;
use colored::Colorize;

/// Prints a batch outcome and turns per-file failures into one error.
///
/// # Errors
///
/// Returns an error if any file in the batch failed.
pub(crate) fn report_batch(verb: &str, outcome: &BatchOutcome) -> anyhow::Result<()> {
    for file in &outcome.succeeded {
        println!("  {} {}", format!("{verb}:").green(), file.filename);
    }
    for name in &outcome.skipped {
        println!("  {} {} (no backup yet)", "skipped:".dimmed(), name);
    }
    for failure in &outcome.failed {
        output::error(&failure.to_string());
    }

    let done = outcome.succeeded.len();
    if done > 0 {
        output::success(&format!(
            "{} {} file{}",
            capitalize(verb),
            done,
            if done == 1 { "" } else { "s" }
        ));
    } else if outcome.failed.is_empty() {
        output::info("Nothing to do");
    }

    if !outcome.failed.is_empty() {
        anyhow::bail!(
            "{} file{} could not be {verb}",
            outcome.failed.len(),
            if outcome.failed.len() == 1 { "" } else { "s" }
        );
    }
    Ok(())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
