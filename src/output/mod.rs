//! Status lines for the person at the terminal.
//!
//! Everything here goes to stderr so that listings on stdout (`files`,
//! `check`, batch results) stay pipeable. `--quiet` hides the routine lines;
//! warnings and errors always print. Developer diagnostics use `tracing`.

use colored::Colorize;
use std::sync::atomic::{AtomicU8, Ordering};

/// How much status chatter the CLI prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Warnings and errors only
    Quiet = 0,
    /// Success and info lines as well
    Normal = 1,
    /// Also per-step detail from `verbose`
    Verbose = 2,
}

static VERBOSITY: AtomicU8 = AtomicU8::new(1);

/// Set once from the CLI flags in `main`.
pub fn set_verbosity(level: Verbosity) {
    VERBOSITY.store(level as u8, Ordering::Relaxed);
}

/// Current level; `Normal` until `main` sets it.
pub fn get_verbosity() -> Verbosity {
    match VERBOSITY.load(Ordering::Relaxed) {
        0 => Verbosity::Quiet,
        2 => Verbosity::Verbose,
        _ => Verbosity::Normal,
    }
}

/// A completed action, e.g. "Initialized tracking in ...".
pub fn success(message: &str) {
    if get_verbosity() == Verbosity::Quiet {
        return;
    }
    eprintln!("{} {}", "✓".green().bold(), message);
}

/// Always printed.
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message.red());
}

/// Always printed, e.g. when `init` replaces an existing registry.
pub fn warning(message: &str) {
    eprintln!("{}", message.yellow().bold());
}

/// Routine status such as "No files are tracked yet".
pub fn info(message: &str) {
    if get_verbosity() == Verbosity::Quiet {
        return;
    }
    eprintln!("{}", message.dimmed());
}

/// Only with `--verbose`.
pub fn verbose(message: &str) {
    if get_verbosity() != Verbosity::Verbose {
        return;
    }
    eprintln!("{}", message.dimmed());
}
