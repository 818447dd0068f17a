//! Interactive session over one loaded registry.
//!
//! The session is the single owner of its registry: every command typed at
//! the prompt borrows it in turn, and `load`/`init` replace it. Commands that
//! need a registry check that one is loaded and still valid before running.

use super::{backup, check, files, init, restore, track};
use crate::cli::{ShellCommand, ShellLine};
use crate::tracking::{RegistryOptions, TrackingRegistry};
use crate::utils::expand_tilde;
use crate::{RetraceContext, open_registry_at, output};
use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, BufRead, IsTerminal, Write};

/// Prompt shown before each line when reading from a terminal.
pub const PROMPT: &str = "rt> ";

/// Whether the read loop should keep going after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// State of one interactive session.
pub struct Session {
    options: RegistryOptions,
    registry: Option<TrackingRegistry>,
}

impl Session {
    #[must_use]
    pub const fn new(options: RegistryOptions) -> Self {
        Self {
            options,
            registry: None,
        }
    }

    /// The registry currently loaded, if any.
    #[must_use]
    pub const fn registry(&self) -> Option<&TrackingRegistry> {
        self.registry.as_ref()
    }

    fn loaded(&self) -> Result<&TrackingRegistry> {
        match self.registry.as_ref() {
            Some(registry) if registry.is_valid() => Ok(registry),
            _ => anyhow::bail!("No valid tracking directory is loaded (use 'load <dir>' or 'init <dir>')"),
        }
    }

    fn loaded_mut(&mut self) -> Result<&mut TrackingRegistry> {
        match self.registry.as_mut() {
            Some(registry) if registry.is_valid() => Ok(registry),
            _ => anyhow::bail!("No valid tracking directory is loaded (use 'load <dir>' or 'init <dir>')"),
        }
    }

    /// Parses and runs one input line, printing any error.
    pub fn handle_line(&mut self, line: &str) -> Flow {
        let words = match shell_words::split(line) {
            Ok(words) => words,
            Err(e) => {
                output::error(&format!("Could not parse input: {e}"));
                return Flow::Continue;
            }
        };
        if words.is_empty() {
            return Flow::Continue;
        }

        let command = match ShellLine::try_parse_from(words) {
            Ok(parsed) => parsed.command,
            Err(e) => {
                // Help and usage errors render themselves
                let _ = e.print();
                return Flow::Continue;
            }
        };

        match self.dispatch(command) {
            Ok(flow) => flow,
            Err(e) => {
                output::error(&format!("{e:#}"));
                Flow::Continue
            }
        }
    }

    /// Runs one parsed command against the session.
    ///
    /// # Errors
    ///
    /// Returns the command's error; the session stays usable.
    pub fn dispatch(&mut self, command: ShellCommand) -> Result<Flow> {
        match command {
            ShellCommand::Load { path } => {
                let path = expand_tilde(&path.to_string_lossy())?;
                let registry = open_registry_at(&path, &self.options)?;
                output::success(&format!(
                    "Loaded tracking for {} ({} file{})",
                    registry.watched_directory().display(),
                    registry.len(),
                    if registry.len() == 1 { "" } else { "s" }
                ));
                self.registry = Some(registry);
            }
            ShellCommand::Init { path } => {
                let path = expand_tilde(&path.to_string_lossy())?;
                self.registry = Some(init::run(&path, &self.options)?);
            }
            ShellCommand::Files { long } => files::run(self.loaded()?, long),
            ShellCommand::Track { names } => track::run(self.loaded_mut()?, &names)?,
            ShellCommand::Check { name } => check::run(self.loaded()?, name.as_deref())?,
            ShellCommand::Backup(args) => backup::run(self.loaded_mut()?, &args)?,
            ShellCommand::Restore(args) => restore::run(self.loaded()?, &args)?,
            ShellCommand::Exit => return Ok(Flow::Exit),
        }
        Ok(Flow::Continue)
    }
}

/// Start an interactive session on standard input
///
/// If the context directory is already tracked its registry is loaded first.
///
/// # Errors
///
/// Returns an error if standard input cannot be read.
pub fn execute(ctx: &RetraceContext) -> Result<()> {
    let mut session = Session::new(ctx.registry_options());

    if ctx.is_tracking_initialized() {
        match open_registry_at(&ctx.directory, &session.options) {
            Ok(registry) => {
                output::info(&format!(
                    "Loaded tracking for {}",
                    registry.watched_directory().display()
                ));
                session.registry = Some(registry);
            }
            Err(e) => output::warning(&format!("{e:#}")),
        }
    }

    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    run(&mut session, stdin.lock(), interactive)
}

/// Feeds lines from `input` to the session until `exit` or end of input.
///
/// # Errors
///
/// Returns an error if reading input or writing the prompt fails.
pub fn run<R: BufRead>(session: &mut Session, input: R, interactive: bool) -> Result<()> {
    let prompt = || -> Result<()> {
        if interactive {
            let mut stdout = io::stdout();
            write!(stdout, "{PROMPT}")?;
            stdout.flush()?;
        }
        Ok(())
    };

    prompt()?;
    for line in input.lines() {
        let line = line.context("Failed to read input")?;
        if session.handle_line(&line) == Flow::Exit {
            break;
        }
        prompt()?;
    }
    Ok(())
}
