use crate::RetraceContext;
use crate::output;
use crate::tracking::TrackingRegistry;
use anyhow::Result;
use colored::Colorize;

/// Report files changed since their last backup
///
/// # Errors
///
/// Returns an error if the directory is not tracked, or a single named file
/// is not tracked or cannot be read.
pub fn execute(ctx: &RetraceContext, name: Option<&str>) -> Result<()> {
    let registry = ctx.open_registry()?;
    run(&registry, name)
}

/// Checks one file when `name` is given, otherwise every tracked file.
///
/// # Errors
///
/// Returns an error if the named file is not tracked or cannot be read.
pub fn run(registry: &TrackingRegistry, name: Option<&str>) -> Result<()> {
    if let Some(name) = name {
        if registry.matches_backup(name)? {
            output::success(&format!("{name} has not changed since its last backup"));
        } else {
            println!("  {} {}", "modified:".yellow(), name);
            output::info(&format!("{name} has changed since its last backup"));
        }
        return Ok(());
    }

    let changed = registry.check();
    let missing: Vec<&str> = registry
        .files()
        .values()
        .filter(|file| !file.source_exists())
        .map(|file| file.filename.as_str())
        .collect();

    if changed.is_empty() {
        output::success("No tracked files have changed since their last backup");
    } else {
        output::info("Files changed since their last backup:");
        for file in &changed {
            println!("  {} {}", "modified:".yellow(), file.filename);
        }
    }

    if !missing.is_empty() {
        output::warning(&format!("Not checked (missing): {}", missing.join(", ")));
    }

    Ok(())
}
