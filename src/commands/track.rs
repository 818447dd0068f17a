use crate::RetraceContext;
use crate::output;
use crate::tracking::TrackingRegistry;
use anyhow::{Context, Result};
use colored::Colorize;

/// Start tracking files by name and save the registry
///
/// # Errors
///
/// Returns an error if:
/// - The directory is not tracked
/// - Any name cannot be tracked (the others are still saved)
/// - The registry cannot be saved
pub fn execute(ctx: &RetraceContext, names: &[String]) -> Result<()> {
    let mut registry = ctx.open_registry()?;
    run(&mut registry, names)
}

/// Tracks each name, then persists whatever was added.
///
/// # Errors
///
/// Returns an error if any name failed or the registry cannot be saved.
pub fn run(registry: &mut TrackingRegistry, names: &[String]) -> Result<()> {
    let mut failures = 0usize;
    let mut added = 0usize;

    for name in names {
        let known = registry.get(name).is_some();
        match registry.track(name) {
            Ok(_) if known => output::info(&format!("Already tracking {name}")),
            Ok(file) => {
                println!("  {} {}", "tracking:".green(), file.filename);
                added += 1;
            }
            Err(e) => {
                output::error(&e.to_string());
                failures += 1;
            }
        }
    }

    if added > 0 {
        registry.save().context("Failed to save tracking registry")?;
        output::success(&format!(
            "Added tracking for {} file{}",
            added,
            if added == 1 { "" } else { "s" }
        ));
    }

    if failures > 0 {
        anyhow::bail!(
            "{} file{} could not be tracked",
            failures,
            if failures == 1 { "" } else { "s" }
        );
    }
    Ok(())
}
