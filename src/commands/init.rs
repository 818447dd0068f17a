use crate::RetraceContext;
use crate::output;
use crate::tracking::{RegistryOptions, TrackingRegistry};
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

/// Initialize tracking in a directory
///
/// Any registry already in the directory is replaced by an empty one.
/// Existing backup copies are left on disk.
///
/// # Errors
///
/// Returns an error if:
/// - The directory does not exist or is a file
/// - The metadata directory or registry file cannot be written
pub fn execute(ctx: &RetraceContext, path: Option<&Path>) -> Result<()> {
    let directory = path.unwrap_or(&ctx.directory);
    let registry = run(directory, &ctx.registry_options())?;

    println!("\n{}", "Quick start:".bold());
    println!("  retrace track notes.txt    # Track a file");
    println!("  retrace check              # List changed files");
    println!("  retrace backup notes.txt   # Back it up");
    println!("  retrace restore notes.txt  # Bring the backup back");
    output::verbose(&format!(
        "Registry file: {}",
        registry.registry_file_path().display()
    ));

    Ok(())
}

/// Creates a fresh registry in `directory` and reports it.
///
/// # Errors
///
/// Returns an error if the registry cannot be initialized.
pub fn run(directory: &Path, options: &RegistryOptions) -> Result<TrackingRegistry> {
    let already_tracked = directory
        .join(&options.metadata_dir)
        .join(&options.registry_file)
        .is_file();

    let registry = TrackingRegistry::initialize_with(directory, options).with_context(|| {
        format!("Failed to initialize tracking in {}", directory.display())
    })?;

    if already_tracked {
        output::warning("Replaced the existing registry; previously tracked files are forgotten");
    }
    output::success(&format!(
        "Initialized tracking in {}",
        registry.watched_directory().display()
    ));

    Ok(registry)
}
