use crate::RetraceContext;
use crate::output;
use crate::tracking::TrackingRegistry;
use crate::utils::format_size;
use anyhow::Result;
use colored::Colorize;

/// List tracked files
///
/// # Errors
///
/// Returns an error if the directory is not tracked or the registry cannot be read.
pub fn execute(ctx: &RetraceContext, long: bool) -> Result<()> {
    let registry = ctx.open_registry()?;
    run(&registry, long);
    Ok(())
}

/// Prints the tracked files of a loaded registry.
pub fn run(registry: &TrackingRegistry, long: bool) {
    if registry.is_empty() {
        output::info("No files are tracked yet");
        return;
    }

    output::info(&format!(
        "Tracking {} file{} in {}:",
        registry.len(),
        if registry.len() == 1 { "" } else { "s" },
        registry.watched_directory().display()
    ));

    for file in registry.files().values() {
        if long {
            let backup_state = if file.has_backup() {
                "backed up".green()
            } else {
                "no backup".yellow()
            };
            println!(
                "{}  {:>10}  {}  {}  {}",
                short_hash(&file.content_hash),
                format_size(file.size_bytes),
                file.last_modified.format("%Y-%m-%d %H:%M:%S"),
                backup_state,
                file.filename
            );
        } else {
            println!("* {}", file.filename);
        }
    }
}

/// First twelve characters of a digest, or all of it when shorter.
fn short_hash(hash: &str) -> &str {
    hash.char_indices()
        .nth(12)
        .and_then(|(end, _)| hash.get(..end))
        .unwrap_or(hash)
}
