use crate::RetraceContext;
use crate::cli::BatchArgs;
use crate::tracking::TrackingRegistry;
use anyhow::Result;

/// Copy backups over the live files
///
/// Files that were never backed up are skipped.
///
/// # Errors
///
/// Returns an error if:
/// - The directory is not tracked
/// - A name is not tracked (nothing is restored)
/// - Any file could not be restored (the others still are)
pub fn execute(ctx: &RetraceContext, args: &BatchArgs) -> Result<()> {
    let registry = ctx.open_registry()?;
    run(&registry, args)
}

/// Restores the selected files of a loaded registry and reports per file.
///
/// # Errors
///
/// Returns an error if the batch is rejected or any file fails.
pub fn run(registry: &TrackingRegistry, args: &BatchArgs) -> Result<()> {
    let outcome = if args.all {
        registry.restore_all()?
    } else {
        registry.restore(&args.names)?
    };
    super::report_batch("restored", &outcome)
}
