use crate::RetraceContext;
use crate::cli::BatchArgs;
use crate::tracking::TrackingRegistry;
use anyhow::Result;

/// Copy tracked files into their backup slots
///
/// # Errors
///
/// Returns an error if:
/// - The directory is not tracked
/// - A name is not tracked (nothing is copied)
/// - Any file could not be backed up (the others still are)
pub fn execute(ctx: &RetraceContext, args: &BatchArgs) -> Result<()> {
    let mut registry = ctx.open_registry()?;
    run(&mut registry, args)
}

/// Backs up the selected files of a loaded registry and reports per file.
///
/// # Errors
///
/// Returns an error if the batch is rejected or any file fails.
pub fn run(registry: &mut TrackingRegistry, args: &BatchArgs) -> Result<()> {
    let outcome = if args.all {
        registry.backup_all()?
    } else {
        registry.backup(&args.names)?
    };
    super::report_batch("backed up", &outcome)
}
