//! Utility functions and helpers.
//!
//! - [`hash`]: Streaming SHA-256 content hashing
//! - [`permissions`]: Copying files together with their permissions and mtime
//!
//! # Examples
//!
//! ```
//! use retrace::utils::{expand_tilde, format_size};
//!
//! # fn main() -> anyhow::Result<()> {
//! let path = expand_tilde("~/notes")?;
//! let size_str = format_size(1024 * 1024); // "1.00 MB"
//! # Ok(())
//! # }
//! ```

/// Content hashing
pub mod hash;
/// File copies with permission and timestamp preservation
pub mod permissions;

use anyhow::Result;
use std::path::PathBuf;

/// Expands a path starting with `~` to the user's home directory.
///
/// # Errors
///
/// Returns an error if the path is empty.
pub fn expand_tilde(path: &str) -> Result<PathBuf> {
    if path.is_empty() {
        anyhow::bail!("Path cannot be empty");
    }
    if path == "~"
        && let Some(home) = dirs::home_dir()
    {
        return Ok(home);
    }
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return Ok(home.join(rest));
    }
    Ok(PathBuf::from(path))
}

/// Formats a file size in bytes into a human-readable string with appropriate units.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::float_arithmetic,
    clippy::arithmetic_side_effects,
    clippy::indexing_slicing
)]
pub fn format_size(size: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = size as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", size.round() as u64, UNITS[unit_index])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}
