#![warn(missing_docs)]

//! # Retrace - file change tracking and backup
//!
//! Retrace watches a user-selected set of files inside one directory. It
//! remembers a SHA-256 fingerprint of each file, reports which files changed
//! since their last backup, and copies files to and from a single backup slot
//! per file.
//!
//! ## Architecture
//!
//! - [`tracking`]: Tracked files, the per-directory registry, and their errors
//! - [`config`]: Configuration parsing and validation
//! - [`commands`]: Command implementations (init, track, check, backup, ...)
//! - [`cli`]: Argument parsing structures
//! - [`output`]: Output formatting and verbosity
//! - [`utils`]: Hashing, copying, and small helpers
//!
//! ## Example Usage
//!
//! ```no_run
//! use retrace::tracking::TrackingRegistry;
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut registry = TrackingRegistry::locate(Path::new("/home/user/notes"))?;
//! registry.load()?;
//!
//! if !registry.matches_backup("todo.md")? {
//!     registry.backup(&["todo.md"])?;
//! }
//! # Ok(())
//! # }
//! ```

/// Command-line interface definitions (argument parsing structures).
pub mod cli;

/// Commands module containing all CLI command implementations.
pub mod commands;

/// Configuration parsing, validation, and management.
pub mod config;

/// Output formatting for the terminal.
pub mod output;

/// Tracked files, the registry, and the tracking error type.
pub mod tracking;

/// Utility functions and helpers.
pub mod utils;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracking::{RegistryOptions, TrackingRegistry};

/// Current version of the retrace binary.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default name of the metadata directory inside a watched directory.
pub const METADATA_DIR: &str = ".tracking";

/// Default name of the registry document inside the metadata directory.
pub const REGISTRY_FILE: &str = "tracking_files.json";

/// Default configuration file path relative to the user config directory.
pub const DEFAULT_CONFIG_PATH: &str = "retrace/config.toml";

/// Central context for all retrace operations.
///
/// Holds the directory being worked on and the loaded configuration. The
/// context never holds a registry itself; commands open one per invocation,
/// while the interactive shell keeps one open for its session.
///
/// # Examples
///
/// ```no_run
/// use retrace::RetraceContext;
///
/// # fn main() -> anyhow::Result<()> {
/// // Context from the environment and default config location
/// let ctx = RetraceContext::new(None)?;
///
/// // Context with explicit paths (for testing)
/// let ctx = RetraceContext::new_explicit(
///     "/tmp/notes".into(),
///     "/tmp/retrace/config.toml".into()
/// )?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RetraceContext {
    /// Directory whose files are tracked.
    pub directory: PathBuf,

    /// Path to the configuration file.
    pub config_path: PathBuf,

    /// Loaded configuration settings.
    pub config: config::Config,
}

impl RetraceContext {
    /// Creates a context from the default config location.
    ///
    /// The directory is taken from `directory`, then `core.default_directory`
    /// in the config, then the current directory. The config path may be
    /// overridden with `RETRACE_CONFIG_PATH`.
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined or the
    /// configuration cannot be read or created.
    pub fn new(directory: Option<PathBuf>) -> Result<Self> {
        let config_path = if let Ok(path) = std::env::var("RETRACE_CONFIG_PATH") {
            PathBuf::from(path)
        } else {
            dirs::config_dir()
                .context("Could not find configuration directory")?
                .join(DEFAULT_CONFIG_PATH)
        };

        let config = config::Config::load(&config_path)?;

        if let Err(e) = config::validator::warn_unknown_keys(&config_path) {
            tracing::warn!(error = %e, "configuration validation failed");
        }

        let directory = match directory.or_else(|| config.core.default_directory.clone()) {
            Some(directory) => directory,
            None => std::env::current_dir().context("Could not read current directory")?,
        };

        Ok(Self {
            directory,
            config_path,
            config,
        })
    }

    /// Creates a context with explicit paths, creating a default config file
    /// if none exists.
    ///
    /// # Errors
    /// Returns an error if the configuration cannot be loaded or created.
    pub fn new_explicit(directory: PathBuf, config_path: PathBuf) -> Result<Self> {
        let config = config::Config::load(&config_path)?;
        Ok(Self {
            directory,
            config_path,
            config,
        })
    }

    /// Registry layout and copy options from the configuration.
    #[must_use]
    pub fn registry_options(&self) -> RegistryOptions {
        self.config.tracking.registry_options()
    }

    /// Whether `directory` already holds a valid registry.
    #[must_use]
    pub fn is_tracking_initialized(&self) -> bool {
        let options = self.registry_options();
        self.directory.is_dir()
            && self
                .directory
                .join(&options.metadata_dir)
                .join(&options.registry_file)
                .is_file()
    }

    /// Returns an error pointing at `init` if the directory is not tracked.
    ///
    /// # Errors
    /// Returns an error if there is no registry in the directory.
    pub fn check_tracking_initialized(&self) -> Result<()> {
        if !self.is_tracking_initialized() {
            anyhow::bail!(
                "Tracking not initialized in {}. Did you run 'retrace init'?",
                self.directory.display()
            );
        }
        Ok(())
    }

    /// Opens and loads the registry for this context's directory.
    ///
    /// # Errors
    /// Returns an error if the directory is not tracked or the registry file
    /// cannot be read.
    pub fn open_registry(&self) -> Result<TrackingRegistry> {
        self.check_tracking_initialized()?;
        open_registry_at(&self.directory, &self.registry_options())
    }
}

/// Locates and loads the registry for `directory`.
///
/// # Errors
/// Returns an error if the directory is unusable or the registry cannot be read.
pub fn open_registry_at(directory: &Path, options: &RegistryOptions) -> Result<TrackingRegistry> {
    let mut registry = TrackingRegistry::locate_with(directory, options)
        .with_context(|| format!("Failed to open tracking in {}", directory.display()))?;
    registry.load().context("Failed to load tracking registry")?;
    Ok(registry)
}
