//! Tracking layer: tracked files, the per-directory registry, and their errors.
//!
//! A directory becomes tracked once it holds a metadata directory with a
//! registry document. Individual files are then registered by name; each one
//! records a SHA-256 fingerprint of its content and owns exactly one backup
//! slot next to the registry document.
//!
//! # Architecture
//!
//! - [`crate::tracking::TrackedFile`] - one file, its hash, and its backup slot
//! - [`crate::tracking::TrackingRegistry`] - the persisted collection for a directory
//! - [`crate::tracking::TrackingError`] - the error type shared by both
//!
//! # Usage
//!
//! ```no_run
//! use retrace::tracking::TrackingRegistry;
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut registry = TrackingRegistry::initialize(Path::new("/home/user/notes"))?;
//! registry.track("todo.md")?;
//! registry.save()?;
//!
//! // Later: what changed, and put it aside
//! for file in registry.check() {
//!     println!("changed: {}", file.filename);
//! }
//! registry.backup(&["todo.md"])?;
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod file;
pub mod registry;

pub use errors::{Result, TrackingError};
pub use file::TrackedFile;
pub use registry::{BatchOutcome, RegistryOptions, TrackingRegistry};
