//! Error taxonomy for the tracking layer.
//!
//! Every variant carries the filename or path it concerns so the command
//! layer can print an actionable message without extra bookkeeping.

use std::path::PathBuf;
use thiserror::Error;

/// Failures reported by [`TrackedFile`](super::TrackedFile) and
/// [`TrackingRegistry`](super::TrackingRegistry) operations.
#[derive(Debug, Error)]
pub enum TrackingError {
    /// The requested path does not exist, is a directory, or is not a name
    /// that can live in the registry.
    #[error("cannot track '{filename}': {reason}")]
    UntrackableFile {
        /// Name as given by the caller
        filename: String,
        /// Why the file was rejected
        reason: String,
    },

    /// The filename is not present in the registry.
    #[error("'{0}' is not tracked")]
    UntrackedFile(String),

    /// The metadata directory or registry file is missing.
    #[error("no valid tracking registry in {}", directory.display())]
    InvalidState {
        /// Watched directory of the registry
        directory: PathBuf,
    },

    /// Source or backup slot failed its existence/type check during backup.
    #[error("cannot back up '{filename}': {reason}")]
    InvalidBackupTarget {
        /// Registry key of the file
        filename: String,
        /// Which check failed
        reason: String,
    },

    /// The file has never been backed up, so there is nothing to restore.
    #[error("no backup exists for '{0}'")]
    NoBackup(String),

    /// The directory to track is missing or is not a directory.
    #[error("'{}' is not a directory", .0.display())]
    InvalidDirectory(PathBuf),

    /// The registry file exists but could not be parsed.
    #[error("registry file {} is corrupted: {source}", path.display())]
    CorruptRegistry {
        /// Registry file path
        path: PathBuf,
        /// Parser error
        #[source]
        source: serde_json::Error,
    },

    /// Underlying read/write/copy failure.
    #[error("failed to {operation} {}: {source}", path.display())]
    Io {
        /// Short verb describing what was attempted
        operation: &'static str,
        /// Path involved
        path: PathBuf,
        /// OS error
        #[source]
        source: std::io::Error,
    },
}

impl TrackingError {
    /// Builds an [`TrackingError::Io`] for `path`.
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    /// Registry key this error refers to, if any.
    #[must_use]
    pub fn filename(&self) -> Option<&str> {
        match self {
            Self::UntrackableFile { filename, .. }
            | Self::InvalidBackupTarget { filename, .. }
            | Self::UntrackedFile(filename)
            | Self::NoBackup(filename) => Some(filename),
            _ => None,
        }
    }
}

/// Result alias for the tracking layer.
pub type Result<T> = std::result::Result<T, TrackingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_file() {
        let err = TrackingError::UntrackedFile("notes.txt".to_string());
        assert_eq!(err.to_string(), "'notes.txt' is not tracked");
        assert_eq!(err.filename(), Some("notes.txt"));

        let err = TrackingError::InvalidBackupTarget {
            filename: "a.txt".to_string(),
            reason: "source is missing".to_string(),
        };
        assert!(err.to_string().contains("a.txt"));
        assert!(err.to_string().contains("source is missing"));
    }

    #[test]
    fn test_io_error_keeps_source() {
        let err = TrackingError::io(
            "read",
            "/tmp/missing",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.to_string().starts_with("failed to read /tmp/missing"));
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(err.filename(), None);
    }
}
