//! The unit of tracking: one file, its content fingerprint, and its backup slot.

use super::errors::{Result, TrackingError};
use crate::utils::hash;
use crate::utils::permissions::{self, CopyOptions};
use chrono::{DateTime, Local, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// A file registered for change detection and backup.
///
/// Serialized field names match the on-disk registry document:
/// `filename, path, hash, size, last_modified, backup_path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedFile {
    /// Base name of the file; the registry key
    pub filename: String,
    /// Absolute path to the live file
    #[serde(rename = "path")]
    pub source_path: PathBuf,
    /// Hex SHA-256 of the content at the last track or backup
    #[serde(rename = "hash", deserialize_with = "deserialize_digest")]
    pub content_hash: String,
    /// Size in bytes when the hash was taken
    #[serde(rename = "size")]
    pub size_bytes: u64,
    /// Modification time of the source when the hash was taken
    pub last_modified: DateTime<Utc>,
    /// Absolute path of the single backup slot
    pub backup_path: PathBuf,
}

impl TrackedFile {
    /// Hashes the file at `path`. See [`hash::hash_file`].
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError::Io`] if the file cannot be opened or read.
    pub fn compute_hash(path: &Path) -> Result<String> {
        hash::hash_file(path)
    }

    /// Builds a tracked file for `path` with its backup slot in `backup_directory`.
    ///
    /// Returns `Ok(None)` when `path` does not exist or is not a regular file;
    /// that is an expected outcome, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but its metadata or content cannot be read.
    pub fn from_path(path: &Path, backup_directory: &Path) -> Result<Option<Self>> {
        if !path.is_file() {
            return Ok(None);
        }
        let Some(filename) = path.file_name() else {
            return Ok(None);
        };
        let filename = filename.to_string_lossy().into_owned();

        let source_path = std::path::absolute(path)
            .map_err(|e| TrackingError::io("resolve", path, e))?;
        let backup_directory = std::path::absolute(backup_directory)
            .map_err(|e| TrackingError::io("resolve", backup_directory, e))?;

        let content_hash = Self::compute_hash(&source_path)?;
        let (size_bytes, last_modified) = read_stat(&source_path)?;

        Ok(Some(Self {
            backup_path: backup_directory.join(&filename),
            filename,
            source_path,
            content_hash,
            size_bytes,
            last_modified,
        }))
    }

    /// Copies the live file into its backup slot, creating the backup
    /// directory if needed.
    ///
    /// # Errors
    ///
    /// - [`TrackingError::InvalidBackupTarget`] if the source is missing or a
    ///   directory, or the backup slot is a directory
    /// - [`TrackingError::Io`] if the copy fails
    pub fn copy_to_backup(&self, options: CopyOptions) -> Result<()> {
        if !self.source_path.exists() {
            return Err(self.invalid_target("source file is missing"));
        }
        if !self.source_path.is_file() {
            return Err(self.invalid_target("source is not a regular file"));
        }
        if self.backup_path.is_dir() {
            return Err(self.invalid_target("backup slot is a directory"));
        }

        if let Some(parent) = self.backup_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| TrackingError::io("create directory", parent, e))?;
        }

        permissions::copy_with_metadata(&self.source_path, &self.backup_path, options)
    }

    /// Copies the backup slot over the live file, unconditionally.
    ///
    /// # Errors
    ///
    /// - [`TrackingError::NoBackup`] if the slot does not hold a regular file
    /// - [`TrackingError::Io`] if the copy fails
    pub fn copy_from_backup(&self, options: CopyOptions) -> Result<()> {
        if !self.has_backup() {
            return Err(TrackingError::NoBackup(self.filename.clone()));
        }
        permissions::copy_with_metadata(&self.backup_path, &self.source_path, options)
    }

    /// Whether the backup slot currently holds a regular file.
    #[must_use]
    pub fn has_backup(&self) -> bool {
        self.backup_path.is_file()
    }

    /// Whether the live file is present and is a regular file.
    #[must_use]
    pub fn source_exists(&self) -> bool {
        self.source_path.is_file()
    }

    #[must_use]
    pub fn matches_hash(&self, hash: &str) -> bool {
        self.content_hash == hash
    }

    /// Records a new fingerprint, taking size and mtime from `stat_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if `stat_path` metadata cannot be read.
    pub fn refresh(&mut self, content_hash: String, stat_path: &Path) -> Result<()> {
        let (size_bytes, last_modified) = read_stat(stat_path)?;
        self.content_hash = content_hash;
        self.size_bytes = size_bytes;
        self.last_modified = last_modified;
        Ok(())
    }

    fn invalid_target(&self, reason: &str) -> TrackingError {
        TrackingError::InvalidBackupTarget {
            filename: self.filename.clone(),
            reason: reason.to_string(),
        }
    }
}

/// Record shape written by the first generation of the tool: a bare list of
/// these, with a `ctime`-style timestamp and `backup_path` naming the backup
/// directory rather than the slot.
#[derive(Debug, Deserialize)]
pub(crate) struct LegacyRecord {
    filename: String,
    path: PathBuf,
    #[serde(deserialize_with = "deserialize_digest")]
    hash: String,
    size: u64,
    #[serde(deserialize_with = "deserialize_lenient_timestamp")]
    last_modified: DateTime<Utc>,
    backup_path: PathBuf,
}

impl From<LegacyRecord> for TrackedFile {
    fn from(record: LegacyRecord) -> Self {
        let backup_path = if record.backup_path.file_name() == Some(std::ffi::OsStr::new(&record.filename)) {
            record.backup_path
        } else {
            record.backup_path.join(&record.filename)
        };
        Self {
            filename: record.filename,
            source_path: record.path,
            content_hash: record.hash,
            size_bytes: record.size,
            last_modified: record.last_modified,
            backup_path,
        }
    }
}

fn deserialize_digest<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let digest = String::deserialize(deserializer)?;
    if hash::is_digest(&digest) {
        Ok(digest.to_ascii_lowercase())
    } else {
        Err(serde::de::Error::custom(format!(
            "'{digest}' is not a hex SHA-256 digest"
        )))
    }
}

/// Accepts RFC 3339 or `ctime` text such as `Mon Oct  6 10:00:00 2026`,
/// the latter read as local time.
fn deserialize_lenient_timestamp<'de, D>(deserializer: D) -> std::result::Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    parse_timestamp(&text).ok_or_else(|| {
        serde::de::Error::custom(format!("unrecognised timestamp '{text}'"))
    })
}

fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text.trim()) {
        return Some(parsed.with_timezone(&Utc));
    }
    // Weekday is not checked against the date
    let fields: Vec<&str> = text.split_whitespace().collect();
    let [_weekday, date @ ..] = fields.as_slice() else {
        return None;
    };
    let naive = NaiveDateTime::parse_from_str(&date.join(" "), "%b %e %H:%M:%S %Y").ok()?;
    Some(
        naive
            .and_local_timezone(Local)
            .earliest()
            .map_or_else(|| naive.and_utc(), |t| t.with_timezone(&Utc)),
    )
}

fn read_stat(path: &Path) -> Result<(u64, DateTime<Utc>)> {
    let metadata = fs::metadata(path).map_err(|e| TrackingError::io("read metadata of", path, e))?;
    let modified = metadata
        .modified()
        .map_err(|e| TrackingError::io("read modification time of", path, e))?;
    Ok((metadata.len(), DateTime::<Utc>::from(modified)))
}
