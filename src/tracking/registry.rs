//! Persisted registry of tracked files for one directory.
//!
//! The registry lives in a reserved metadata directory inside the watched
//! directory. That directory holds one JSON document keyed by filename and
//! one backup slot per tracked file:
//!
//! ```text
//! <watched>/
//!   notes.txt
//!   .tracking/
//!     tracking_files.json
//!     notes.txt            <- backup slot
//! ```
//!
//! All mutating operations take `&mut self`, so whoever owns the registry is
//! its only writer. Nothing guards against a second process working on the
//! same directory; the last `save` wins.

use super::errors::{Result, TrackingError};
use super::file::{LegacyRecord, TrackedFile};
use crate::utils::permissions::CopyOptions;
use crate::{METADATA_DIR, REGISTRY_FILE};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use tracing::{Level, debug, info, span, warn};

/// Layout and copy behaviour of a registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryOptions {
    /// Name of the metadata directory inside the watched directory
    pub metadata_dir: String,
    /// Name of the registry document inside the metadata directory
    pub registry_file: String,
    /// Metadata carried across backup and restore copies
    pub copy: CopyOptions,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            metadata_dir: METADATA_DIR.to_string(),
            registry_file: REGISTRY_FILE.to_string(),
            copy: CopyOptions::default(),
        }
    }
}

/// Per-file results of a batch backup or restore.
///
/// Batches are best-effort: a failure on one file never undoes the copies
/// already made for the others.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Entries copied successfully, in request order
    pub succeeded: Vec<TrackedFile>,
    /// Names with nothing to restore from
    pub skipped: Vec<String>,
    /// Per-file failures
    pub failed: Vec<TrackingError>,
}

impl BatchOutcome {
    /// True when no file in the batch failed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Shapes of registry document accepted by [`TrackingRegistry::load`].
#[derive(Deserialize)]
#[serde(untagged)]
enum RegistryDocument {
    Keyed(BTreeMap<String, TrackedFile>),
    // First-generation layout: a bare list of records
    Legacy(Vec<LegacyRecord>),
}

/// The tracked state of one directory.
#[derive(Debug, Clone)]
pub struct TrackingRegistry {
    files: BTreeMap<String, TrackedFile>,
    watched_directory: PathBuf,
    metadata_directory: PathBuf,
    registry_file_path: PathBuf,
    copy_options: CopyOptions,
}

impl TrackingRegistry {
    /// Opens the registry for `directory` with default options.
    ///
    /// # Errors
    ///
    /// See [`TrackingRegistry::locate_with`].
    pub fn locate(directory: &Path) -> Result<Self> {
        Self::locate_with(directory, &RegistryOptions::default())
    }

    /// Opens the registry for `directory`, creating the metadata directory
    /// and an empty registry document if either is missing.
    ///
    /// The returned registry has no files in memory; call
    /// [`load`](Self::load) to read them.
    ///
    /// # Errors
    ///
    /// - [`TrackingError::InvalidDirectory`] if `directory` is missing or a file
    /// - [`TrackingError::Io`] if the metadata cannot be created
    pub fn locate_with(directory: &Path, options: &RegistryOptions) -> Result<Self> {
        let registry = Self::with_layout(directory, options)?;

        if !registry.metadata_directory.is_dir() {
            info!(path = %registry.metadata_directory.display(), "creating metadata directory");
            fs::create_dir_all(&registry.metadata_directory).map_err(|e| {
                TrackingError::io("create directory", &registry.metadata_directory, e)
            })?;
        }
        if !registry.registry_file_path.exists() {
            info!(path = %registry.registry_file_path.display(), "creating empty registry file");
            registry.save()?;
        }

        Ok(registry)
    }

    /// Sets up tracking for `directory` with default options.
    ///
    /// # Errors
    ///
    /// See [`TrackingRegistry::initialize_with`].
    pub fn initialize(directory: &Path) -> Result<Self> {
        Self::initialize_with(directory, &RegistryOptions::default())
    }

    /// Creates the metadata directory and writes a fresh, empty registry
    /// document, discarding any registry already on disk.
    ///
    /// # Errors
    ///
    /// - [`TrackingError::InvalidDirectory`] if `directory` is missing or a file
    /// - [`TrackingError::Io`] if any filesystem step fails
    pub fn initialize_with(directory: &Path, options: &RegistryOptions) -> Result<Self> {
        let registry = Self::with_layout(directory, options)?;

        fs::create_dir_all(&registry.metadata_directory).map_err(|e| {
            TrackingError::io("create directory", &registry.metadata_directory, e)
        })?;
        if registry.registry_file_path.exists() {
            warn!(
                path = %registry.registry_file_path.display(),
                "overwriting existing registry"
            );
        }
        registry.save()?;

        if !registry.is_valid() {
            return Err(TrackingError::InvalidState {
                directory: registry.watched_directory,
            });
        }

        info!(directory = %registry.watched_directory.display(), "initialized tracking");
        Ok(registry)
    }

    fn with_layout(directory: &Path, options: &RegistryOptions) -> Result<Self> {
        if !directory.is_dir() {
            return Err(TrackingError::InvalidDirectory(directory.to_path_buf()));
        }
        let watched_directory = std::path::absolute(directory)
            .map_err(|e| TrackingError::io("resolve", directory, e))?;
        let metadata_directory = watched_directory.join(&options.metadata_dir);
        let registry_file_path = metadata_directory.join(&options.registry_file);

        Ok(Self {
            files: BTreeMap::new(),
            watched_directory,
            metadata_directory,
            registry_file_path,
            copy_options: options.copy,
        })
    }

    /// A registry is valid when the watched directory is a directory and the
    /// registry document is a regular file.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.watched_directory.is_dir() && self.registry_file_path.is_file()
    }

    fn ensure_valid(&self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(TrackingError::InvalidState {
                directory: self.watched_directory.clone(),
            })
        }
    }

    /// Rejects the whole request if any name is unknown.
    fn ensure_tracked<S: AsRef<str>>(&self, filenames: &[S]) -> Result<()> {
        match filenames
            .iter()
            .map(AsRef::as_ref)
            .find(|name| !self.files.contains_key(*name))
        {
            Some(unknown) => Err(TrackingError::UntrackedFile(unknown.to_string())),
            None => Ok(()),
        }
    }

    /// Adds `filename` (relative to the watched directory) to the registry.
    ///
    /// Tracking an already tracked name returns the existing entry without
    /// re-hashing. Only in-memory state changes; call [`save`](Self::save)
    /// to persist.
    ///
    /// # Errors
    ///
    /// - [`TrackingError::InvalidState`] if the registry is not valid
    /// - [`TrackingError::UntrackableFile`] if the name is not a plain file
    ///   name, is reserved, does not exist, or is a directory
    /// - [`TrackingError::Io`] if the file cannot be hashed
    pub fn track(&mut self, filename: &str) -> Result<&TrackedFile> {
        self.ensure_valid()?;

        if self.files.contains_key(filename) {
            debug!(filename, "already tracked");
        } else {
            let file = self.build_entry(filename)?;
            info!(filename, hash = %file.content_hash, "tracking file");
            self.files.insert(filename.to_string(), file);
        }

        self.files
            .get(filename)
            .ok_or_else(|| TrackingError::UntrackedFile(filename.to_string()))
    }

    fn build_entry(&self, filename: &str) -> Result<TrackedFile> {
        let untrackable = |reason: &str| TrackingError::UntrackableFile {
            filename: filename.to_string(),
            reason: reason.to_string(),
        };

        let mut components = Path::new(filename).components();
        let is_plain_name = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(name)), None) if name == filename
        );
        if !is_plain_name {
            return Err(untrackable("expected a file name inside the tracked directory"));
        }
        if filename == self.metadata_dir_name() {
            return Err(untrackable("name is reserved for tracking metadata"));
        }
        if self
            .registry_file_path
            .file_name()
            .is_some_and(|name| name == filename)
        {
            return Err(untrackable("backup slot would overwrite the registry file"));
        }

        let path = self.watched_directory.join(filename);
        if !path.exists() {
            return Err(untrackable("file does not exist"));
        }
        if path.is_dir() {
            return Err(untrackable("path is a directory"));
        }

        TrackedFile::from_path(&path, &self.metadata_directory)?
            .ok_or_else(|| untrackable("not a regular file"))
    }

    fn metadata_dir_name(&self) -> &str {
        self.metadata_directory
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
    }

    /// Copies each named file into its backup slot and refreshes its hash,
    /// then saves the registry.
    ///
    /// Every name is checked before anything is copied, so an unknown name
    /// leaves the filesystem untouched. Per-file failures are collected in
    /// the outcome.
    ///
    /// # Errors
    ///
    /// - [`TrackingError::InvalidState`] if the registry is not valid
    /// - [`TrackingError::UntrackedFile`] for the first unknown name
    /// - any [`save`](Self::save) failure after the copies
    pub fn backup<S: AsRef<str>>(&mut self, filenames: &[S]) -> Result<BatchOutcome> {
        let _span = span!(Level::DEBUG, "backup", count = filenames.len()).entered();
        self.ensure_valid()?;
        self.ensure_tracked(filenames)?;

        let mut outcome = BatchOutcome::default();
        let mut seen = BTreeSet::new();
        for name in filenames.iter().map(AsRef::as_ref) {
            if !seen.insert(name) {
                continue;
            }
            match self.backup_one(name) {
                Ok(file) => {
                    debug!(filename = name, hash = %file.content_hash, "backed up");
                    outcome.succeeded.push(file);
                }
                Err(e) => {
                    warn!(filename = name, error = %e, "backup failed");
                    outcome.failed.push(e);
                }
            }
        }

        self.save()?;
        Ok(outcome)
    }

    /// Backs up every tracked file.
    ///
    /// # Errors
    ///
    /// See [`backup`](Self::backup).
    pub fn backup_all(&mut self) -> Result<BatchOutcome> {
        let names = self.filenames();
        self.backup(&names)
    }

    fn backup_one(&mut self, filename: &str) -> Result<TrackedFile> {
        let options = self.copy_options;
        let file = self
            .files
            .get_mut(filename)
            .ok_or_else(|| TrackingError::UntrackedFile(filename.to_string()))?;

        file.copy_to_backup(options)?;
        // Hash the slot itself so the stored hash always describes the backup
        let hash = TrackedFile::compute_hash(&file.backup_path)?;
        let source = file.source_path.clone();
        file.refresh(hash, &source)?;

        Ok(file.clone())
    }

    /// Copies each named file's backup over its live file.
    ///
    /// Files that were never backed up are reported in
    /// [`BatchOutcome::skipped`]. Stored hashes are not touched.
    ///
    /// # Errors
    ///
    /// - [`TrackingError::InvalidState`] if the registry is not valid
    /// - [`TrackingError::UntrackedFile`] for the first unknown name
    pub fn restore<S: AsRef<str>>(&self, filenames: &[S]) -> Result<BatchOutcome> {
        let _span = span!(Level::DEBUG, "restore", count = filenames.len()).entered();
        self.ensure_valid()?;
        self.ensure_tracked(filenames)?;

        let mut outcome = BatchOutcome::default();
        let mut seen = BTreeSet::new();
        for name in filenames.iter().map(AsRef::as_ref) {
            if !seen.insert(name) {
                continue;
            }
            let Some(file) = self.files.get(name) else {
                continue;
            };
            match file.copy_from_backup(self.copy_options) {
                Ok(()) => {
                    debug!(filename = name, "restored");
                    outcome.succeeded.push(file.clone());
                }
                Err(TrackingError::NoBackup(filename)) => {
                    debug!(filename = %filename, "no backup to restore, skipping");
                    outcome.skipped.push(filename);
                }
                Err(e) => {
                    warn!(filename = name, error = %e, "restore failed");
                    outcome.failed.push(e);
                }
            }
        }

        Ok(outcome)
    }

    /// Restores every tracked file that has a backup.
    ///
    /// # Errors
    ///
    /// See [`restore`](Self::restore).
    pub fn restore_all(&self) -> Result<BatchOutcome> {
        self.restore(&self.filenames())
    }

    /// Whether the live content of `filename` still hashes to the stored hash.
    ///
    /// # Errors
    ///
    /// - [`TrackingError::UntrackedFile`] if the name is unknown
    /// - [`TrackingError::Io`] if the live file cannot be read
    pub fn matches_backup(&self, filename: &str) -> Result<bool> {
        let file = self
            .files
            .get(filename)
            .ok_or_else(|| TrackingError::UntrackedFile(filename.to_string()))?;
        let live_hash = TrackedFile::compute_hash(&file.source_path)?;
        Ok(file.matches_hash(&live_hash))
    }

    /// Tracked files whose live content no longer matches the stored hash.
    ///
    /// Files whose source is missing or has become a directory are left out.
    #[must_use]
    pub fn check(&self) -> Vec<TrackedFile> {
        self.files
            .values()
            .filter(|file| file.source_exists())
            .filter_map(|file| match TrackedFile::compute_hash(&file.source_path) {
                Ok(hash) => (!file.matches_hash(&hash)).then(|| file.clone()),
                Err(e) => {
                    warn!(filename = %file.filename, error = %e, "skipping unreadable file");
                    None
                }
            })
            .collect()
    }

    /// Writes the full filename → entry mapping to the registry file.
    ///
    /// The document is written to a temporary file in the metadata directory
    /// and renamed into place.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError::Io`] on any write failure.
    pub fn save(&self) -> Result<()> {
        let path = &self.registry_file_path;
        let data = serde_json::to_string_pretty(&self.files)
            .map_err(|e| TrackingError::io("serialize", path, std::io::Error::other(e)))?;

        let mut temp = tempfile::NamedTempFile::new_in(&self.metadata_directory)
            .map_err(|e| TrackingError::io("create temporary file in", &self.metadata_directory, e))?;
        temp.write_all(data.as_bytes())
            .map_err(|e| TrackingError::io("write", temp.path().to_path_buf(), e))?;
        temp.persist(path)
            .map_err(|e| TrackingError::io("write", path, e.error))?;

        debug!(path = %path.display(), entries = self.files.len(), "saved registry");
        Ok(())
    }

    /// Replaces the in-memory entries with the registry file's contents and
    /// returns how many were loaded.
    ///
    /// On failure the in-memory entries are left as they were.
    ///
    /// # Errors
    ///
    /// - [`TrackingError::Io`] if the file cannot be read
    /// - [`TrackingError::CorruptRegistry`] if it cannot be parsed
    pub fn load(&mut self) -> Result<usize> {
        let path = &self.registry_file_path;
        let data = fs::read_to_string(path).map_err(|e| TrackingError::io("read", path, e))?;

        let files = if data.trim().is_empty() {
            BTreeMap::new()
        } else {
            let document: RegistryDocument =
                serde_json::from_str(&data).map_err(|source| TrackingError::CorruptRegistry {
                    path: path.clone(),
                    source,
                })?;
            match document {
                RegistryDocument::Keyed(files) => files
                    .into_iter()
                    .map(|(key, mut file)| {
                        if key != file.filename {
                            warn!(key = %key, filename = %file.filename, "registry key differs from filename");
                            file.filename.clone_from(&key);
                        }
                        (key, file)
                    })
                    .collect(),
                RegistryDocument::Legacy(list) => list
                    .into_iter()
                    .map(TrackedFile::from)
                    .map(|file| (file.filename.clone(), file))
                    .collect(),
            }
        };

        self.files = files;
        debug!(path = %path.display(), entries = self.files.len(), "loaded registry");
        Ok(self.files.len())
    }

    /// All tracked entries, ordered by filename.
    #[must_use]
    pub const fn files(&self) -> &BTreeMap<String, TrackedFile> {
        &self.files
    }

    #[must_use]
    pub fn get(&self, filename: &str) -> Option<&TrackedFile> {
        self.files.get(filename)
    }

    /// Tracked filenames in order.
    #[must_use]
    pub fn filenames(&self) -> Vec<String> {
        self.files.keys().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    #[must_use]
    pub fn watched_directory(&self) -> &Path {
        &self.watched_directory
    }

    #[must_use]
    pub fn metadata_directory(&self) -> &Path {
        &self.metadata_directory
    }

    #[must_use]
    pub fn registry_file_path(&self) -> &Path {
        &self.registry_file_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::{TempDir, tempdir};

    fn setup() -> Result<(TempDir, TrackingRegistry)> {
        let dir = tempdir()?;
        let registry = TrackingRegistry::initialize(dir.path())?;
        Ok((dir, registry))
    }

    #[test]
    fn test_initialize_creates_layout() -> Result<()> {
        let (dir, registry) = setup()?;
        assert!(registry.is_valid());
        assert!(registry.is_empty());
        assert!(dir.path().join(METADATA_DIR).is_dir());
        assert_eq!(
            fs::read_to_string(dir.path().join(METADATA_DIR).join(REGISTRY_FILE))?.trim(),
            "{}"
        );
        Ok(())
    }

    #[test]
    fn test_initialize_rejects_file_and_missing() -> Result<()> {
        let dir = tempdir()?;
        let file = dir.path().join("plain.txt");
        fs::write(&file, "x")?;

        assert!(matches!(
            TrackingRegistry::initialize(&file),
            Err(TrackingError::InvalidDirectory(_))
        ));
        assert!(matches!(
            TrackingRegistry::initialize(&dir.path().join("missing")),
            Err(TrackingError::InvalidDirectory(_))
        ));
        Ok(())
    }

    #[test]
    fn test_initialize_discards_previous_registry() -> Result<()> {
        let (dir, mut registry) = setup()?;
        fs::write(dir.path().join("a.txt"), "a")?;
        registry.track("a.txt")?;
        registry.save()?;

        let mut fresh = TrackingRegistry::initialize(dir.path())?;
        assert_eq!(fresh.load()?, 0);
        Ok(())
    }

    #[test]
    fn test_locate_lazily_creates_metadata() -> Result<()> {
        let dir = tempdir()?;
        let mut registry = TrackingRegistry::locate(dir.path())?;
        assert!(registry.is_valid());
        assert_eq!(registry.load()?, 0);
        Ok(())
    }

    #[test]
    fn test_locate_keeps_existing_registry() -> Result<()> {
        let (dir, mut registry) = setup()?;
        fs::write(dir.path().join("a.txt"), "a")?;
        registry.track("a.txt")?;
        registry.save()?;

        let mut located = TrackingRegistry::locate(dir.path())?;
        assert!(located.is_empty());
        assert_eq!(located.load()?, 1);
        assert_eq!(located.files(), registry.files());
        Ok(())
    }

    #[test]
    fn test_track_is_idempotent() -> Result<()> {
        let (dir, mut registry) = setup()?;
        fs::write(dir.path().join("a.txt"), "one")?;

        let first = registry.track("a.txt")?.clone();
        fs::write(dir.path().join("a.txt"), "two")?;
        let second = registry.track("a.txt")?.clone();

        assert_eq!(first, second);
        assert_eq!(registry.len(), 1);
        Ok(())
    }

    #[test]
    fn test_track_rejects_untrackable_names() -> Result<()> {
        let (dir, mut registry) = setup()?;
        fs::create_dir(dir.path().join("sub"))?;
        fs::write(dir.path().join("sub").join("inner.txt"), "x")?;

        for name in ["missing.txt", "sub", "sub/inner.txt", "..", METADATA_DIR, REGISTRY_FILE, ""] {
            let err = registry.track(name).unwrap_err();
            assert!(
                matches!(err, TrackingError::UntrackableFile { .. }),
                "{name:?} gave {err:?}"
            );
        }
        assert!(registry.is_empty());
        Ok(())
    }

    #[test]
    fn test_track_requires_valid_registry() -> Result<()> {
        let (dir, mut registry) = setup()?;
        fs::write(dir.path().join("a.txt"), "a")?;
        fs::remove_dir_all(dir.path().join(METADATA_DIR))?;

        assert!(!registry.is_valid());
        assert!(matches!(
            registry.track("a.txt"),
            Err(TrackingError::InvalidState { .. })
        ));
        assert!(matches!(
            registry.backup(&["a.txt"]),
            Err(TrackingError::InvalidState { .. })
        ));
        assert!(matches!(
            registry.restore(&["a.txt"]),
            Err(TrackingError::InvalidState { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_backup_reports_invalid_target_and_continues() -> Result<()> {
        let (dir, mut registry) = setup()?;
        fs::write(dir.path().join("a.txt"), "a")?;
        fs::write(dir.path().join("b.txt"), "b")?;
        registry.track("a.txt")?;
        registry.track("b.txt")?;
        fs::remove_file(dir.path().join("a.txt"))?;

        let outcome = registry.backup(&["a.txt", "b.txt"])?;
        assert!(!outcome.is_complete());
        assert_eq!(outcome.failed.len(), 1);
        assert!(matches!(
            outcome.failed[0],
            TrackingError::InvalidBackupTarget { ref filename, .. } if filename == "a.txt"
        ));
        assert_eq!(outcome.succeeded.len(), 1);
        assert_eq!(outcome.succeeded[0].filename, "b.txt");
        assert!(dir.path().join(METADATA_DIR).join("b.txt").is_file());
        Ok(())
    }

    #[test]
    fn test_duplicate_names_in_batch_are_processed_once() -> Result<()> {
        let (dir, mut registry) = setup()?;
        fs::write(dir.path().join("a.txt"), "a")?;
        registry.track("a.txt")?;

        let outcome = registry.backup(&["a.txt", "a.txt"])?;
        assert_eq!(outcome.succeeded.len(), 1);
        Ok(())
    }

    #[test]
    fn test_load_corrupt_registry_keeps_memory() -> Result<()> {
        let (dir, mut registry) = setup()?;
        fs::write(dir.path().join("a.txt"), "a")?;
        registry.track("a.txt")?;

        fs::write(registry.registry_file_path(), "{ not json")?;
        let err = registry.load().unwrap_err();
        assert!(matches!(err, TrackingError::CorruptRegistry { .. }));
        assert_eq!(registry.len(), 1);
        Ok(())
    }

    #[test]
    fn test_load_missing_registry_is_io_error() -> Result<()> {
        let (_dir, mut registry) = setup()?;
        fs::remove_file(registry.registry_file_path())?;
        assert!(matches!(registry.load(), Err(TrackingError::Io { .. })));
        Ok(())
    }

    #[test]
    fn test_load_legacy_list_and_empty_documents() -> Result<()> {
        let (dir, mut registry) = setup()?;
        fs::write(dir.path().join("a.txt"), "a")?;
        let entry = registry.track("a.txt")?.clone();

        let legacy = serde_json::to_string(&vec![entry.clone()])?;
        fs::write(registry.registry_file_path(), legacy)?;
        let mut reloaded = TrackingRegistry::locate(dir.path())?;
        assert_eq!(reloaded.load()?, 1);
        assert_eq!(reloaded.get("a.txt"), Some(&entry));

        fs::write(registry.registry_file_path(), "")?;
        assert_eq!(reloaded.load()?, 0);
        Ok(())
    }

    #[test]
    fn test_load_first_generation_document() -> Result<()> {
        let (dir, mut registry) = setup()?;
        fs::write(dir.path().join("notes.txt"), "hello")?;
        let metadata = registry.metadata_directory().to_path_buf();
        fs::write(metadata.join("notes.txt"), "hello")?;

        let document = serde_json::json!([{
            "filename": "notes.txt",
            "path": dir.path().join("notes.txt"),
            "hash": crate::utils::hash::hash_bytes(b"hello"),
            "size": 5,
            "last_modified": "Mon Oct 16 10:00:00 2026",
            "backup_path": metadata,
        }]);
        fs::write(
            registry.registry_file_path(),
            serde_json::to_string_pretty(&document)?,
        )?;

        assert_eq!(registry.load()?, 1);
        let file = registry.get("notes.txt").unwrap();
        assert_eq!(file.backup_path, metadata.join("notes.txt"));
        assert!(file.has_backup());
        assert!(registry.matches_backup("notes.txt")?);
        assert!(registry.check().is_empty());

        // Saving rewrites it in the keyed layout
        registry.save()?;
        let saved: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(registry.registry_file_path())?)?;
        assert!(saved.get("notes.txt").is_some());
        Ok(())
    }

    #[test]
    fn test_load_rejects_malformed_hash() -> Result<()> {
        let (dir, mut registry) = setup()?;
        fs::write(dir.path().join("a.txt"), "a")?;
        registry.track("a.txt")?;
        registry.save()?;

        let mut document: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(registry.registry_file_path())?)?;
        document["a.txt"]["hash"] = serde_json::json!("a\u{e9}\u{e9}\u{e9}\u{e9}\u{e9}\u{e9}");
        fs::write(registry.registry_file_path(), document.to_string())?;

        let err = registry.load().unwrap_err();
        assert!(matches!(err, TrackingError::CorruptRegistry { .. }));
        Ok(())
    }

    #[test]
    fn test_check_skips_directories() -> Result<()> {
        let (dir, mut registry) = setup()?;
        fs::write(dir.path().join("a.txt"), "a")?;
        registry.track("a.txt")?;

        fs::remove_file(dir.path().join("a.txt"))?;
        fs::create_dir(dir.path().join("a.txt"))?;
        assert!(registry.check().is_empty());
        Ok(())
    }

    #[test]
    fn test_matches_backup_errors() -> Result<()> {
        let (dir, mut registry) = setup()?;
        assert!(matches!(
            registry.matches_backup("nope"),
            Err(TrackingError::UntrackedFile(ref name)) if name == "nope"
        ));

        fs::write(dir.path().join("a.txt"), "a")?;
        registry.track("a.txt")?;
        fs::remove_file(dir.path().join("a.txt"))?;
        assert!(matches!(
            registry.matches_backup("a.txt"),
            Err(TrackingError::Io { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_custom_layout() -> Result<()> {
        let dir = tempdir()?;
        let options = RegistryOptions {
            metadata_dir: ".backups".to_string(),
            registry_file: "index.json".to_string(),
            copy: CopyOptions::default(),
        };
        let registry = TrackingRegistry::initialize_with(dir.path(), &options)?;
        assert_eq!(
            registry.registry_file_path(),
            std::path::absolute(dir.path())?.join(".backups").join("index.json")
        );
        assert!(registry.is_valid());
        Ok(())
    }
}
