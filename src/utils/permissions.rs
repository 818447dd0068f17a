use crate::tracking::errors::{Result, TrackingError};
use filetime::FileTime;
use std::fs;
use std::path::Path;

/// Cross-platform file permissions handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilePermissions {
    mode: u32,
}

impl FilePermissions {
    /// Create permissions from a raw mode value
    #[must_use]
    pub const fn from_mode(mode: u32) -> Self {
        Self { mode }
    }

    /// Read permissions from file metadata
    #[must_use]
    pub fn from_metadata(metadata: &fs::Metadata) -> Self {
        #[cfg(unix)]
        {
            use std::os::unix::fs::MetadataExt;
            Self::from_mode(metadata.mode())
        }

        #[cfg(not(unix))]
        {
            // Read-only flag is the only bit we can carry across
            let mode = if metadata.permissions().readonly() {
                0o444
            } else {
                0o644
            };
            Self::from_mode(mode)
        }
    }

    /// Apply permissions to a file
    ///
    /// # Errors
    ///
    /// Returns an error if the permissions cannot be set.
    pub fn apply_to_path(&self, path: &Path) -> Result<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = fs::Permissions::from_mode(self.mode);
            fs::set_permissions(path, permissions)
                .map_err(|e| TrackingError::io("set permissions on", path, e))?;
        }

        #[cfg(not(unix))]
        {
            let is_readonly = (self.mode & 0o200) == 0;
            let mut permissions = fs::metadata(path)
                .map_err(|e| TrackingError::io("read metadata of", path, e))?
                .permissions();
            permissions.set_readonly(is_readonly);
            fs::set_permissions(path, permissions)
                .map_err(|e| TrackingError::io("set permissions on", path, e))?;
        }

        Ok(())
    }
}

/// Which metadata travels with a copied file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyOptions {
    /// Carry permission bits over to the destination
    pub preserve_permissions: bool,
    /// Carry the modification time over to the destination
    pub preserve_mtime: bool,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            preserve_permissions: true,
            preserve_mtime: true,
        }
    }
}

/// Copies `src` to `dst`, overwriting `dst`, then applies the metadata
/// selected by `options`.
///
/// # Errors
///
/// Returns [`TrackingError::Io`] if the copy or any metadata update fails.
pub fn copy_with_metadata(src: &Path, dst: &Path, options: CopyOptions) -> Result<()> {
    let metadata = fs::metadata(src).map_err(|e| TrackingError::io("read metadata of", src, e))?;

    // fs::copy cannot open a read-only destination for writing
    #[cfg(unix)]
    {
        if let Ok(existing) = fs::metadata(dst)
            && existing.is_file()
            && existing.permissions().readonly()
        {
            FilePermissions::from_mode(0o600).apply_to_path(dst)?;
        }
    }

    fs::copy(src, dst).map_err(|e| TrackingError::io("copy", src, e))?;

    if options.preserve_mtime {
        let mtime = FileTime::from_last_modification_time(&metadata);
        filetime::set_file_mtime(dst, mtime)
            .map_err(|e| TrackingError::io("set modification time on", dst, e))?;
    }

    if options.preserve_permissions {
        FilePermissions::from_metadata(&metadata).apply_to_path(dst)?;
    }

    Ok(())
}
