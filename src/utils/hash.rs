use crate::tracking::errors::{Result, TrackingError};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Read size used when streaming a file through the hasher.
pub const CHUNK_SIZE: usize = 4096;

pub fn hash_bytes(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// True if `text` has the shape of a hex SHA-256 digest: 64 ASCII hex digits.
#[must_use]
pub fn is_digest(text: &str) -> bool {
    text.len() == 64 && text.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Streams `path` through SHA-256 in [`CHUNK_SIZE`] reads and returns the
/// lowercase hex digest. The file is never held in memory as a whole.
///
/// # Errors
///
/// Returns [`TrackingError::Io`] if the file cannot be opened or read.
pub fn hash_file(path: &Path) -> Result<String> {
    let mut file = File::open(path).map_err(|e| TrackingError::io("open", path, e))?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; CHUNK_SIZE];

    loop {
        let bytes_read = file
            .read(&mut buffer)
            .map_err(|e| TrackingError::io("read", path, e))?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::tempdir;

    #[test]
    fn test_hash_bytes() {
        let hash1 = hash_bytes(b"Hello, World!");
        assert_eq!(
            hash1,
            "dffd6021bb2bd5b0af676290809ec3a53191dd81c7f70a4b28688a362182986f"
        );
        assert_ne!(hash1, hash_bytes(b"Different data"));
    }

    #[test]
    fn test_is_digest() {
        assert!(is_digest(&hash_bytes(b"x")));
        assert!(is_digest(&"ABCDEF0123456789".repeat(4)));
        assert!(!is_digest("abc123"));
        assert!(!is_digest(&"g".repeat(64)));
        assert!(!is_digest(&format!("a{}", "é".repeat(31))));
    }

    #[test]
    fn test_hash_empty_file() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("empty");
        std::fs::write(&file_path, b"")?;

        assert_eq!(
            hash_file(&file_path)?,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        Ok(())
    }

    #[test]
    fn test_hash_file_spanning_many_chunks() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("big.bin");
        let content: Vec<u8> = (0..CHUNK_SIZE * 3 + 17).map(|i| (i % 251) as u8).collect();
        std::fs::write(&file_path, &content)?;

        assert_eq!(hash_file(&file_path)?, hash_bytes(&content));
        Ok(())
    }

    #[test]
    fn test_hash_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = hash_file(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, TrackingError::Io { operation: "open", .. }));
    }
}
