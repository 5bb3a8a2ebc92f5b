//! File-backed credential store.

use bootstrap_core::util::fs::{ensure_private_dir, is_owner_only, slurp, write_restricted};
use bootstrap_types::{BootstrapError, CredentialStore, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Stores each secret as a plain-text file with mode `0600`.
///
/// Parent directories are created `0700` on first write. Writes go through a
/// temp file in the same directory and a rename, so an artifact is either
/// absent or complete and restricted.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileStore;

impl FileStore {
    /// Create a file store.
    pub fn new() -> Self {
        Self
    }
}

impl CredentialStore for FileStore {
    fn exists(&self, path: &Path) -> Result<bool> {
        match fs::symlink_metadata(path) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(BootstrapError::unwritable(path, e)),
        }
    }

    fn read(&self, path: &Path) -> Result<String> {
        slurp(path)
    }

    fn write(&self, path: &Path, value: &str) -> Result<()> {
        let parent = path.parent().ok_or_else(|| {
            BootstrapError::Validation(format!("Artifact path has no parent: {}", path.display()))
        })?;
        ensure_private_dir(parent)?;
        write_restricted(path, value.as_bytes())
    }

    fn is_restricted(&self, path: &Path) -> Result<bool> {
        is_owner_only(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_creates_dir_and_restricts() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("secrets").join("jwt_secret.txt");
        let store = FileStore::new();

        assert!(!store.exists(&path).unwrap());
        store.write(&path, "abc123").unwrap();

        assert!(store.exists(&path).unwrap());
        assert!(store.is_restricted(&path).unwrap());
        assert_eq!(store.read(&path).unwrap(), "abc123");
    }
}
