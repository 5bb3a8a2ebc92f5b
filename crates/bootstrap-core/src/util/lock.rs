//! Run lock guarding a base directory against concurrent bootstrap runs.

use bootstrap_types::{BootstrapError, Result};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Exclusive lock held for the duration of one run.
///
/// The lock file holds the owning PID and is removed on drop. An interrupted
/// run can leave it behind; [`RunLock::break_stale`] removes it.
#[derive(Debug)]
pub struct RunLock {
    path: PathBuf,
}

impl RunLock {
    /// Lock file name inside the locked directory.
    pub const FILE_NAME: &'static str = ".n8n-bootstrap.lock";

    /// Acquire the lock on `dir`.
    pub fn acquire(dir: impl AsRef<Path>) -> Result<Self> {
        let path = dir.as_ref().join(Self::FILE_NAME);

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => BootstrapError::Locked { path: path.clone() },
                _ => BootstrapError::unwritable(&path, e),
            })?;

        if let Err(e) = writeln!(file, "{}", std::process::id()) {
            let _ = fs::remove_file(&path);
            return Err(BootstrapError::unwritable(&path, e));
        }

        tracing::debug!("Acquired run lock {}", path.display());
        Ok(Self { path })
    }

    /// Remove a lock left behind by an interrupted run.
    ///
    /// Returns whether a lock file was present.
    pub fn break_stale(dir: impl AsRef<Path>) -> Result<bool> {
        let path = dir.as_ref().join(Self::FILE_NAME);
        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::warn!("Removed stale run lock {}", path.display());
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(BootstrapError::unwritable(&path, e)),
        }
    }

    /// Path of the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!("Failed to release run lock {}: {}", self.path.display(), e);
        }
    }
}
