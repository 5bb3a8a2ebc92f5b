//! Filesystem utilities.
//!
//! Every artifact the tool writes goes through [`stage_restricted`]: the
//! content lands in a temp file created owner-only in the destination
//! directory and is renamed over the target, so no reader ever observes a
//! partial or group/world-readable file.

use bootstrap_types::{BootstrapError, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

#[cfg(unix)]
use std::os::unix::fs::{DirBuilderExt, PermissionsExt};

/// Mode of credential artifacts and operator documents.
pub const PRIVATE_FILE_MODE: u32 = 0o600;

/// Mode of directories created to hold credential artifacts.
pub const PRIVATE_DIR_MODE: u32 = 0o700;

/// Expand a leading tilde to the home directory.
pub fn expand_path(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();

    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }

    path.to_path_buf()
}

/// Resolve a configured path against an explicit base directory.
pub fn resolve_path(base: impl AsRef<Path>, path: impl AsRef<Path>) -> PathBuf {
    let expanded = expand_path(path);
    if expanded.is_absolute() {
        expanded
    } else {
        base.as_ref().join(expanded)
    }
}

/// Create a directory (and parents) restricted to the owner.
///
/// An existing directory is left untouched.
pub fn ensure_private_dir(dir: impl AsRef<Path>) -> Result<()> {
    let dir = dir.as_ref();
    if dir.is_dir() {
        return Ok(());
    }

    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(PRIVATE_DIR_MODE);

    builder
        .create(dir)
        .map_err(|e| BootstrapError::unwritable(dir, e))?;
    tracing::debug!("Created directory {}", dir.display());
    Ok(())
}

/// An owner-only file written next to its target, not yet visible there.
///
/// Dropping a staged file without committing removes it.
#[derive(Debug)]
pub struct StagedFile {
    temp: NamedTempFile,
    target: PathBuf,
}

impl StagedFile {
    /// Final location of the file.
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Atomically rename the staged content over the target.
    pub fn commit(self) -> Result<PathBuf> {
        let StagedFile { temp, target } = self;
        temp.persist(&target)
            .map_err(|e| BootstrapError::unwritable(&target, e.error))?;

        if let Some(parent) = target.parent() {
            sync_dir(parent);
        }
        Ok(target)
    }
}

/// Write content to a temp file beside `path` with mode `0600`.
pub fn stage_restricted(path: impl AsRef<Path>, contents: &[u8]) -> Result<StagedFile> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => {
            return Err(BootstrapError::Validation(format!(
                "Artifact path has no parent directory: {}",
                path.display()
            )))
        }
    };

    let mut temp = tempfile::Builder::new()
        .prefix(".staged-")
        .tempfile_in(parent)
        .map_err(|e| BootstrapError::unwritable(path, e))?;

    // tempfile already creates 0600; keep it explicit.
    #[cfg(unix)]
    temp.as_file()
        .set_permissions(fs::Permissions::from_mode(PRIVATE_FILE_MODE))
        .map_err(|e| BootstrapError::unwritable(path, e))?;

    temp.write_all(contents)
        .and_then(|_| temp.as_file().sync_all())
        .map_err(|e| BootstrapError::unwritable(path, e))?;

    Ok(StagedFile {
        temp,
        target: path.to_path_buf(),
    })
}

/// Atomically write an owner-only file.
pub fn write_restricted(path: impl AsRef<Path>, contents: &[u8]) -> Result<()> {
    stage_restricted(path, contents)?.commit()?;
    Ok(())
}

/// Permission bits of a file, where the platform has them.
pub fn file_mode(path: impl AsRef<Path>) -> Result<Option<u32>> {
    let metadata = fs::metadata(path)?;

    #[cfg(unix)]
    {
        Ok(Some(metadata.permissions().mode() & 0o777))
    }
    #[cfg(not(unix))]
    {
        let _ = metadata;
        Ok(None)
    }
}

/// Whether a file is inaccessible to group and others.
pub fn is_owner_only(path: impl AsRef<Path>) -> Result<bool> {
    Ok(file_mode(path)?.map_or(true, |mode| mode & 0o077 == 0))
}

/// Read entire file as string (slurp).
pub fn slurp(path: impl AsRef<Path>) -> Result<String> {
    fs::read_to_string(path).map_err(Into::into)
}

/// Remove a file, ignoring a file that is already gone.
pub fn remove_if_exists(path: impl AsRef<Path>) -> Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
        _ => Ok(()),
    }
}

#[cfg(unix)]
fn sync_dir(dir: &Path) {
    if let Err(e) = fs::File::open(dir).and_then(|d| d.sync_all()) {
        tracing::debug!("Could not sync directory {}: {}", dir.display(), e);
    }
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) {}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_restricted_is_owner_only() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("secret.txt");

        write_restricted(&path, b"hunter2").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "hunter2");
        assert!(is_owner_only(&path).unwrap());
        #[cfg(unix)]
        assert_eq!(file_mode(&path).unwrap(), Some(0o600));
    }

    #[test]
    fn test_write_restricted_replaces_loose_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("secret.txt");
        fs::write(&path, "old").unwrap();
        #[cfg(unix)]
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        write_restricted(&path, b"new").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        assert!(is_owner_only(&path).unwrap());
    }

    #[test]
    fn test_dropped_stage_leaves_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.txt");

        let staged = stage_restricted(&path, b"content").unwrap();
        assert_eq!(staged.target(), path.as_path());
        drop(staged);

        assert!(!path.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_stage_in_missing_dir_is_unwritable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("doc.txt");
        let err = stage_restricted(&path, b"x").unwrap_err();
        assert!(matches!(err, BootstrapError::PathUnwritable { .. }));
    }

    #[test]
    fn test_ensure_private_dir() {
        let dir = TempDir::new().unwrap();
        let secrets = dir.path().join("a").join("secrets");
        ensure_private_dir(&secrets).unwrap();
        assert!(secrets.is_dir());
        #[cfg(unix)]
        assert_eq!(
            fs::metadata(&secrets).unwrap().permissions().mode() & 0o777,
            PRIVATE_DIR_MODE
        );
        // Idempotent
        ensure_private_dir(&secrets).unwrap();
    }

    #[test]
    fn test_resolve_path() {
        assert_eq!(resolve_path("/srv/n8n", "secrets"), PathBuf::from("/srv/n8n/secrets"));
        assert_eq!(resolve_path("/srv/n8n", "/etc/n8n"), PathBuf::from("/etc/n8n"));
    }

    #[test]
    fn test_remove_if_exists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gone.txt");
        remove_if_exists(&path).unwrap();
        fs::write(&path, "x").unwrap();
        remove_if_exists(&path).unwrap();
        assert!(!path.exists());
    }
}
