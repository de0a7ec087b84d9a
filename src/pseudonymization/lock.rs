//! Exclusive lock on a mapping directory
//!
//! Mapping files are rewritten in full on every flush, so two runs against
//! the same directory would silently drop each other's new entries. The lock
//! is an advisory `flock` on a marker file and is released on drop.

use crate::domain::StoreError;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

/// Name of the lock file inside the mapping directory
pub const LOCK_FILE_NAME: &str = ".veil.lock";

/// Held for the lifetime of a run
#[derive(Debug)]
pub struct MappingLock {
    file: File,
    path: PathBuf,
}

impl MappingLock {
    /// Take the lock without waiting
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Locked`] if another process (or another handle
    /// in this process) holds it, and [`StoreError::Io`] if the lock file
    /// cannot be created.
    pub fn acquire(dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;
        let path = dir.join(LOCK_FILE_NAME);

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| StoreError::io(&path, e))?;

        fs2::FileExt::try_lock_exclusive(&file).map_err(|e| StoreError::Locked {
            path: dir.to_path_buf(),
            message: e.to_string(),
        })?;

        tracing::debug!(path = %path.display(), "Acquired mapping directory lock");
        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for MappingLock {
    fn drop(&mut self) {
        if let Err(e) = fs2::FileExt::unlock(&self.file) {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to release mapping lock");
        }
    }
}
