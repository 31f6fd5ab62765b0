//! Advisory locking of collection units
//!
//! Artifacts are single-writer. A second process collecting the same unit
//! would interleave full rewrites and lose chunks, so the collector holds an
//! exclusive fd-lock on `<unit>.lock` for the duration of a run.

use super::store::ResumeError;
use fd_lock::{RwLock, RwLockWriteGuard};
use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Lock file guarding one collection unit
pub struct UnitLock {
    lock: RwLock<File>,
    path: PathBuf,
}

impl UnitLock {
    /// Open (creating if needed) the lock file at `path` without locking it
    pub fn open(path: &Path) -> Result<Self, ResumeError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ResumeError::Io {
                path: parent.to_path_buf(),
                message: e.to_string(),
            })?;
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| ResumeError::Lock(format!("Failed to open lock file: {e}")))?;

        Ok(Self {
            lock: RwLock::new(file),
            path: path.to_path_buf(),
        })
    }

    /// Take the exclusive lock without blocking
    ///
    /// Fails immediately if another holder exists. The lock is released when
    /// the returned guard is dropped.
    pub fn try_hold(&mut self) -> Result<RwLockWriteGuard<'_, File>, ResumeError> {
        let path = self.path.display().to_string();
        self.lock.try_write().map_err(|e| {
            if e.kind() == ErrorKind::WouldBlock {
                ResumeError::Lock(format!(
                    "{path} is held by another collector; only one process may collect a unit"
                ))
            } else {
                ResumeError::Lock(format!("Failed to acquire {path}: {e}"))
            }
        })
    }
}
