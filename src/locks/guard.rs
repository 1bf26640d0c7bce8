//! RAII guard for the lock marker.

use crate::error::{Result, RunError};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// RAII guard for the lock marker.
///
/// When dropped, the marker file is deleted.
/// If deletion fails, a warning is logged but no panic occurs.
#[derive(Debug)]
pub struct MarkerGuard {
    /// Path to the marker file.
    path: PathBuf,

    /// Whether the marker has been released manually.
    released: bool,
}

impl MarkerGuard {
    pub(super) fn new(path: PathBuf) -> Self {
        Self {
            path,
            released: false,
        }
    }

    /// Get the path to the marker file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the marker now and report removal errors to the caller.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        fs::remove_file(&self.path).map_err(|e| {
            RunError::LockError(format!(
                "failed to remove lock marker '{}': {}",
                self.path.display(),
                e
            ))
        })?;
        debug!(path = %self.path.display(), "lock marker released");
        Ok(())
    }
}

impl Drop for MarkerGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        match fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "lock marker released"),
            Err(e) => warn!(
                path = %self.path.display(),
                error = %e,
                "failed to remove lock marker"
            ),
        }
    }
}
