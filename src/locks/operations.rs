//! Marker acquisition, inspection, and clearing operations.

use super::guard::MarkerGuard;
use super::marker::MarkerInfo;
use super::types::Acquisition;
use crate::error::{Result, RunError};
use chrono::Utc;
use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

/// Try to take the lock marker.
///
/// The marker is created exclusively: if anything already exists at `path`
/// the call reports [`Acquisition::Held`] and leaves it untouched.
///
/// # Returns
///
/// * `Ok(Acquisition::Acquired)` - Marker created, guard returned
/// * `Ok(Acquisition::Held)` - Another run holds the marker
/// * `Err(RunError::LockError)` - Marker could not be created (exit code 3)
pub fn acquire_marker(path: &Path, stale_minutes: u32) -> Result<Acquisition> {
    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(_file) => {
            debug!(path = %path.display(), "lock marker created");
            Ok(Acquisition::Acquired(MarkerGuard::new(path.to_path_buf())))
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            // The holder may finish between the failed create and this read.
            let info = MarkerInfo::from_file(path, stale_minutes)
                .unwrap_or_else(|_| MarkerInfo::from_created_at(path, Utc::now(), stale_minutes));
            Ok(Acquisition::Held(info))
        }
        Err(e) => Err(RunError::LockError(format!(
            "failed to create lock marker '{}': {}",
            path.display(),
            e
        ))),
    }
}

/// Inspect the marker without modifying it.
///
/// Returns `Ok(None)` when no marker exists.
pub fn marker_status(path: &Path, stale_minutes: u32) -> Result<Option<MarkerInfo>> {
    match fs::symlink_metadata(path) {
        Ok(_) => MarkerInfo::from_file(path, stale_minutes).map(Some),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(RunError::LockError(format!(
            "failed to inspect lock marker '{}': {}",
            path.display(),
            e
        ))),
    }
}

/// Remove a marker left behind by another run.
///
/// The caller is responsible for verifying that clearing the marker is
/// appropriate (e.g., checking --force).
///
/// # Returns
///
/// * `Ok(MarkerInfo)` - Information about the cleared marker
/// * `Err(RunError::UserError)` - No marker exists
/// * `Err(RunError::LockError)` - Marker could not be removed
pub fn clear_marker(path: &Path, stale_minutes: u32) -> Result<MarkerInfo> {
    let info = marker_status(path, stale_minutes)?.ok_or_else(|| {
        RunError::UserError(format!("no lock marker exists at: {}", path.display()))
    })?;

    fs::remove_file(path).map_err(|e| {
        RunError::LockError(format!(
            "failed to clear lock marker '{}': {}",
            path.display(),
            e
        ))
    })?;

    Ok(info)
}
