//! Lock marker inspection.

use crate::error::{Result, RunError};
use chrono::{DateTime, Duration, Utc};
use std::fs;
use std::path::{Path, PathBuf};

/// Information about an existing lock marker.
#[derive(Debug, Clone)]
pub struct MarkerInfo {
    /// The marker file path.
    pub path: PathBuf,

    /// When the marker was created (its modification time).
    pub created_at: DateTime<Utc>,

    /// Whether the marker is older than the stale threshold.
    pub is_stale: bool,
}

impl MarkerInfo {
    /// Build marker info from a known creation time.
    pub fn from_created_at(path: &Path, created_at: DateTime<Utc>, stale_minutes: u32) -> Self {
        let age = Utc::now().signed_duration_since(created_at);
        Self {
            path: path.to_path_buf(),
            created_at,
            is_stale: age.num_minutes() > stale_minutes as i64,
        }
    }

    /// Read marker info from the filesystem.
    pub fn from_file(path: &Path, stale_minutes: u32) -> Result<Self> {
        let metadata = fs::symlink_metadata(path).map_err(|e| {
            RunError::LockError(format!(
                "failed to inspect lock marker '{}': {}",
                path.display(),
                e
            ))
        })?;

        // Platforms without mtime support report the marker as brand new.
        let created_at = metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());

        Ok(Self::from_created_at(path, created_at, stale_minutes))
    }

    /// Calculate the age of the marker.
    pub fn age(&self) -> Duration {
        Utc::now().signed_duration_since(self.created_at)
    }

    /// Format the age as a human-readable string.
    pub fn age_string(&self) -> String {
        let age = self.age();
        let minutes = age.num_minutes().max(0);
        let hours = age.num_hours().max(0);
        let days = age.num_days().max(0);

        if days > 0 {
            format!("{}d {}h", days, hours % 24)
        } else if hours > 0 {
            format!("{}h {}m", hours, minutes % 60)
        } else {
            format!("{}m", minutes)
        }
    }
}

impl std::fmt::Display for MarkerInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (age: {}{})",
            self.path.display(),
            self.age_string(),
            if self.is_stale { ", STALE" } else { "" }
        )
    }
}
