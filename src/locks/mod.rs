//! Run guard for aigrade-run.
//!
//! A single lock marker file makes sure at most one grader run proceeds at a
//! time.
//!
//! # Marker File
//!
//! The marker is an empty file at the configured `lock_path`. It is created
//! with **create_new** semantics (exclusive create), so the existence check
//! and the creation are one atomic step and two racing instances cannot both
//! acquire it. The parent directory is never created on demand.
//!
//! The marker carries no content. Its modification time is its creation time
//! and is used only to report age and staleness; a stale marker still blocks
//! runs until it is cleared by hand.
//!
//! # RAII Guard
//!
//! A successful acquisition returns a [`MarkerGuard`] that removes the marker
//! when dropped. If deletion fails during drop, a warning is logged but the
//! program does not crash.

mod guard;
mod marker;
mod operations;
mod types;


// Re-export public API
pub use guard::MarkerGuard;
pub use marker::MarkerInfo;
pub use operations::{acquire_marker, clear_marker, marker_status};
pub use types::Acquisition;
