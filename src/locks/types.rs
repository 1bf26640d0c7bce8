//! Lock acquisition outcome.

use super::guard::MarkerGuard;
use super::marker::MarkerInfo;

/// Result of trying to take the lock marker.
#[derive(Debug)]
pub enum Acquisition {
    /// The marker was created; it is removed when the guard drops.
    Acquired(MarkerGuard),
    /// Another run holds the marker. Nothing was modified.
    Held(MarkerInfo),
}
