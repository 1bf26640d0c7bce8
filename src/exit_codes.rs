//! Exit code constants for the aigrade-run CLI.
//!
//! - 0: Success (including "another run holds the marker")
//! - 1: User error (bad config, refused command)
//! - 2: Environment failure (secrets file or runtime activation)
//! - 3: Lock marker could not be created or removed
//! - 127: Grader could not be launched
//! - 128+N: Interrupted by signal N
//!
//! Any other non-zero code is the grader's own exit status, passed through.

/// Successful execution, or nothing to do because a run is in progress.
pub const SUCCESS: i32 = 0;

/// User error: invalid configuration or a refused command.
pub const USER_ERROR: i32 = 1;

/// Secrets file or runtime environment could not be loaded.
pub const ENVIRONMENT_FAILURE: i32 = 2;

/// Lock marker could not be created or removed.
pub const LOCK_FAILURE: i32 = 3;

/// Grader executable could not be started (shell "command not found").
pub const LAUNCH_FAILURE: i32 = 127;

/// Base for signal-induced termination, following shell convention.
pub const SIGNAL_BASE: i32 = 128;

/// Exit code for a run terminated by `signal`.
pub fn for_signal(signal: i32) -> i32 {
    SIGNAL_BASE + signal
}
