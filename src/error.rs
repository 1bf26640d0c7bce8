//! Error types for the aigrade-run CLI.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for aigrade-run operations.
///
/// Each variant maps to an exit code. `GraderFailed` carries the grader's own
/// status so it can be propagated unchanged.
#[derive(Error, Debug)]
pub enum RunError {
    /// Invalid configuration or a command refused for safety.
    #[error("{0}")]
    UserError(String),

    /// Secrets file or runtime activation failed.
    #[error("environment setup failed: {0}")]
    EnvironmentError(String),

    /// Lock marker could not be created or removed.
    #[error("lock marker failure: {0}")]
    LockError(String),

    /// Grader process could not be started.
    #[error("failed to launch grader: {0}")]
    LaunchError(String),

    /// Grader ran and exited non-zero.
    #[error("grader exited with status {code}")]
    GraderFailed { code: i32 },

    /// A termination signal arrived during the run.
    #[error("interrupted by signal {signal}")]
    Interrupted { signal: i32 },
}

impl RunError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunError::UserError(_) => exit_codes::USER_ERROR,
            RunError::EnvironmentError(_) => exit_codes::ENVIRONMENT_FAILURE,
            RunError::LockError(_) => exit_codes::LOCK_FAILURE,
            RunError::LaunchError(_) => exit_codes::LAUNCH_FAILURE,
            RunError::GraderFailed { code } => *code,
            RunError::Interrupted { signal } => exit_codes::for_signal(*signal),
        }
    }

    /// Whether `main` should stay quiet about this error.
    ///
    /// The grader prints its own diagnostics, and an interrupted run was
    /// stopped on purpose.
    pub fn is_silent(&self) -> bool {
        matches!(
            self,
            RunError::GraderFailed { .. } | RunError::Interrupted { .. }
        )
    }
}

/// Result type alias for aigrade-run operations.
pub type Result<T> = std::result::Result<T, RunError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_error_has_correct_exit_code() {
        let err = RunError::UserError("bad config".to_string());
        assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
    }

    #[test]
    fn environment_error_has_correct_exit_code() {
        let err = RunError::EnvironmentError("missing secrets".to_string());
        assert_eq!(err.exit_code(), exit_codes::ENVIRONMENT_FAILURE);
    }

    #[test]
    fn lock_error_has_correct_exit_code() {
        let err = RunError::LockError("permission denied".to_string());
        assert_eq!(err.exit_code(), exit_codes::LOCK_FAILURE);
    }

    #[test]
    fn launch_error_has_correct_exit_code() {
        let err = RunError::LaunchError("not found".to_string());
        assert_eq!(err.exit_code(), exit_codes::LAUNCH_FAILURE);
    }

    #[test]
    fn grader_status_is_propagated_unchanged() {
        assert_eq!(RunError::GraderFailed { code: 1 }.exit_code(), 1);
        assert_eq!(RunError::GraderFailed { code: 42 }.exit_code(), 42);
    }

    #[test]
    fn interrupted_maps_to_signal_exit_code() {
        assert_eq!(RunError::Interrupted { signal: 15 }.exit_code(), 143);
    }

    #[test]
    fn only_grader_and_signal_errors_are_silent() {
        assert!(RunError::GraderFailed { code: 1 }.is_silent());
        assert!(RunError::Interrupted { signal: 2 }.is_silent());
        assert!(!RunError::LockError("x".to_string()).is_silent());
        assert!(!RunError::EnvironmentError("x".to_string()).is_silent());
    }

    #[test]
    fn error_messages_are_descriptive() {
        let err = RunError::GraderFailed { code: 3 };
        assert_eq!(err.to_string(), "grader exited with status 3");

        let err = RunError::EnvironmentError("secrets file missing".to_string());
        assert_eq!(
            err.to_string(),
            "environment setup failed: secrets file missing"
        );
    }
}
