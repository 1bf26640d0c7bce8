//! Grader subprocess executor.
//!
//! Launches the grader with an explicit environment, waits for it without a
//! timeout, and relays termination signals received by the wrapper.

use super::Invocation;
use crate::env::Environment;
use crate::error::{Result, RunError};
use crate::signals;
use std::process::{Child, Command, ExitStatus};
use std::time::Duration;
use tracing::{debug, info, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How the grader process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraderOutcome {
    /// Exited normally with this status.
    Exited(i32),
    /// Killed by this signal.
    Signaled(i32),
}

/// Result of a completed grader run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraderRun {
    pub outcome: GraderOutcome,
    /// Termination signal the wrapper received while the grader ran.
    pub interrupted_by: Option<i32>,
}

impl GraderRun {
    /// Convert into the run's result: `Ok` only for an uninterrupted exit 0.
    pub fn into_result(self) -> Result<()> {
        if let Some(signal) = self.interrupted_by {
            return Err(RunError::Interrupted { signal });
        }
        match self.outcome {
            GraderOutcome::Exited(0) => Ok(()),
            GraderOutcome::Exited(code) => Err(RunError::GraderFailed { code }),
            GraderOutcome::Signaled(signal) => Err(RunError::Interrupted { signal }),
        }
    }
}

/// Run the grader to completion.
///
/// The child's environment is exactly `env`; stdio is inherited.
///
/// # Returns
///
/// * `Ok(GraderRun)` - The grader ran; inspect its outcome
/// * `Err(RunError::LaunchError)` - The grader could not be started (exit code 127)
pub fn run_grader(invocation: &Invocation, env: &Environment) -> Result<GraderRun> {
    if !invocation.working_dir.is_dir() {
        return Err(RunError::LaunchError(format!(
            "working directory '{}' does not exist",
            invocation.working_dir.display()
        )));
    }

    let mut command = Command::new(&invocation.program);
    command
        .args(invocation.os_args())
        .current_dir(&invocation.working_dir)
        .env_clear()
        .envs(env.iter());

    let mut child = command.spawn().map_err(|e| {
        RunError::LaunchError(format!(
            "'{}': {}\nFix: check grader_program and that the runtime provides it.",
            invocation.program.display(),
            e
        ))
    })?;
    info!(pid = child.id(), program = %invocation.program.display(), "grader started");

    let run = wait_relaying_signals(&mut child)?;
    debug!(outcome = ?run.outcome, interrupted_by = ?run.interrupted_by, "grader finished");
    Ok(run)
}

/// Wait for the child, forwarding termination signals as they arrive.
fn wait_relaying_signals(child: &mut Child) -> Result<GraderRun> {
    let mut interrupted_by = None;

    loop {
        if let Some(signal) = signals::take() {
            interrupted_by = Some(signal);
            if signals::should_forward(signal)
                && let Err(e) = signals::forward(child.id(), signal)
            {
                warn!(signal, error = %e, "could not forward signal to grader");
            }
        }

        match child.try_wait() {
            Ok(Some(status)) => {
                return Ok(GraderRun {
                    outcome: outcome_from_status(status),
                    interrupted_by,
                });
            }
            Ok(None) => std::thread::sleep(POLL_INTERVAL),
            Err(e) => {
                kill_process(child);
                return Err(RunError::LaunchError(format!(
                    "failed to check grader status: {}",
                    e
                )));
            }
        }
    }
}

fn outcome_from_status(status: ExitStatus) -> GraderOutcome {
    if let Some(code) = status.code() {
        return GraderOutcome::Exited(code);
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return GraderOutcome::Signaled(signal);
        }
    }

    GraderOutcome::Exited(1)
}

/// Kill a process and wait for it to terminate.
fn kill_process(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}
