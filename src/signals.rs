//! Termination signal handling.
//!
//! SIGINT, SIGTERM and SIGHUP would normally kill the wrapper before the lock
//! marker guard could run. After [`install`], they are only recorded; the run
//! notices the pending signal, forwards it to the grader if one is running,
//! and unwinds normally so the marker is removed.

use std::sync::atomic::{AtomicI32, Ordering};

/// Last signal received, or 0 for none.
static PENDING: AtomicI32 = AtomicI32::new(0);

/// Returns the most recent termination signal received since [`install`].
pub fn pending() -> Option<i32> {
    match PENDING.load(Ordering::SeqCst) {
        0 => None,
        signal => Some(signal),
    }
}

/// Take the pending signal, clearing it.
pub fn take() -> Option<i32> {
    match PENDING.swap(0, Ordering::SeqCst) {
        0 => None,
        signal => Some(signal),
    }
}

/// Whether `signal` should be relayed to the grader.
///
/// A terminal delivers SIGINT to the whole foreground process group, so the
/// grader has already seen it.
pub fn should_forward(signal: i32) -> bool {
    #[cfg(unix)]
    {
        signal != nix::libc::SIGINT
    }
    #[cfg(not(unix))]
    {
        let _ = signal;
        false
    }
}

#[cfg(unix)]
mod imp {
    use super::PENDING;
    use crate::error::{Result, RunError};
    use nix::libc::c_int;
    use nix::sys::signal::{SaFlags, SigAction, SigHandler, SigSet, Signal, kill, sigaction};
    use nix::unistd::Pid;
    use std::sync::atomic::Ordering;

    const HANDLED: [Signal; 3] = [Signal::SIGINT, Signal::SIGTERM, Signal::SIGHUP];

    extern "C" fn record(signal: c_int) {
        PENDING.store(signal, Ordering::SeqCst);
    }

    pub fn install() -> Result<()> {
        let action = SigAction::new(
            SigHandler::Handler(record),
            SaFlags::SA_RESTART,
            SigSet::empty(),
        );
        for signal in HANDLED {
            // SAFETY: the handler only stores into an atomic, which is
            // async-signal-safe.
            unsafe { sigaction(signal, &action) }.map_err(|e| {
                RunError::UserError(format!("failed to install {} handler: {}", signal, e))
            })?;
        }
        Ok(())
    }

    pub fn forward(pid: u32, signal: i32) -> Result<()> {
        let signal = Signal::try_from(signal)
            .map_err(|e| RunError::UserError(format!("unknown signal {}: {}", signal, e)))?;
        let pid = i32::try_from(pid)
            .map_err(|_| RunError::UserError(format!("child pid {} out of range", pid)))?;
        kill(Pid::from_raw(pid), signal).map_err(|e| {
            RunError::UserError(format!("failed to forward {} to grader: {}", signal, e))
        })
    }
}

#[cfg(not(unix))]
mod imp {
    use crate::error::Result;

    pub fn install() -> Result<()> {
        Ok(())
    }

    pub fn forward(_pid: u32, _signal: i32) -> Result<()> {
        Ok(())
    }
}

/// Install the recording handlers. Safe to call more than once.
pub fn install() -> crate::error::Result<()> {
    imp::install()
}

/// Send `signal` to the process `pid`.
pub fn forward(pid: u32, signal: i32) -> crate::error::Result<()> {
    imp::forward(pid, signal)
}
