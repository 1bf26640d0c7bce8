//! aigrade-run: single-instance run guard for the AIGrader batch grader.
//!
//! This is the main entry point for the `aigrade-run` CLI. It parses
//! arguments, dispatches to the appropriate command handler, and maps errors
//! to exit codes.

mod cli;
mod commands;
pub mod config;
pub mod env;
pub mod error;
pub mod exit_codes;
pub mod invocation;
pub mod locks;
mod logging;
pub mod signals;

#[cfg(test)]
mod test_support;

use cli::Cli;
use std::process::ExitCode;

fn main() -> ExitCode {
    logging::init();
    let cli = Cli::parse_args();

    // The lock marker guard lives inside `dispatch`, so it has been dropped by
    // the time the exit code is returned.
    match commands::dispatch(cli) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            if !err.is_silent() {
                // Print user-actionable error message to stderr
                eprintln!("Error: {}", err);
            }

            ExitCode::from(clamp_exit_code(err.exit_code()))
        }
    }
}

/// Fit an exit status into the 0-255 range without turning failure into success.
fn clamp_exit_code(code: i32) -> u8 {
    match u8::try_from(code) {
        Ok(0) | Err(_) => exit_codes::USER_ERROR as u8,
        Ok(code) => code,
    }
}
