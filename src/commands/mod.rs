//! Command implementations for aigrade-run.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations. A bare invocation is a guarded run.

mod plan;
mod run;

use crate::cli::{Cli, Command, LockAction, LockClearArgs, LockCommand};
use crate::config::Config;
use crate::error::{Result, RunError};
use crate::locks;
use run::RunOutcome;

/// Dispatch a command to its implementation.
///
/// This is the main entry point for command execution. Configuration is
/// resolved once here and handed to the handler.
pub fn dispatch(cli: Cli) -> Result<()> {
    let config = Config::resolve(cli.config.as_deref())?;

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => match run::cmd_run(&config)? {
            RunOutcome::Completed => Ok(()),
            RunOutcome::AlreadyRunning(info) => {
                tracing::debug!(marker = %info, "run skipped; lock marker held");
                Ok(())
            }
        },
        Command::Plan(args) => plan::cmd_plan(&config, &args),
        Command::Lock(lock_cmd) => dispatch_lock(&config, lock_cmd),
    }
}

/// Dispatch lock subcommands.
fn dispatch_lock(config: &Config, lock_cmd: LockCommand) -> Result<()> {
    match lock_cmd.action {
        LockAction::Status => cmd_lock_status(config),
        LockAction::Clear(args) => cmd_lock_clear(config, &args),
    }
}

fn cmd_lock_status(config: &Config) -> Result<()> {
    let Some(info) = locks::marker_status(&config.lock_path, config.lock_stale_minutes)? else {
        println!("No lock marker at {}.", config.lock_path.display());
        return Ok(());
    };

    println!("Lock marker held:");
    println!("  Path:       {}", info.path.display());
    println!("  Created:    {}", info.created_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("  Age:        {}", info.age_string());
    if info.is_stale {
        println!("  Status:     STALE (exceeds {} min threshold)", config.lock_stale_minutes);
        println!();
        println!(
            "Note: if no grader run is active, clear it with `aigrade-run lock clear --force`."
        );
    }

    Ok(())
}

fn cmd_lock_clear(config: &Config, args: &LockClearArgs) -> Result<()> {
    // Require --force flag
    if !args.force {
        return Err(RunError::UserError(
            "refusing to clear the lock marker without --force flag.\n\n\
             Clearing the marker while a grader run is active allows a second run to start.\n\
             Only clear it if you are certain the previous run has died.\n\n\
             To clear the marker, run:\n  aigrade-run lock clear --force"
                .to_string(),
        ));
    }

    let cleared = locks::clear_marker(&config.lock_path, config.lock_stale_minutes)?;
    tracing::info!(path = %cleared.path.display(), age = %cleared.age_string(), "lock marker cleared");

    println!("Cleared lock marker: {}", cleared.path.display());
    println!("  Created:    {}", cleared.created_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("  Age:        {}", cleared.age_string());
    if cleared.is_stale {
        println!("  Status:     was STALE");
    }

    Ok(())
}
