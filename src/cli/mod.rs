//! CLI argument parsing for aigrade-run.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// aigrade-run: single-instance run guard for the AIGrader batch grader.
///
/// With no arguments, performs one guarded grader run using the compiled-in
/// deployment layout:
/// - exits quietly with status 0 if another run holds the lock marker
/// - loads the secrets file and activates the runtime environment
/// - runs the grader and removes the lock marker however it ends
#[derive(Parser, Debug)]
#[command(name = "aigrade-run")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Read configuration from a YAML file instead of the built-in defaults.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Available commands for aigrade-run.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Perform one guarded grader run (the default).
    Run,

    /// Show the resolved configuration and grader command without running it.
    ///
    /// Loads secrets and activates the runtime so setup problems surface,
    /// but never touches the lock marker. Credentials are masked.
    Plan(PlanArgs),

    /// Lock marker commands.
    ///
    /// Inspect or clear the lock marker.
    Lock(LockCommand),
}

/// Arguments for the `plan` command.
#[derive(Parser, Debug, Default)]
pub struct PlanArgs {
    /// Print the plan as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Lock subcommands.
#[derive(Parser, Debug)]
pub struct LockCommand {
    #[command(subcommand)]
    pub action: LockAction,
}

/// Available lock actions.
#[derive(Subcommand, Debug)]
pub enum LockAction {
    /// Show whether the lock marker exists, its age, and whether it is stale.
    Status,

    /// Remove the lock marker.
    ///
    /// Requires --force flag to prevent accidental clearing.
    Clear(LockClearArgs),
}

/// Arguments for the `lock clear` command.
#[derive(Parser, Debug)]
pub struct LockClearArgs {
    /// Force clearing the marker (required for safety).
    #[arg(long)]
    pub force: bool,
}
