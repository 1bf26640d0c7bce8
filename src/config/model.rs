//! Config struct definition and default implementation.

use super::types::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for a guarded grader run.
///
/// The defaults are the fixed deployment layout; a YAML file only needs to
/// name the fields that differ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // =========================================================================
    // Paths
    // =========================================================================
    /// Root of the grader deployment; also the grader's working directory.
    #[serde(default = "default_repo_root")]
    pub repo_root: PathBuf,

    /// Assignments manifest, relative to `repo_root` unless absolute.
    #[serde(default = "default_assignments_manifest")]
    pub assignments_manifest: PathBuf,

    /// Runtime environment directory (must contain `bin/activate`).
    #[serde(default = "default_runtime_env")]
    pub runtime_env: PathBuf,

    /// Secrets file in `KEY=VALUE` form.
    #[serde(default = "default_secrets_file")]
    pub secrets_file: PathBuf,

    // =========================================================================
    // Lock settings
    // =========================================================================
    /// Lock marker path. Its parent directory must already exist.
    #[serde(default = "default_lock_path")]
    pub lock_path: PathBuf,

    /// Minutes after which an existing marker is reported as stale.
    #[serde(default = "default_lock_stale_minutes")]
    pub lock_stale_minutes: u32,

    // =========================================================================
    // Grader settings
    // =========================================================================
    /// Grader executable, either a path or a name looked up after activation.
    #[serde(default = "default_grader_program")]
    pub grader_program: String,

    /// Environment variable names for the grader's credentials.
    #[serde(default)]
    pub credential_vars: CredentialVars,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repo_root: default_repo_root(),
            assignments_manifest: default_assignments_manifest(),
            runtime_env: default_runtime_env(),
            secrets_file: default_secrets_file(),
            lock_path: default_lock_path(),
            lock_stale_minutes: default_lock_stale_minutes(),
            grader_program: default_grader_program(),
            credential_vars: CredentialVars::default(),
        }
    }
}
