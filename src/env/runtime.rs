//! Runtime environment activation.
//!
//! Activation is applied to an [`Environment`] value the same way a virtual
//! environment's `activate` script changes a shell: `VIRTUAL_ENV` points at
//! the runtime, its `bin` directory goes first on `PATH`, and `PYTHONHOME`
//! is dropped.

use super::Environment;
use crate::error::{Result, RunError};
use std::path::{Path, PathBuf};

/// Name of the activation script inside the runtime's `bin` directory.
pub const ACTIVATE_SCRIPT: &str = "activate";

/// A runtime environment that passed activation checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeEnv {
    root: PathBuf,
    bin_dir: PathBuf,
}

/// Check that `dir` is an activatable runtime.
///
/// # Returns
///
/// * `Ok(RuntimeEnv)` - `dir/bin/activate` exists
/// * `Err(RunError::EnvironmentError)` - Activation script missing (exit code 2)
pub fn activate_runtime(dir: &Path) -> Result<RuntimeEnv> {
    let bin_dir = dir.join("bin");
    let script = bin_dir.join(ACTIVATE_SCRIPT);

    if !script.is_file() {
        return Err(RunError::EnvironmentError(format!(
            "runtime activation script not found: {}",
            script.display()
        )));
    }

    Ok(RuntimeEnv {
        root: dir.to_path_buf(),
        bin_dir,
    })
}

impl RuntimeEnv {
    /// The runtime directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Apply activation to `env`.
    pub fn apply(&self, env: &mut Environment) -> Result<()> {
        let mut paths = vec![self.bin_dir.clone()];
        if let Some(existing) = env.get("PATH") {
            paths.extend(std::env::split_paths(existing));
        }

        let joined = std::env::join_paths(paths).map_err(|e| {
            RunError::EnvironmentError(format!(
                "cannot put '{}' on PATH: {}",
                self.bin_dir.display(),
                e
            ))
        })?;

        env.set("PATH", joined);
        env.set("VIRTUAL_ENV", self.root.as_os_str());
        env.remove("PYTHONHOME");
        Ok(())
    }

    /// Resolve the program to launch.
    ///
    /// A bare name that exists in the runtime's `bin` directory resolves to
    /// that file; anything else is returned unchanged for `PATH` lookup.
    pub fn resolve_program(&self, program: &str) -> PathBuf {
        let as_path = Path::new(program);
        if as_path.components().count() == 1 {
            let candidate = self.bin_dir.join(as_path);
            if candidate.is_file() {
                return candidate;
            }
        }
        as_path.to_path_buf()
    }
}
