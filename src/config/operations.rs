//! Config loading, validation, and path helpers.

use super::model::Config;
use super::types::is_valid_var_name;
use crate::error::{Result, RunError};
use std::path::{Path, PathBuf};

impl Config {
    /// Resolve the config for this invocation.
    ///
    /// Without a file the compiled-in defaults are used as-is.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully loaded and validated config
    /// * `Err(RunError::UserError)` - Read error, parse error or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            RunError::UserError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty file means "all defaults".
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(yaml)
            .map_err(|e| RunError::UserError(format!("failed to parse config YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - `lock_stale_minutes` must be positive
    /// - `grader_program` must be non-empty
    /// - `lock_path` must name a file
    /// - credential variable names must be valid shell identifiers
    pub fn validate(&self) -> Result<()> {
        if self.lock_stale_minutes == 0 {
            return Err(RunError::UserError(
                "config validation failed: lock_stale_minutes must be greater than 0".to_string(),
            ));
        }

        if self.grader_program.trim().is_empty() {
            return Err(RunError::UserError(
                "config validation failed: grader_program must not be empty".to_string(),
            ));
        }

        if self.lock_path.file_name().is_none() {
            return Err(RunError::UserError(format!(
                "config validation failed: lock_path '{}' does not name a file",
                self.lock_path.display()
            )));
        }

        for (field, name) in self.credential_vars.entries() {
            if !is_valid_var_name(name) {
                return Err(RunError::UserError(format!(
                    "config validation failed: credential_vars.{} '{}' is not a valid variable name",
                    field, name
                )));
            }
        }

        Ok(())
    }

    /// Absolute path of the assignments manifest handed to the grader.
    pub fn manifest_path(&self) -> PathBuf {
        // `join` keeps an absolute manifest path as-is.
        self.repo_root.join(&self.assignments_manifest)
    }
}
