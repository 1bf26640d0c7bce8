//! Configuration types and defaults for aigrade-run.
//!
//! This module defines nested config structs, constants, and default value
//! functions used by the Config struct.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Names of the environment variables that carry grader credentials.
///
/// The values themselves come from the secrets file or the inherited
/// environment; only the names are configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialVars {
    /// Variable holding the LLM provider API key.
    pub llm_api_key: String,

    /// Variable holding the LMS API token.
    pub lms_token: String,

    /// Variable holding the LMS base URL.
    pub lms_base_url: String,
}

impl Default for CredentialVars {
    fn default() -> Self {
        Self {
            llm_api_key: "OPENAI_API_KEY".to_string(),
            lms_token: "CANVAS_TOKEN".to_string(),
            lms_base_url: "CANVAS_BASE_URL".to_string(),
        }
    }
}

impl CredentialVars {
    /// Iterate over `(field, variable name)` pairs.
    pub fn entries(&self) -> [(&'static str, &str); 3] {
        [
            ("llm_api_key", self.llm_api_key.as_str()),
            ("lms_token", self.lms_token.as_str()),
            ("lms_base_url", self.lms_base_url.as_str()),
        ]
    }
}

/// Returns true if `name` is usable as a shell variable name.
pub fn is_valid_var_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

// Default value functions for serde

pub(crate) fn default_repo_root() -> PathBuf {
    PathBuf::from("/opt/aigrader")
}

pub(crate) fn default_assignments_manifest() -> PathBuf {
    PathBuf::from("assignments.tsv")
}

pub(crate) fn default_runtime_env() -> PathBuf {
    PathBuf::from("/opt/aigrader/.venv")
}

pub(crate) fn default_secrets_file() -> PathBuf {
    PathBuf::from("/opt/aigrader/.secrets")
}

pub(crate) fn default_lock_path() -> PathBuf {
    PathBuf::from("/tmp/aigrader.lock")
}

pub(crate) fn default_grader_program() -> String {
    "aigrader".to_string()
}

pub(crate) fn default_lock_stale_minutes() -> u32 {
    120
}
