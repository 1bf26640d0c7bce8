//! Secrets file parsing.
//!
//! The secrets file uses the shell/dotenv subset that a `source` would
//! accept for plain assignments:
//!
//! ```text
//! # comment
//! export OPENAI_API_KEY=sk-...
//! export CANVAS_TOKEN
//! CANVAS_TOKEN='token with spaces'
//! CANVAS_BASE_URL="https://canvas.example.edu"
//! ```
//!
//! Values are unquoted with shell word rules. No `$VAR` expansion is done.

use crate::config::types::is_valid_var_name;
use crate::error::{Result, RunError};
use std::path::Path;

/// Key/value pairs read from a secrets file, in file order.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secrets {
    entries: Vec<(String, String)>,
}

impl Secrets {
    /// Iterate over entries in file order. Later duplicates override earlier ones
    /// when merged.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Variable names, in file order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Number of assignments.
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("keys", &self.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Read and parse the secrets file.
///
/// # Returns
///
/// * `Ok(Secrets)` - Parsed assignments
/// * `Err(RunError::EnvironmentError)` - File missing, unreadable, or malformed (exit code 2)
pub fn load_secrets(path: &Path) -> Result<Secrets> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        RunError::EnvironmentError(format!(
            "failed to read secrets file '{}': {}",
            path.display(),
            e
        ))
    })?;

    parse_secrets(&content, path)
}

/// Parse secrets file content. `source` is only used in error messages.
pub fn parse_secrets(content: &str, source: &Path) -> Result<Secrets> {
    let mut entries = Vec::new();

    for (index, raw) in content.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (line, exported) = match line.strip_prefix("export") {
            Some(rest) if rest.starts_with(char::is_whitespace) => (rest.trim_start(), true),
            _ => (line, false),
        };

        let err = |msg: String| {
            RunError::EnvironmentError(format!("{}:{}: {}", source.display(), line_no, msg))
        };

        let Some((key, raw_value)) = line.split_once('=') else {
            // `export NAME` only marks a variable for export; every entry is
            // passed to the grader anyway.
            if exported {
                if !is_valid_var_name(line) {
                    return Err(err(format!("invalid variable name '{}'", line)));
                }
                continue;
            }
            return Err(err("expected KEY=VALUE".to_string()));
        };

        if !is_valid_var_name(key) {
            return Err(err(format!("invalid variable name '{}'", key)));
        }

        let mut words = shell_words::split(raw_value)
            .map_err(|e| err(format!("invalid value for {}: {}", key, e)))?;

        let value = match words.len() {
            0 => String::new(),
            1 => words.remove(0),
            _ => {
                return Err(err(format!(
                    "value for {} contains unquoted whitespace; quote it",
                    key
                )));
            }
        };

        entries.push((key.to_string(), value));
    }

    Ok(Secrets { entries })
}
