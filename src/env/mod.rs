//! Process environment assembly for the grader.
//!
//! The grader's environment is built as an explicit [`Environment`] value:
//! the inherited variables, overlaid with the secrets file, then adjusted by
//! runtime activation. The wrapper's own process environment is never
//! modified, and the child receives exactly this map.

mod runtime;
mod secrets;


pub use runtime::{RuntimeEnv, activate_runtime};
pub use secrets::{Secrets, load_secrets, parse_secrets};

use crate::config::Config;
use crate::error::Result;
use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use tracing::debug;

/// An explicit set of environment variables for a child process.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: BTreeMap<OsString, OsString>,
}

impl Environment {
    /// Snapshot the current process environment.
    pub fn capture() -> Self {
        Self::from_vars(std::env::vars_os())
    }

    /// Build an environment from key/value pairs.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<OsString>,
        V: Into<OsString>,
    {
        Self {
            vars: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Look up a variable.
    pub fn get(&self, key: &str) -> Option<&OsStr> {
        self.vars.get(OsStr::new(key)).map(OsString::as_os_str)
    }

    /// Set a variable, replacing any previous value.
    pub fn set(&mut self, key: impl Into<OsString>, value: impl Into<OsString>) {
        self.vars.insert(key.into(), value.into());
    }

    /// Remove a variable, returning its previous value.
    pub fn remove(&mut self, key: &str) -> Option<OsString> {
        self.vars.remove(OsStr::new(key))
    }

    /// Overlay secrets onto this environment. Secrets win over inherited values.
    pub fn merge_secrets(&mut self, secrets: &Secrets) {
        for (key, value) in secrets.iter() {
            self.set(key, value);
        }
    }

    /// Iterate over all variables in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&OsStr, &OsStr)> {
        self.vars.iter().map(|(k, v)| (k.as_os_str(), v.as_os_str()))
    }
}

// Values may be credentials, so only names are shown.
impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set()
            .entries(self.vars.keys().map(|k| k.to_string_lossy()))
            .finish()
    }
}

/// The grader's environment after secrets and activation.
#[derive(Debug, Clone)]
pub struct PreparedEnv {
    /// Complete environment for the grader process.
    pub environment: Environment,
    /// The activated runtime.
    pub runtime: RuntimeEnv,
}

/// Load secrets, then activate the runtime, on top of `base`.
///
/// Either step failing is fatal; nothing is partially applied to the caller.
pub fn prepare_environment(config: &Config, base: Environment) -> Result<PreparedEnv> {
    let secrets = load_secrets(&config.secrets_file)?;
    debug!(
        path = %config.secrets_file.display(),
        count = secrets.len(),
        "secrets loaded"
    );

    let runtime = activate_runtime(&config.runtime_env)?;

    let mut environment = base;
    environment.merge_secrets(&secrets);
    runtime.apply(&mut environment)?;
    debug!(runtime = %runtime.root().display(), "runtime activated");

    Ok(PreparedEnv {
        environment,
        runtime,
    })
}
