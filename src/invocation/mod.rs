//! Grader invocation assembly.
//!
//! The grader's command line has a fixed shape:
//!
//! ```text
//! aigrader --assignment-file <manifest> --use-llm --openai-key <key>
//!          --post-comment --comment-html --token <token> --base-url <url>
//! ```
//!
//! Values are concatenated as-is; the grader does its own validation.

pub mod executor;

pub use executor::{GraderOutcome, GraderRun, run_grader};

use crate::config::{Config, CredentialVars};
use crate::env::{Environment, RuntimeEnv};
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;
use tracing::warn;

/// Grader flag selecting the assignments manifest.
pub const FLAG_ASSIGNMENT_FILE: &str = "--assignment-file";
/// Grader flag enabling LLM-assisted grading.
pub const FLAG_USE_LLM: &str = "--use-llm";
/// Grader flag carrying the LLM API key.
pub const FLAG_OPENAI_KEY: &str = "--openai-key";
/// Grader flag enabling posting of comments to the LMS.
pub const FLAG_POST_COMMENT: &str = "--post-comment";
/// Grader flag rendering comments as HTML.
pub const FLAG_COMMENT_HTML: &str = "--comment-html";
/// Grader flag carrying the LMS token.
pub const FLAG_TOKEN: &str = "--token";
/// Grader flag carrying the LMS base URL.
pub const FLAG_BASE_URL: &str = "--base-url";

const REDACTED: &str = "********";

/// Credential values handed to the grader, byte-for-byte as found in the
/// environment.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct GraderCredentials {
    pub llm_api_key: OsString,
    pub lms_token: OsString,
    pub lms_base_url: OsString,
}

impl GraderCredentials {
    /// Read credentials from `env` using the configured variable names.
    ///
    /// A missing variable becomes an empty value; the grader reports it.
    pub fn from_environment(env: &Environment, vars: &CredentialVars) -> Self {
        let read = |name: &str| {
            env.get(name).map(OsStr::to_os_string).unwrap_or_else(|| {
                warn!(variable = name, "credential variable is not set");
                OsString::new()
            })
        };

        Self {
            llm_api_key: read(&vars.llm_api_key),
            lms_token: read(&vars.lms_token),
            lms_base_url: read(&vars.lms_base_url),
        }
    }
}

impl std::fmt::Debug for GraderCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraderCredentials")
            .field("llm_api_key", &REDACTED)
            .field("lms_token", &REDACTED)
            .field("lms_base_url", &self.lms_base_url)
            .finish()
    }
}

/// One grader argument.
#[derive(Clone, PartialEq, Eq)]
pub enum Arg {
    Plain(OsString),
    Secret(OsString),
}

impl Arg {
    fn plain(value: impl Into<OsString>) -> Self {
        Arg::Plain(value.into())
    }

    fn as_os(&self) -> OsString {
        match self {
            Arg::Plain(v) | Arg::Secret(v) => v.clone(),
        }
    }

    fn display(&self) -> String {
        match self {
            Arg::Plain(v) => v.to_string_lossy().into_owned(),
            Arg::Secret(_) => REDACTED.to_string(),
        }
    }
}

impl std::fmt::Debug for Arg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.display())
    }
}

/// A fully assembled grader command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Executable to launch.
    pub program: PathBuf,
    /// Arguments in grader order.
    pub args: Vec<Arg>,
    /// Working directory for the grader.
    pub working_dir: PathBuf,
}

impl Invocation {
    /// Arguments as passed to the process.
    pub fn os_args(&self) -> Vec<OsString> {
        self.args.iter().map(Arg::as_os).collect()
    }

    /// Shell-quoted command line with secret values masked.
    pub fn redacted_command_line(&self) -> String {
        let mut words = vec![self.program.to_string_lossy().into_owned()];
        words.extend(self.args.iter().map(Arg::display));
        shell_words::join(words)
    }

    /// Redacted argument strings, for structured output.
    pub fn redacted_args(&self) -> Vec<String> {
        self.args.iter().map(Arg::display).collect()
    }
}

/// Assemble the grader invocation.
pub fn build_invocation(
    config: &Config,
    credentials: &GraderCredentials,
    runtime: &RuntimeEnv,
) -> Invocation {
    let args = vec![
        Arg::plain(FLAG_ASSIGNMENT_FILE),
        Arg::plain(config.manifest_path()),
        Arg::plain(FLAG_USE_LLM),
        Arg::plain(FLAG_OPENAI_KEY),
        Arg::Secret(credentials.llm_api_key.clone()),
        Arg::plain(FLAG_POST_COMMENT),
        Arg::plain(FLAG_COMMENT_HTML),
        Arg::plain(FLAG_TOKEN),
        Arg::Secret(credentials.lms_token.clone()),
        Arg::plain(FLAG_BASE_URL),
        Arg::plain(credentials.lms_base_url.clone()),
    ];

    Invocation {
        program: runtime.resolve_program(&config.grader_program),
        args,
        working_dir: config.repo_root.clone(),
    }
}
