//! Diagnostic logging setup.
//!
//! Logs go to stderr through `tracing`. The default level is `warn`, so an
//! ordinary run prints nothing beyond what the grader prints. Set
//! `AIGRADE_RUN_LOG` (e.g. `debug` or `aigrade_run=info`) for more.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding the log filter directives.
pub const LOG_ENV_VAR: &str = "AIGRADE_RUN_LOG";

const DEFAULT_FILTER: &str = "warn";

/// Build the log filter from `AIGRADE_RUN_LOG`, falling back to `warn`.
pub fn filter_from_env() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. Later calls are ignored.
pub fn init() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(filter_from_env())
        .try_init();
}
