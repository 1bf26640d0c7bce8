//! Configuration model for aigrade-run.
//!
//! Every field has a compiled-in default, so a run needs no config file at
//! all. A YAML file passed with `--config` overrides fields individually;
//! unknown fields are ignored for forward compatibility.

mod model;
mod operations;
pub mod types;


// Re-export public API
pub use model::Config;
pub use types::CredentialVars;
