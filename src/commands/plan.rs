//! `plan`: show what a run would do.

use crate::cli::PlanArgs;
use crate::config::Config;
use crate::env::{self, Environment};
use crate::error::{Result, RunError};
use crate::invocation::{GraderCredentials, Invocation, build_invocation};
use crate::locks::{self, MarkerInfo};
use serde_json::json;

pub fn cmd_plan(config: &Config, args: &PlanArgs) -> Result<()> {
    let (invocation, marker) = build_plan(config, Environment::capture())?;

    if args.json {
        let value = plan_json(config, &invocation, marker.as_ref());
        let rendered = serde_json::to_string_pretty(&value)
            .map_err(|e| RunError::UserError(format!("failed to serialize plan: {}", e)))?;
        println!("{}", rendered);
        return Ok(());
    }

    println!("Configuration:");
    println!("  Repo root:      {}", config.repo_root.display());
    println!("  Manifest:       {}", config.manifest_path().display());
    println!("  Runtime:        {}", config.runtime_env.display());
    println!("  Secrets file:   {}", config.secrets_file.display());
    match &marker {
        Some(info) => println!("  Lock marker:    {} (held)", info),
        None => println!("  Lock marker:    {} (free)", config.lock_path.display()),
    }
    println!();
    println!("Grader command:");
    println!("  {}", invocation.redacted_command_line());

    Ok(())
}

/// Resolve the environment and invocation without touching the marker.
fn build_plan(config: &Config, base: Environment) -> Result<(Invocation, Option<MarkerInfo>)> {
    let prepared = env::prepare_environment(config, base)?;
    let credentials =
        GraderCredentials::from_environment(&prepared.environment, &config.credential_vars);
    let invocation = build_invocation(config, &credentials, &prepared.runtime);
    let marker = locks::marker_status(&config.lock_path, config.lock_stale_minutes)?;
    Ok((invocation, marker))
}

fn plan_json(
    config: &Config,
    invocation: &Invocation,
    marker: Option<&MarkerInfo>,
) -> serde_json::Value {
    json!({
        "config": config,
        "program": invocation.program,
        "args": invocation.redacted_args(),
        "working_dir": invocation.working_dir,
        "lock": marker.map(|info| json!({
            "path": info.path,
            "created_at": info.created_at,
            "age_minutes": info.age().num_minutes(),
            "is_stale": info.is_stale,
        })),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exit_codes;
    use crate::test_support::GraderFixture;

    #[test]
    fn plan_resolves_invocation_without_touching_marker() {
        let fixture = GraderFixture::new(0);

        let (invocation, marker) = build_plan(&fixture.config, Environment::default()).unwrap();

        assert!(marker.is_none());
        assert!(!fixture.config.lock_path.exists());
        assert_eq!(fixture.invocations(), 0);
        assert_eq!(
            invocation.program,
            fixture.config.runtime_env.join("bin").join("aigrader")
        );
        assert!(!invocation.redacted_command_line().contains("sk-fixture"));
    }

    #[test]
    fn plan_reports_held_marker() {
        let fixture = GraderFixture::new(0);
        std::fs::write(&fixture.config.lock_path, "").unwrap();

        let (_, marker) = build_plan(&fixture.config, Environment::default()).unwrap();

        assert_eq!(marker.unwrap().path, fixture.config.lock_path);
        assert!(fixture.config.lock_path.exists());
    }

    #[test]
    fn plan_surfaces_environment_failures() {
        let fixture = GraderFixture::new(0);
        std::fs::remove_file(&fixture.config.secrets_file).unwrap();

        let err = build_plan(&fixture.config, Environment::default()).unwrap_err();
        assert_eq!(err.exit_code(), exit_codes::ENVIRONMENT_FAILURE);
    }

    #[test]
    fn plan_json_masks_credentials() {
        let fixture = GraderFixture::new(0);
        let (invocation, marker) = build_plan(&fixture.config, Environment::default()).unwrap();

        let value = plan_json(&fixture.config, &invocation, marker.as_ref());
        let text = value.to_string();

        assert!(!text.contains("sk-fixture"));
        assert!(!text.contains("fixture token"));
        assert_eq!(value["args"][0], "--assignment-file");
        assert_eq!(value["args"].as_array().unwrap().len(), 11);
        assert!(value["lock"].is_null());
        assert_eq!(value["config"]["grader_program"], "aigrader");
    }
}
