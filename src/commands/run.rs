//! The guarded grader run.
//!
//! Steps, strictly in order:
//! 1. take the lock marker, or print a notice and exit 0 if it is held
//! 2. load secrets and activate the runtime
//! 3. build the grader invocation and run it
//! 4. remove the marker (also on every error path, via the guard)

use crate::config::Config;
use crate::env::{self, Environment};
use crate::error::{Result, RunError};
use crate::invocation::{GraderCredentials, build_invocation, run_grader};
use crate::locks::{self, Acquisition, MarkerInfo};
use crate::signals;
use tracing::{debug, warn};

/// How a run ended when it did not fail.
#[derive(Debug)]
pub enum RunOutcome {
    /// The grader ran and exited 0.
    Completed,
    /// Another run held the marker; nothing was done.
    AlreadyRunning(MarkerInfo),
}

/// Perform one guarded grader run with the inherited process environment.
pub fn cmd_run(config: &Config) -> Result<RunOutcome> {
    run_guarded(config, Environment::capture())
}

/// Perform one guarded grader run on top of `base`.
pub(crate) fn run_guarded(config: &Config, base: Environment) -> Result<RunOutcome> {
    // Signals from before this run are not ours to act on.
    signals::take();
    signals::install()?;

    let guard = match locks::acquire_marker(&config.lock_path, config.lock_stale_minutes)? {
        Acquisition::Acquired(guard) => {
            debug!(path = %guard.path().display(), "lock marker acquired");
            guard
        }
        Acquisition::Held(info) => {
            report_held(&info, config);
            return Ok(RunOutcome::AlreadyRunning(info));
        }
    };

    let prepared = env::prepare_environment(config, base)?;
    check_interrupted()?;

    let credentials =
        GraderCredentials::from_environment(&prepared.environment, &config.credential_vars);
    let invocation = build_invocation(config, &credentials, &prepared.runtime);
    debug!(command = %invocation.redacted_command_line(), "launching grader");

    let result = run_grader(&invocation, &prepared.environment)?.into_result();

    let released = guard.release();
    if let (Err(run_err), Err(release_err)) = (&result, &released) {
        warn!(error = %release_err, "lock marker cleanup also failed after: {}", run_err);
    }
    result?;
    released?;

    Ok(RunOutcome::Completed)
}

fn check_interrupted() -> Result<()> {
    match signals::pending() {
        Some(signal) => Err(RunError::Interrupted { signal }),
        None => Ok(()),
    }
}

fn report_held(info: &MarkerInfo, config: &Config) {
    println!("{}", held_notice(info));
    if let Some(hint) = stale_hint(info) {
        warn!(
            path = %info.path.display(),
            threshold_minutes = config.lock_stale_minutes,
            "{}",
            hint
        );
    }
}

fn held_notice(info: &MarkerInfo) -> String {
    format!(
        "Lock file {} exists (age {}); another run appears to be in progress. Exiting.",
        info.path.display(),
        info.age_string()
    )
}

/// Recovery hint for a marker older than the stale threshold.
fn stale_hint(info: &MarkerInfo) -> Option<String> {
    info.is_stale.then(|| {
        "lock marker is stale; if no run is active, clear it with `aigrade-run lock clear --force`"
            .to_string()
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::exit_codes;
    use crate::test_support::{GraderFixture, SECRETS, write_script};
    use nix::sys::signal::{Signal, raise};
    use serial_test::serial;
    use std::io::Write;
    use std::time::{Duration, SystemTime};

    fn base_env() -> Environment {
        Environment::from_vars([("PATH", "/usr/bin:/bin")])
    }

    #[test]
    #[serial]
    fn test_successful_run_holds_marker_during_grader_and_removes_it() {
        let fixture = GraderFixture::new(0);

        let outcome = run_guarded(&fixture.config, base_env()).unwrap();

        assert!(matches!(outcome, RunOutcome::Completed));
        assert_eq!(fixture.invocations(), 1);
        assert!(fixture.grader_saw_marker());
        assert!(!fixture.config.lock_path.exists());
    }

    #[test]
    #[serial]
    fn test_grader_receives_fixed_arguments_from_secrets() {
        let fixture = GraderFixture::new(0);

        run_guarded(&fixture.config, base_env()).unwrap();

        let manifest = fixture.config.manifest_path();
        assert_eq!(
            fixture.last_args(),
            vec![
                "--assignment-file".to_string(),
                manifest.display().to_string(),
                "--use-llm".to_string(),
                "--openai-key".to_string(),
                "sk-fixture".to_string(),
                "--post-comment".to_string(),
                "--comment-html".to_string(),
                "--token".to_string(),
                "fixture token".to_string(),
                "--base-url".to_string(),
                "https://canvas.example.edu".to_string(),
            ]
        );
    }

    #[test]
    #[serial]
    fn test_failing_grader_propagates_status_and_removes_marker() {
        let fixture = GraderFixture::new(1);

        let err = run_guarded(&fixture.config, base_env()).unwrap_err();

        assert!(matches!(err, RunError::GraderFailed { code: 1 }));
        assert_eq!(err.exit_code(), 1);
        assert_eq!(fixture.invocations(), 1);
        assert!(!fixture.config.lock_path.exists());
    }

    #[test]
    #[serial]
    fn test_held_marker_means_no_side_effects() {
        let fixture = GraderFixture::new(0);
        std::fs::write(&fixture.config.lock_path, "").unwrap();
        // Secrets would fail to load if the run got that far
        std::fs::remove_file(&fixture.config.secrets_file).unwrap();

        let outcome = run_guarded(&fixture.config, base_env()).unwrap();

        match outcome {
            RunOutcome::AlreadyRunning(info) => assert_eq!(info.path, fixture.config.lock_path),
            RunOutcome::Completed => panic!("run must not proceed while the marker is held"),
        }
        assert_eq!(fixture.invocations(), 0);
        assert!(fixture.config.lock_path.exists());
    }

    #[test]
    #[serial]
    fn test_stale_marker_blocks_run_and_suggests_clearing() {
        let fixture = GraderFixture::new(0);
        let marker = std::fs::File::create(&fixture.config.lock_path).unwrap();
        marker
            .set_modified(SystemTime::now() - Duration::from_secs(150 * 60))
            .unwrap();
        drop(marker);

        let outcome = run_guarded(&fixture.config, base_env()).unwrap();

        let RunOutcome::AlreadyRunning(info) = outcome else {
            panic!("a stale marker must still block the run");
        };
        assert!(info.is_stale);
        assert!(held_notice(&info).contains("another run appears to be in progress"));
        let hint = stale_hint(&info).expect("stale marker should carry a hint");
        assert!(hint.contains("aigrade-run lock clear --force"));
        assert_eq!(fixture.invocations(), 0);
        assert!(fixture.config.lock_path.exists());
    }

    #[test]
    fn test_fresh_marker_has_no_stale_hint() {
        let info = MarkerInfo::from_created_at(
            std::path::Path::new("/tmp/aigrader.lock"),
            chrono::Utc::now() - chrono::Duration::minutes(5),
            120,
        );
        assert!(stale_hint(&info).is_none());
        assert!(held_notice(&info).contains("/tmp/aigrader.lock"));
    }

    #[test]
    #[serial]
    fn test_signal_during_environment_setup_stops_before_grader() {
        let fixture = GraderFixture::new(0);
        let secrets = fixture.config.secrets_file.clone();
        std::fs::remove_file(&secrets).unwrap();
        nix::unistd::mkfifo(&secrets, nix::sys::stat::Mode::S_IRWXU).unwrap();

        // Reading the FIFO blocks setup until the writer shows up, so the
        // signal arrives while secrets are still being loaded.
        let writer = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(300));
            raise(Signal::SIGTERM).unwrap();
            let mut fifo = std::fs::OpenOptions::new().write(true).open(&secrets).unwrap();
            fifo.write_all(SECRETS.as_bytes()).unwrap();
        });

        let err = run_guarded(&fixture.config, base_env()).unwrap_err();
        writer.join().unwrap();

        assert!(matches!(
            err,
            RunError::Interrupted { signal } if signal == nix::libc::SIGTERM
        ));
        assert_eq!(err.exit_code(), 128 + nix::libc::SIGTERM);
        assert_eq!(fixture.invocations(), 0);
        assert!(!fixture.config.lock_path.exists());
    }

    #[test]
    #[serial]
    fn test_missing_secrets_prevents_invocation() {
        let fixture = GraderFixture::new(0);
        std::fs::remove_file(&fixture.config.secrets_file).unwrap();

        let err = run_guarded(&fixture.config, base_env()).unwrap_err();

        assert_eq!(err.exit_code(), exit_codes::ENVIRONMENT_FAILURE);
        assert_eq!(fixture.invocations(), 0);
        assert!(!fixture.config.lock_path.exists());
    }

    #[test]
    #[serial]
    fn test_missing_runtime_prevents_invocation() {
        let fixture = GraderFixture::new(0);
        let activate = fixture.config.runtime_env.join("bin").join("activate");
        std::fs::remove_file(activate).unwrap();

        let err = run_guarded(&fixture.config, base_env()).unwrap_err();

        assert_eq!(err.exit_code(), exit_codes::ENVIRONMENT_FAILURE);
        assert_eq!(fixture.invocations(), 0);
        assert!(!fixture.config.lock_path.exists());
    }

    #[test]
    #[serial]
    fn test_unlaunchable_grader_removes_marker() {
        let mut fixture = GraderFixture::new(0);
        fixture.config.grader_program = fixture
            .temp_dir
            .path()
            .join("missing-grader")
            .display()
            .to_string();

        let err = run_guarded(&fixture.config, base_env()).unwrap_err();

        assert_eq!(err.exit_code(), exit_codes::LAUNCH_FAILURE);
        assert!(!fixture.config.lock_path.exists());
    }

    #[test]
    #[serial]
    fn test_marker_directory_missing_is_lock_failure() {
        let mut fixture = GraderFixture::new(0);
        fixture.config.lock_path = fixture.temp_dir.path().join("nope").join("aigrader.lock");

        let err = run_guarded(&fixture.config, base_env()).unwrap_err();

        assert_eq!(err.exit_code(), exit_codes::LOCK_FAILURE);
        assert_eq!(fixture.invocations(), 0);
    }

    #[test]
    #[serial]
    fn test_signal_forwarded_to_grader_and_marker_removed() {
        let fixture = GraderFixture::new(0);
        let grader = fixture.config.runtime_env.join("bin").join("aigrader");
        // The grader signals its parent (the test process), then waits to be
        // terminated by the forwarded SIGTERM.
        write_script(&grader, "#!/bin/sh\nkill -TERM $PPID\nexec sleep 5\n");

        let err = run_guarded(&fixture.config, base_env()).unwrap_err();

        assert!(matches!(
            err,
            RunError::Interrupted { signal } if signal == nix::libc::SIGTERM
        ));
        assert_eq!(err.exit_code(), 128 + nix::libc::SIGTERM);
        assert!(!fixture.config.lock_path.exists());
    }
}
