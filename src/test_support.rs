use crate::config::Config;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A throwaway deployment: runtime with a fake grader, secrets file,
/// manifest, and a lock marker path, all under one temp directory.
pub(crate) struct GraderFixture {
    pub temp_dir: TempDir,
    pub config: Config,
    /// Every grader invocation appends its arguments here, one per line.
    pub args_log: PathBuf,
    /// The grader appends "marker-present" here if it saw the lock marker.
    pub marker_log: PathBuf,
}

pub(crate) const SECRETS: &str = "\
# grader credentials
export OPENAI_API_KEY=sk-fixture
CANVAS_TOKEN='fixture token'
CANVAS_BASE_URL=https://canvas.example.edu
";

impl GraderFixture {
    /// Fixture whose grader exits with `exit_code`.
    pub(crate) fn new(exit_code: i32) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().to_path_buf();

        let repo_root = root.join("repo");
        std::fs::create_dir_all(&repo_root).unwrap();
        std::fs::write(repo_root.join("assignments.tsv"), "course_id\tassignment_id\n").unwrap();

        let runtime = root.join("venv");
        std::fs::create_dir_all(runtime.join("bin")).unwrap();
        std::fs::write(runtime.join("bin").join("activate"), "# activate\n").unwrap();

        let secrets_file = root.join("secrets");
        std::fs::write(&secrets_file, SECRETS).unwrap();

        let lock_path = root.join("aigrader.lock");
        let args_log = root.join("args.log");
        let marker_log = root.join("marker.log");

        write_script(
            &runtime.join("bin").join("aigrader"),
            &grader_script(&lock_path, &args_log, &marker_log, exit_code),
        );

        let config = Config {
            repo_root,
            runtime_env: runtime,
            secrets_file,
            lock_path,
            ..Config::default()
        };

        Self {
            temp_dir,
            config,
            args_log,
            marker_log,
        }
    }

    /// Number of times the grader has been invoked.
    pub(crate) fn invocations(&self) -> usize {
        std::fs::read_to_string(&self.args_log)
            .map(|s| s.matches("--assignment-file").count())
            .unwrap_or(0)
    }

    /// Arguments of the last invocation.
    pub(crate) fn last_args(&self) -> Vec<String> {
        let content = std::fs::read_to_string(&self.args_log).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        let start = lines
            .iter()
            .rposition(|l| *l == "--assignment-file")
            .expect("grader was never invoked");
        lines[start..].iter().map(|s| s.to_string()).collect()
    }

    /// Whether the grader observed the lock marker while running.
    pub(crate) fn grader_saw_marker(&self) -> bool {
        std::fs::read_to_string(&self.marker_log)
            .map(|s| s.contains("marker-present"))
            .unwrap_or(false)
    }
}

fn grader_script(lock_path: &Path, args_log: &Path, marker_log: &Path, exit_code: i32) -> String {
    format!(
        "#!/bin/sh\n\
         if [ -e '{lock}' ]; then echo marker-present >> '{marker}'; fi\n\
         printf '%s\\n' \"$@\" >> '{args}'\n\
         exit {code}\n",
        lock = lock_path.display(),
        marker = marker_log.display(),
        args = args_log.display(),
        code = exit_code
    )
}

pub(crate) fn write_script(path: &Path, content: &str) {
    std::fs::write(path, content).unwrap();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }
}
