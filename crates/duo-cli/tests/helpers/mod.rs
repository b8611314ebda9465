use assert_cmd::Command;
use serde_json::Value;
use std::path::PathBuf;
use tempfile::TempDir;

/// Test harness for running CLI commands with temporary databases
pub struct CliTestHarness {
    _temp_dir: TempDir,
    db_path: PathBuf,
    config_path: PathBuf,
}

impl CliTestHarness {
    /// Create a new test harness with a temporary database
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db");
        // Never created, so no stray duo.toml is picked up
        let config_path = temp_dir.path().join("duo.toml");

        Self {
            _temp_dir: temp_dir,
            db_path,
            config_path,
        }
    }

    /// Get a Command instance configured for testing
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("duo").expect("Failed to find duo binary");
        cmd.env("DUO_DATABASE_PATH", &self.db_path);
        cmd.env("DUO_CONFIG", &self.config_path);
        cmd.env_remove("DUO_DEFAULT_COUPLE");
        cmd.env_remove("RUST_LOG");
        cmd
    }

    /// Helper to run a command and assert success
    pub fn run_success(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().success()
    }

    /// Helper to run a command and assert failure
    pub fn run_failure(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().failure()
    }

    /// Runs with `--json` and parses stdout
    pub fn run_json(&self, args: &[&str]) -> Value {
        let output = self
            .command()
            .arg("--json")
            .args(args)
            .output()
            .expect("Failed to run duo");
        assert!(
            output.status.success(),
            "duo {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
    }
}

/// A couple with two members, created through the CLI
pub struct Household {
    pub couple: String,
    pub alex: String,
    pub sam: String,
}

impl Household {
    pub fn create(harness: &CliTestHarness) -> Self {
        let couple = id_of(&harness.run_json(&["couple", "create", "Alex & Sam"]));
        let alex = id_of(&harness.run_json(&["--couple", &couple, "member", "add", "Alex"]));
        let sam = id_of(&harness.run_json(&["--couple", &couple, "member", "add", "Sam"]));
        Self { couple, alex, sam }
    }
}

pub fn id_of(value: &Value) -> String {
    value["id"].as_str().expect("JSON object with an id").to_string()
}

/// Utility functions for test assertions
pub mod assertions {
    use predicates::prelude::*;

    /// Predicate to check for error messages
    pub fn has_error() -> impl Predicate<str> {
        predicate::str::contains("Error").or(predicate::str::contains("error"))
    }

    pub fn created_successfully() -> impl Predicate<str> {
        predicate::str::contains("✓").and(predicate::str::contains("Created"))
    }
}
