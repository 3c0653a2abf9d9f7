#![allow(dead_code)]

use assert_cmd::Command;
use std::path::PathBuf;
use tempfile::TempDir;
use uuid::Uuid;

/// Test harness for running CLI commands against a temporary database
pub struct CliTestHarness {
    temp_dir: TempDir,
    db_path: PathBuf,
    user_id: String,
}

impl CliTestHarness {
    /// Create a new test harness with a temporary database
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db");

        Self {
            temp_dir,
            db_path,
            user_id: "tester".to_string(),
        }
    }

    /// Same database, acting as another user
    pub fn as_user(&self, user_id: &str) -> Command {
        let mut cmd = self.command();
        cmd.env("LIFEBOARD_USER_ID", user_id);
        cmd
    }

    /// Get a Command instance configured for testing
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("lifeboard").expect("Failed to find lifeboard binary");

        // Run inside the temp dir so no stray lifeboard.toml is picked up
        cmd.current_dir(self.temp_dir.path())
            .env("LIFEBOARD_DATABASE_PATH", &self.db_path)
            .env("LIFEBOARD_TIMEZONE", "UTC")
            .env("LIFEBOARD_USER_ID", &self.user_id)
            .env_remove("RUST_LOG")
            .env_remove("LIFEBOARD_LOG_LEVEL");

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

    /// Runs a creating command and returns the id it printed
    pub fn create(&self, args: &[&str]) -> String {
        let output = self.run_success(args).get_output().stdout.clone();
        extract_id(&String::from_utf8_lossy(&output)).expect("no id in output")
    }
}

/// First UUID in `text`, ignoring surrounding color codes.
pub fn extract_id(text: &str) -> Option<String> {
    (0..text.len()).find_map(|start| {
        let candidate = text.get(start..start + 36)?;
        Uuid::parse_str(candidate).ok().map(|id| id.to_string())
    })
}

/// Utility functions for test assertions
pub mod assertions {
    use predicates::prelude::*;

    pub fn has_task_table_headers() -> impl Predicate<str> {
        predicate::str::contains("ID")
            .and(predicate::str::contains("Title"))
            .and(predicate::str::contains("Status"))
    }

    pub fn has_habit_table_headers() -> impl Predicate<str> {
        predicate::str::contains("Streak").and(predicate::str::contains("Rate"))
    }

    pub fn has_error() -> impl Predicate<str> {
        predicate::str::contains("Error").or(predicate::str::contains("error"))
    }
}
