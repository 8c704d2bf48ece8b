//! Common test utilities for replicator integration tests.
//!
//! Provides `TestEnv` for isolated test environments that don't pollute
//! the user's `~/.local/share/replicator/` directory.

#![allow(dead_code)]

use assert_cmd::Command;
pub use tempfile::TempDir;

/// A test environment with an isolated data directory.
///
/// The `rp()` method returns a `Command` that sets `RP_DATA_DIR`
/// per-invocation, making tests parallel-safe.
pub struct TestEnv {
    pub data_dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            data_dir: TempDir::new().unwrap(),
        }
    }

    /// Create an environment with a run deployed from the default board.
    pub fn deployed() -> Self {
        let env = Self::new();
        env.rp()
            .args(["deploy", "--brief", "Ship the dashboard", "--seed", "7"])
            .assert()
            .success();
        env
    }

    /// Get a Command for the rp binary with isolated data directory.
    pub fn rp(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_rp"));
        cmd.env("RP_DATA_DIR", self.data_dir.path());
        cmd.env_remove("RP_LOG");
        cmd
    }

    /// Run an rp command expected to succeed and parse its JSON output.
    pub fn json(&self, args: &[&str]) -> serde_json::Value {
        let output = self.rp().args(args).output().unwrap();
        assert!(
            output.status.success(),
            "rp {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).unwrap()
    }

    pub fn data_path(&self) -> &std::path::Path {
        self.data_dir.path()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
