//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::args::AddArgs;
use crate::commands;
use crate::Config;
use tempfile::TempDir;

/// Test environment that sets up an expenses home directory with a Config.
/// Holds TempDir to keep the directory alive for the duration of the test.
pub struct TestEnv {
    _temp_dir: TempDir,
    config: Config,
}

impl TestEnv {
    /// Creates a test environment with a freshly initialized home directory.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("expenses");
        let config = Config::create(&root).await.unwrap();
        Self {
            _temp_dir: temp_dir,
            config,
        }
    }

    /// Returns a clone of the Config.
    pub fn config(&self) -> Config {
        self.config.clone()
    }

    /// Adds an expense through the `add` command, panicking if it is rejected or not saved.
    pub async fn add(&self, amount: &str, category: &str, date: &str, notes: &str) {
        let out = commands::add(self.config(), AddArgs::new(amount, category, date, notes))
            .await
            .unwrap();
        assert!(out.structure().unwrap().persistence().is_saved());
    }
}
