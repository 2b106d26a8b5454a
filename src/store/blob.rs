//! The key-value blob store that expenses are persisted to.
//!
//! `ExpenseStore` only needs to read one value at startup and overwrite it after every change, so
//! the `BlobStore` trait is deliberately small. `MemoryBlobStore` keeps values in a map and is
//! used for tests and throwaway sessions; `FileBlobStore` keeps one file per key in a directory.

use crate::fs;
use anyhow::{bail, ensure};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::trace;

/// A string-valued key-value store.
pub trait BlobStore {
    /// Returns the value stored under `key`, or `None` if nothing has been stored.
    fn read(&self, key: &str) -> anyhow::Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn write(&mut self, key: &str, value: &str) -> anyhow::Result<()>;
}

/// Holds values in memory. Writes can be made to fail to simulate a full or disabled storage.
#[derive(Debug, Default, Clone)]
pub struct MemoryBlobStore {
    data: HashMap<String, String>,
    fail_writes: bool,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with a single `key`/`value` pair.
    pub fn with_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut data = HashMap::new();
        data.insert(key.into(), value.into());
        Self {
            data,
            fail_writes: false,
        }
    }

    /// When `true`, every subsequent `write` returns an error and leaves the stored value alone.
    pub fn set_fail_writes(&mut self, fail_writes: bool) {
        self.fail_writes = fail_writes;
    }
}

impl BlobStore for MemoryBlobStore {
    fn read(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.data.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        if self.fail_writes {
            bail!("Storage quota exceeded while writing '{key}'");
        }
        self.data.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FileBlobStore {
    dir: PathBuf,
}

impl FileBlobStore {
    /// Creates the store, creating `dir` if it does not exist.
    pub fn new(dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> anyhow::Result<PathBuf> {
        ensure!(
            is_valid_key(key),
            "Invalid storage key '{key}', only letters, digits, '_' and '-' are allowed"
        );
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl BlobStore for FileBlobStore {
    fn read(&self, key: &str) -> anyhow::Result<Option<String>> {
        let path = self.path(key)?;
        trace!("Reading {}", path.display());
        fs::read_optional(path)
    }

    fn write(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        let path = self.path(key)?;
        trace!("Writing {} bytes to {}", value.len(), path.display());
        fs::write_replace(path, value)
    }
}

/// Keys double as file names, so they are limited to letters, digits, `_` and `-`.
pub(crate) fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
