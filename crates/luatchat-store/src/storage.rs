//! Persistent key-value storage collaborator.
//!
//! The store only ever needs string get/set on a handful of keys; the trait
//! keeps the store testable without touching the filesystem.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

/// Client-local string key-value storage.
pub trait KvStorage: Send {
    /// Read a key; absent and unreadable are both `None`.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a key, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// File-backed storage: one file per key inside a storage directory.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl KvStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.dir.join(key)).ok()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create storage dir {}", self.dir.display()))?;
        let path = self.dir.join(key);
        fs::write(&path, value)
            .with_context(|| format!("Failed to write storage key to {}", path.display()))
    }
}

/// In-memory storage for tests and ephemeral runs.
#[derive(Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
