//! File-backed key-value storage
//!
//! Values live in a single JSON object file. The file is read on every
//! `get` and rewritten on every `set`, so separate processes (and separate
//! store instances) see each other's writes.

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::KeyValueStore;
use crate::config::paths;

/// JSON-file storage
pub struct FileKeyValueStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl FileKeyValueStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }

        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read storage file: {}", self.path.display()))?;
        if contents.trim().is_empty() {
            return Ok(Map::new());
        }

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse storage file: {}", self.path.display()))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Option<String> {
        match self.load() {
            Ok(map) => match map.get(key) {
                Some(Value::String(value)) => Some(value.clone()),
                Some(Value::Null) | None => None,
                Some(other) => Some(other.to_string()),
            },
            Err(e) => {
                tracing::warn!("Ignoring unreadable storage file: {:#}", e);
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| anyhow::anyhow!("storage lock poisoned"))?;

        let mut map = self.load().unwrap_or_default();
        map.insert(key.to_string(), Value::String(value.to_string()));

        if let Some(parent) = self.path.parent() {
            paths::ensure_dir(parent)?;
        }

        let json = serde_json::to_string_pretty(&map).context("Failed to serialize storage")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write storage file: {}", self.path.display()))?;

        Ok(())
    }
}
