//! Persistent key-value string storage
//!
//! The store keeps a handful of UI preferences (currently the page size)
//! across process restarts. Backends are plain string maps.

mod file;
mod memory;

pub use file::FileKeyValueStore;
pub use memory::MemoryKeyValueStore;

use anyhow::Result;

/// String-keyed, string-valued persistent storage
pub trait KeyValueStore: Send + Sync {
    /// Read a value; `None` when the key was never written
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value, replacing any previous one
    fn set(&self, key: &str, value: &str) -> Result<()>;
}
