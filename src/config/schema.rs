//! Configuration schema definitions
//!
//! Defines the structure of configuration files using serde for serialization.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Remote service settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Fields returned as inline objects that list views flatten to arrays
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relational_fields: Vec<String>,

    /// Location of the persisted UI preferences (page size, ...)
    /// Defaults to `storage.json` in the data directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_file: Option<PathBuf>,
}

/// Remote service configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApiConfig {
    /// Service origin, e.g. `http://localhost:3000`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the AppConfig resource below the origin
    #[serde(default = "default_resource_path")]
    pub resource_path: String,

    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_resource_path() -> String {
    "/app-config".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            resource_path: default_resource_path(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            relational_fields: Vec::new(),
            storage_file: None,
        }
    }
}

impl Config {
    /// Resolved path of the preferences file
    pub fn storage_path(&self) -> PathBuf {
        self.storage_file
            .clone()
            .unwrap_or_else(super::paths::default_storage_path)
    }
}
