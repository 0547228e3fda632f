//! Where the config file and persisted preferences live
//!
//! Both directories can be pinned through the environment; otherwise they
//! come from the platform's per-user locations for the app.

use directories::ProjectDirs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "appconfig-store";

/// Directory holding `config.yaml` (`APPCONFIG_CONFIG_DIR` overrides)
pub fn config_dir() -> PathBuf {
    resolve("APPCONFIG_CONFIG_DIR", |dirs| dirs.config_dir())
}

/// Directory holding `storage.json` (`APPCONFIG_DATA_DIR` overrides)
pub fn data_dir() -> PathBuf {
    resolve("APPCONFIG_DATA_DIR", |dirs| dirs.data_dir())
}

fn resolve(env_var: &str, pick: impl Fn(&ProjectDirs) -> &Path) -> PathBuf {
    if let Ok(dir) = std::env::var(env_var) {
        return PathBuf::from(dir);
    }

    // No home directory: stay next to the working directory
    ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| pick(&dirs).to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".").join(format!(".{}", APP_NAME)))
}

/// Get the root configuration file path
pub fn root_config_path() -> PathBuf {
    config_dir().join("config.yaml")
}

/// Default location of the persisted preferences
pub fn default_storage_path() -> PathBuf {
    data_dir().join("storage.json")
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
