//! Configuration loading and merging logic
//!
//! Handles loading configuration from multiple sources and merging them
//! according to precedence rules.

use super::{defaults, paths, schema::Config};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with all layers merged
    ///
    /// Precedence order (highest to lowest):
    /// 1. Environment variable overrides
    /// 2. Root config file
    /// 3. Built-in defaults
    pub fn load() -> Result<Config> {
        Self::load_from(&paths::root_config_path())
    }

    /// Load configuration using `path` as the root config file
    pub fn load_from(path: &Path) -> Result<Config> {
        let mut config = Self::load_defaults();

        if path.exists() {
            config = Self::load_file(path)?;
        }

        Ok(Self::apply_env_overrides(config))
    }

    /// Load configuration from a file
    pub fn load_file(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found: {}", path.display()));
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration by loading and checking for errors
    ///
    /// This performs strict validation - it will fail on:
    /// - Invalid YAML syntax
    /// - Invalid value types
    /// - An API base URL that does not parse
    /// - A zero request timeout
    pub fn validate() -> Result<()> {
        let config = Self::load().context("Failed to load merged configuration")?;
        Self::check(&config)
    }

    /// Semantic checks on an already-parsed configuration
    pub fn check(config: &Config) -> Result<()> {
        url::Url::parse(&config.api.base_url)
            .with_context(|| format!("api.baseUrl is not a valid URL: {}", config.api.base_url))?;

        if config.api.timeout_secs == 0 {
            return Err(anyhow::anyhow!("api.timeoutSecs must be greater than 0"));
        }

        Ok(())
    }

    /// Load default configuration
    pub fn load_defaults() -> Config {
        defaults::default_config()
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(mut config: Config) -> Config {
        // APPCONFIG_API_URL override
        if let Ok(base_url) = std::env::var("APPCONFIG_API_URL") {
            config.api.base_url = base_url;
        }

        // APPCONFIG_TIMEOUT_SECS override
        if let Ok(timeout) = std::env::var("APPCONFIG_TIMEOUT_SECS") {
            if let Ok(val) = timeout.parse::<u64>() {
                config.api.timeout_secs = val;
            }
        }

        // APPCONFIG_STORAGE_FILE override
        if let Ok(storage_file) = std::env::var("APPCONFIG_STORAGE_FILE") {
            config.storage_file = Some(PathBuf::from(storage_file));
        }

        config
    }

    /// Save configuration to a file
    pub fn save(config: &Config, path: &Path) -> Result<()> {
        // Ensure directory exists
        if let Some(parent) = path.parent() {
            paths::ensure_dir(parent)?;
        }

        let yaml =
            serde_yaml::to_string(config).context("Failed to serialize configuration to YAML")?;

        std::fs::write(path, yaml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Save root configuration
    pub fn save_root(config: &Config) -> Result<()> {
        Self::save(config, &paths::root_config_path())
    }
}
