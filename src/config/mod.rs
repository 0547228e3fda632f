//! Configuration system for appconfig-store
//!
//! Layered configuration (defaults, root YAML file, environment) for the
//! remote service client and the store.

pub mod defaults;
pub mod loader;
pub mod paths;
pub mod schema;

pub use defaults::{DEFAULT_TAKE, TAKE_STORAGE_KEY};
pub use loader::ConfigLoader;
pub use schema::{ApiConfig, Config};

use std::path::PathBuf;

/// Get a configuration value by key (dot notation)
pub fn get_config_value(config: &schema::Config, key: &str) -> anyhow::Result<String> {
    match key {
        "api.baseUrl" => Ok(config.api.base_url.clone()),
        "api.resourcePath" => Ok(config.api.resource_path.clone()),
        "api.timeoutSecs" => Ok(config.api.timeout_secs.to_string()),
        "relationalFields" => Ok(config.relational_fields.join(",")),
        "storageFile" => Ok(config.storage_path().display().to_string()),
        _ => Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }
}

/// Set a configuration value by key (dot notation)
pub fn set_config_value(config: &mut schema::Config, key: &str, value: &str) -> anyhow::Result<()> {
    use anyhow::Context;
    match key {
        "api.baseUrl" => {
            url::Url::parse(value).context("api.baseUrl must be an absolute URL")?;
            config.api.base_url = value.to_string();
        }
        "api.resourcePath" => {
            config.api.resource_path = value.to_string();
        }
        "api.timeoutSecs" => {
            config.api.timeout_secs = value
                .parse()
                .context("api.timeoutSecs must be a number")?;
        }
        "relationalFields" => {
            // Parse as YAML array or comma-separated list
            config.relational_fields = if value.trim_start().starts_with('[') {
                serde_yaml::from_str(value)
                    .context("relationalFields must be a YAML array (e.g., ['owner', 'tags'])")?
            } else {
                value
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            };
        }
        "storageFile" => {
            config.storage_file = if value.is_empty() {
                None
            } else {
                Some(PathBuf::from(value))
            };
        }
        _ => return Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }

    Ok(())
}
