//! Default configuration values
//!
//! Provides default configuration instances and helper functions.

use super::schema::Config;

/// Page size used when none has been persisted yet
pub const DEFAULT_TAKE: u64 = 5;

/// Storage key under which the page size is persisted
pub const TAKE_STORAGE_KEY: &str = "take";

/// Get the default configuration
pub fn default_config() -> Config {
    Config::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = default_config();
        assert_eq!(config.api.base_url, "http://localhost:3000");
        assert_eq!(config.api.resource_path, "/app-config");
    }
}
