//! Default values.

use crate::schema::{ClientConfig, ExtractConfig, LoggingConfig, StoreConfig};
use std::path::PathBuf;

/// Default save delay of a file store, in milliseconds.
pub const DEFAULT_SAVE_DELAY_MS: u64 = 10_000;

/// Default output file pattern of the extraction tool.
pub const DEFAULT_PATTERN: &str = "$.js";

/// Default name of the global object receiving preloads.
pub const DEFAULT_GLOBAL: &str = "Polyglot";

/// Default dictionary file.
pub const DEFAULT_STORE_PATH: &str = "dictionary.db";

/// Default log filter.
pub const DEFAULT_LOG_FILTER: &str = "polyglot=info";

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            locales: vec!["en".to_string()],
            zones: vec![String::new()],
            time_zone: None,
            currency: None,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_STORE_PATH),
            save_delay_ms: DEFAULT_SAVE_DELAY_MS,
        }
    }
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            input: None,
            output: None,
            pattern: DEFAULT_PATTERN.to_string(),
            grouped: false,
            watch: false,
            locales: Vec::new(),
            global: DEFAULT_GLOBAL.to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::schema::Config;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.client.locales, vec!["en"]);
        assert_eq!(config.client.zones, vec![""]);
        assert_eq!(config.store.save_delay_ms, 10_000);
        assert_eq!(config.extract.pattern, "$.js");
        assert_eq!(config.extract.global, "Polyglot");
        assert_eq!(config.logging.filter, "polyglot=info");
        assert!(!config.logging.json);
    }
}
