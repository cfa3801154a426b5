//! Configuration errors.

use thiserror::Error;

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error when reading or writing a configuration file.
    #[error("Failed to access configuration file: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error.
    #[error("Failed to parse TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// YAML parsing or writing error.
    #[error("Failed to process YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// TOML writing error.
    #[error("Failed to write TOML configuration: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// One or more settings are invalid.
    #[error("Configuration validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// An environment variable holds a value of the wrong type.
    #[error("Failed to parse environment variable '{var}': {message}")]
    EnvParse {
        /// Variable name.
        var: String,
        /// What went wrong.
        message: String,
    },

    /// The file extension names no known format.
    #[error("Unsupported configuration format: {0}")]
    UnsupportedFormat(String),

    /// The file watcher could not be set up.
    #[error("Failed to watch configuration file: {0}")]
    Watch(#[from] notify::Error),
}
