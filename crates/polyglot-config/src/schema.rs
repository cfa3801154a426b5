//! Configuration schema definitions.
//!
//! Every section is `#[serde(default)]`: a file only needs the settings it
//! changes.

use polyglot_common::{Locale, Zone};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for Polyglot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Client configuration.
    pub client: ClientConfig,
    /// Dictionary store configuration.
    pub store: StoreConfig,
    /// Extraction tool configuration.
    pub extract: ExtractConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Locales in priority order; the first one is the primary locale.
    pub locales: Vec<Locale>,
    /// Zones entered at start-up.
    pub zones: Vec<Zone>,
    /// IANA time zone used to format dates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    /// ISO 4217 currency used by the `currency` processor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

/// Dictionary store configuration.
///
/// Dictionary files are always written in UTF-16LE.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Dictionary file.
    pub path: PathBuf,
    /// Delay between a modification and the save it triggers.
    pub save_delay_ms: u64,
}

impl StoreConfig {
    /// The save delay as a [`Duration`].
    pub const fn save_delay(&self) -> Duration {
        Duration::from_millis(self.save_delay_ms)
    }
}

/// Extraction tool configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Dictionary file to extract from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<PathBuf>,
    /// Output directory; defaults to the directory of `input`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    /// Output file name pattern, `$` standing for the locale.
    pub pattern: String,
    /// Write every locale in a single file.
    pub grouped: bool,
    /// Re-export whenever the input changes.
    pub watch: bool,
    /// Locales to export.
    pub locales: Vec<Locale>,
    /// Name of the global object receiving preloads.
    pub global: String,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directives.
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}
