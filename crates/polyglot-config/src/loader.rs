//! Configuration loading and persistence with atomic file operations.

use crate::error::{ConfigError, ConfigResult};
use crate::schema::Config;
use crate::validator::ConfigValidator;
use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_VAR: &str = "POLYGLOT_CONFIG";

/// Files looked for in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILES: &[&str] = &["polyglot.toml", "polyglot.yaml", "polyglot.yml"];

/// Serialization format of a configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML.
    Toml,
    /// YAML.
    Yaml,
}

impl ConfigFormat {
    /// Picks the format from the file extension.
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("toml") => Ok(Self::Toml),
            Some("yaml" | "yml") => Ok(Self::Yaml),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Configuration loader for the application.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads a configuration file, applies environment overrides and
    /// validates the result.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Config> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&content, format)?;
        Self::apply_env_overrides(&mut config)?;
        ConfigValidator::validate(&config)?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Loads the file named by `POLYGLOT_CONFIG`, else the first default
    /// file found in the working directory, else the defaults. Environment
    /// overrides apply in every case.
    pub fn discover() -> ConfigResult<Config> {
        if let Some(path) = Self::discover_path() {
            return Self::load(path);
        }
        let mut config = Config::default();
        Self::apply_env_overrides(&mut config)?;
        ConfigValidator::validate(&config)?;
        debug!("No configuration file found, using defaults");
        Ok(config)
    }

    /// The file [`Self::discover`] loads, if any.
    pub fn discover_path() -> Option<PathBuf> {
        if let Ok(path) = env::var(CONFIG_PATH_VAR) {
            return Some(PathBuf::from(path));
        }
        DEFAULT_CONFIG_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Parses configuration text without overrides or validation.
    pub fn parse(content: &str, format: ConfigFormat) -> ConfigResult<Config> {
        Ok(match format {
            ConfigFormat::Toml => toml::from_str(content)?,
            ConfigFormat::Yaml => serde_yaml::from_str(content)?,
        })
    }

    /// Writes `config` to `path` atomically, in the format its extension
    /// names.
    pub fn save(path: impl AsRef<Path>, config: &Config) -> ConfigResult<()> {
        let path = path.as_ref();
        let content = match ConfigFormat::from_path(path)? {
            ConfigFormat::Toml => toml::to_string_pretty(config)?,
            ConfigFormat::Yaml => serde_yaml::to_string(config)?,
        };
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = tempfile::NamedTempFile::new_in(dir)?;
        file.write_all(content.as_bytes())?;
        file.persist(path).map_err(|e| ConfigError::Io(e.error))?;
        debug!("Saved configuration to {}", path.display());
        Ok(())
    }

    /// Applies `POLYGLOT_*` environment variables to `config`.
    pub fn apply_env_overrides(config: &mut Config) -> ConfigResult<()> {
        Self::apply_overrides(config, |var| env::var(var).ok())
    }

    /// Applies overrides read through `lookup`.
    pub fn apply_overrides<F>(config: &mut Config, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(locales) = lookup("POLYGLOT_LOCALES") {
            config.client.locales = locales
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Some(time_zone) = lookup("POLYGLOT_TIME_ZONE") {
            config.client.time_zone = Some(time_zone);
        }

        if let Some(currency) = lookup("POLYGLOT_CURRENCY") {
            config.client.currency = Some(currency);
        }

        if let Some(path) = lookup("POLYGLOT_STORE_PATH") {
            config.store.path = PathBuf::from(path);
        }

        if let Some(delay) = lookup("POLYGLOT_SAVE_DELAY_MS") {
            config.store.save_delay_ms =
                delay.trim().parse().map_err(|e: std::num::ParseIntError| {
                    ConfigError::EnvParse {
                        var: "POLYGLOT_SAVE_DELAY_MS".to_string(),
                        message: e.to_string(),
                    }
                })?;
        }

        if let Some(filter) = lookup("POLYGLOT_LOG") {
            config.logging.filter = filter;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(ConfigFormat::from_path(Path::new("a.toml")).unwrap(), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("a.YAML")).unwrap(), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("dir/a.yml")).unwrap(), ConfigFormat::Yaml);
        assert!(matches!(
            ConfigFormat::from_path(Path::new("a.json")),
            Err(ConfigError::UnsupportedFormat(_))
        ));
        assert!(ConfigFormat::from_path(Path::new("config")).is_err());
    }

    #[test]
    fn test_parse_partial_toml() {
        let config = ConfigLoader::parse("[store]\nsave_delay_ms = 250\n", ConfigFormat::Toml)
            .unwrap();
        assert_eq!(config.store.save_delay_ms, 250);
        assert_eq!(config.client.locales, vec!["en"]);
    }

    #[test]
    fn test_invalid_yaml() {
        let result = ConfigLoader::parse("client:\n  locales: [unclosed", ConfigFormat::Yaml);
        assert!(matches!(result, Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn test_overrides() {
        let mut config = Config::default();
        ConfigLoader::apply_overrides(
            &mut config,
            lookup(&[
                ("POLYGLOT_LOCALES", "fr-BE, fr ,,en"),
                ("POLYGLOT_TIME_ZONE", "Europe/Brussels"),
                ("POLYGLOT_CURRENCY", "EUR"),
                ("POLYGLOT_STORE_PATH", "/srv/i18n.db"),
                ("POLYGLOT_SAVE_DELAY_MS", "75"),
            ]),
        )
        .unwrap();

        assert_eq!(config.client.locales, vec!["fr-BE", "fr", "en"]);
        assert_eq!(config.client.time_zone.as_deref(), Some("Europe/Brussels"));
        assert_eq!(config.client.currency.as_deref(), Some("EUR"));
        assert_eq!(config.store.path, PathBuf::from("/srv/i18n.db"));
        assert_eq!(config.store.save_delay_ms, 75);
    }

    #[test]
    fn test_override_parse_error() {
        let mut config = Config::default();
        let result = ConfigLoader::apply_overrides(
            &mut config,
            lookup(&[("POLYGLOT_SAVE_DELAY_MS", "soon")]),
        );
        assert!(matches!(result, Err(ConfigError::EnvParse { ref var, .. }) if var == "POLYGLOT_SAVE_DELAY_MS"));
    }

    #[test]
    fn test_missing_config_file() {
        let result = ConfigLoader::load("/nonexistent/path/polyglot.toml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
