//! Thread-safe configuration caching with arc-swap for lock-free reads.

use crate::error::ConfigResult;
use crate::loader::ConfigLoader;
use crate::schema::Config;
use crate::validator::ConfigValidator;
use arc_swap::ArcSwap;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Thread-safe configuration cache using arc-swap for lock-free reads.
///
/// Every replacement is validated first; a rejected configuration leaves the
/// current one in place.
pub struct ConfigCache {
    config: ArcSwap<Config>,
}

impl ConfigCache {
    /// Creates a new configuration cache with the given initial configuration.
    pub fn new(config: Config) -> Self {
        Self {
            config: ArcSwap::from_pointee(config),
        }
    }

    /// Gets the current configuration.
    pub fn get(&self) -> Arc<Config> {
        self.config.load_full()
    }

    /// Replaces the configuration atomically.
    pub fn replace(&self, config: Config) -> ConfigResult<()> {
        ConfigValidator::validate(&config)?;
        self.config.store(Arc::new(config));
        Ok(())
    }

    /// Applies `f` to a copy of the configuration and stores the result.
    pub fn update_with<F>(&self, f: F) -> ConfigResult<()>
    where
        F: FnOnce(&mut Config),
    {
        let mut config = Config::clone(&self.config.load());
        f(&mut config);
        self.replace(config)
    }

    /// Reloads the configuration from `path`.
    pub fn reload_from_file(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let config = ConfigLoader::load(path)?;
        self.config.store(Arc::new(config));
        Ok(())
    }

    /// Reloads the configuration every time `path` changes, until the
    /// returned watcher is dropped. Failed reloads are logged and keep the
    /// current configuration.
    pub fn watch(self: &Arc<Self>, path: impl Into<PathBuf>) -> ConfigResult<ConfigWatcher> {
        let path = path.into();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let cache = Arc::clone(self);
        let target = path.clone();
        let mut watcher = notify::recommended_watcher(move |event: notify::Result<Event>| {
            match event {
                Ok(event) if concerns(&event, &target) => match cache.reload_from_file(&target) {
                    Ok(()) => info!("Reloaded configuration from {}", target.display()),
                    Err(e) => warn!("Keeping previous configuration: {}", e),
                },
                Ok(_) => {}
                Err(e) => warn!("Configuration watch error: {}", e),
            }
        })?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        Ok(ConfigWatcher {
            _watcher: watcher,
            path,
        })
    }
}

fn concerns(event: &Event, target: &Path) -> bool {
    (event.kind.is_modify() || event.kind.is_create())
        && event
            .paths
            .iter()
            .any(|p| p.file_name() == target.file_name())
}

impl Default for ConfigCache {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

/// Keeps a [`ConfigCache`] in sync with its file while alive.
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    path: PathBuf,
}

impl ConfigWatcher {
    /// The watched file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_rejects_invalid() {
        let cache = ConfigCache::default();
        let mut invalid = Config::default();
        invalid.extract.pattern = "all.js".to_string();

        assert!(cache.replace(invalid).is_err());
        assert_eq!(cache.get().extract.pattern, "$.js");
    }

    #[test]
    fn test_update_with() {
        let cache = ConfigCache::default();
        let before = cache.get();
        cache
            .update_with(|config| config.client.locales = vec!["fr".to_string()])
            .unwrap();

        assert_eq!(cache.get().client.locales, vec!["fr"]);
        assert_eq!(before.client.locales, vec!["en"]);
        assert!(cache
            .update_with(|config| config.client.currency = Some("euros".to_string()))
            .is_err());
        assert_eq!(cache.get().client.currency, None);
    }

    #[test]
    fn test_cache_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}
        assert_send::<ConfigCache>();
        assert_sync::<ConfigCache>();
    }
}
