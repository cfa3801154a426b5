//! Main entry point for the Polyglot extraction tool.

use anyhow::{Context, Result};
use clap::Parser;
use polyglot_cli::{export_locales, watch_input, Cli};
use polyglot_config::{Config, ConfigCache, ConfigLoader, LoggingConfig};
use polyglot_server::I18nServer;
use polyglot_store::FileStore;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.clone().or_else(ConfigLoader::discover_path);
    let config = load_config(config_path.as_deref())?;
    init_tracing(&config.logging);

    let settings = cli.clone().settings(&config.extract)?;
    let store = Arc::new(
        FileStore::open(&settings.input, config.store.save_delay())
            .await
            .with_context(|| format!("Failed to open {}", settings.input.display()))?,
    );
    let server = I18nServer::new(Arc::clone(&store));

    let written = export_locales(&server, &settings).await?;
    info!("Exported {} file(s)", written.len());

    if settings.watch {
        let cache = Arc::new(ConfigCache::new(config));
        let _watcher = match &config_path {
            Some(path) => Some(
                cache
                    .watch(path)
                    .with_context(|| format!("Failed to watch {}", path.display()))?,
            ),
            None => None,
        };
        let shutdown = async {
            let _ = tokio::signal::ctrl_c().await;
        };
        let settings = move || cli.clone().settings(&cache.get().extract);
        watch_input(store, settings, shutdown).await?;
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => ConfigLoader::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => ConfigLoader::discover().context("Failed to load configuration"),
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.filter));
    tracing_subscriber::registry()
        .with(filter)
        .with(logging.json.then(|| fmt::layer().json()))
        .with((!logging.json).then(fmt::layer))
        .init();
}
