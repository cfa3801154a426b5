//! Preload script generation.

use anyhow::{Context, Result};
use polyglot_common::{CondensedDictionary, Locale, Zone};
use polyglot_server::I18nServer;
use polyglot_store::Store;
use std::path::PathBuf;
use tracing::info;

/// What `$` stands for in the name of a grouped output file.
pub const GROUPED_NAME: &str = "all";

/// Resolved extraction settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractSettings {
    /// Dictionary file.
    pub input: PathBuf,
    /// Output directory.
    pub output: PathBuf,
    /// Output file name pattern.
    pub pattern: String,
    /// One file for every locale.
    pub grouped: bool,
    /// Keep exporting on changes.
    pub watch: bool,
    /// Locales to export, also used as fallbacks of each other.
    pub locales: Vec<Locale>,
    /// Global object receiving the preloads.
    pub global: String,
}

impl ExtractSettings {
    /// Output file whose name is the pattern with `$` replaced by `name`.
    pub fn output_file(&self, name: &str) -> PathBuf {
        self.output.join(self.pattern.replacen('$', name, 1))
    }

    /// Search list used for `locale`: the locale itself, then every exported
    /// locale.
    pub fn search_list(&self, locale: &str) -> Vec<Locale> {
        std::iter::once(locale.to_string())
            .chain(self.locales.iter().cloned())
            .collect()
    }
}

/// The script handing `dictionaries` to `global` for `locale`.
pub fn preload_script(
    global: &str,
    locale: &str,
    dictionaries: &[CondensedDictionary],
) -> Result<String> {
    let json = serde_json::to_string(dictionaries).context("Failed to encode dictionary")?;
    let locale = locale.replace('\\', "\\\\").replace('\'', "\\'");
    Ok(format!("{global}.preload('{locale}', {json})"))
}

/// Exports every configured locale and returns the written files.
pub async fn export_locales<S: Store + ?Sized>(
    server: &I18nServer<S>,
    settings: &ExtractSettings,
) -> Result<Vec<PathBuf>> {
    tokio::fs::create_dir_all(&settings.output)
        .await
        .with_context(|| format!("Failed to create {}", settings.output.display()))?;

    let mut scripts = Vec::with_capacity(settings.locales.len());
    for locale in &settings.locales {
        let dictionaries = server
            .condense_zones(&settings.search_list(locale), &[Zone::new()])
            .await
            .with_context(|| format!("Failed to condense locale {locale}"))?;
        scripts.push((locale, preload_script(&settings.global, locale, &dictionaries)?));
    }

    let files: Vec<(PathBuf, String)> = if settings.grouped {
        let content = scripts
            .into_iter()
            .map(|(_, script)| script)
            .collect::<Vec<_>>()
            .join(";\n");
        vec![(settings.output_file(GROUPED_NAME), content)]
    } else {
        scripts
            .into_iter()
            .map(|(locale, script)| (settings.output_file(locale), script))
            .collect()
    };

    let mut written = Vec::with_capacity(files.len());
    for (path, content) in files {
        tokio::fs::write(&path, content)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("-> {}", path.display());
        written.push(path);
    }
    Ok(written)
}
