//! Integration tests for polyglot-cli crate.

use polyglot_cli::{export_locales, watch_input, Cli, ExtractSettings};
use polyglot_common::test_utils::create_test_runtime;
use polyglot_common::CondensedDictionary;
use polyglot_config::{Config, ConfigCache};
use polyglot_server::I18nServer;
use polyglot_store::file::encode_utf16le;
use polyglot_store::FileStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const DICTIONARY: &str = "fld.name:\n\ten:Name\n\tfr:Nom\nfld.bdate:\n\ten:Birthday\ncmd.ban:adm\n\ten:Ban user\n";

fn write_dictionary(path: &Path, content: &str) {
    std::fs::write(path, encode_utf16le(content)).unwrap();
}

fn settings(dir: &TempDir, grouped: bool) -> ExtractSettings {
    ExtractSettings {
        input: dir.path().join("dictionary.db"),
        output: dir.path().join("public"),
        pattern: "$.js".to_string(),
        grouped,
        watch: false,
        locales: vec!["en".to_string(), "fr".to_string()],
        global: "Polyglot".to_string(),
    }
}

async fn open(settings: &ExtractSettings) -> Arc<FileStore> {
    Arc::new(FileStore::open(&settings.input, Duration::from_secs(10)).await.unwrap())
}

/// Splits a preload script into its locale and dictionaries.
fn parse_script(script: &str) -> (String, Vec<CondensedDictionary>) {
    let body = script
        .strip_prefix("Polyglot.preload('")
        .and_then(|rest| rest.strip_suffix(')'))
        .unwrap();
    let (locale, json) = body.split_once("', ").unwrap();
    (locale.to_string(), serde_json::from_str(json).unwrap())
}

// ============================================================================
// Export
// ============================================================================

#[tokio::test]
async fn test_one_file_per_locale() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings(&dir, false);
    write_dictionary(&settings.input, DICTIONARY);
    let server = I18nServer::new(open(&settings).await);

    let written = export_locales(&server, &settings).await.unwrap();
    assert_eq!(
        written,
        vec![
            dir.path().join("public/en.js"),
            dir.path().join("public/fr.js")
        ]
    );

    let (locale, dictionaries) = parse_script(&std::fs::read_to_string(&written[1]).unwrap());
    assert_eq!(locale, "fr");
    assert_eq!(dictionaries.len(), 1);
    let root = &dictionaries[0];
    let name = root.get("fld.name").unwrap();
    assert_eq!(name.text.as_deref(), Some("Nom"));
    assert!(!name.fallback);
    let bdate = root.get("fld.bdate").unwrap();
    assert_eq!(bdate.text.as_deref(), Some("Birthday"));
    assert!(bdate.fallback);
    assert!(root.get("cmd.ban").is_none());
}

#[test]
fn test_grouped_file() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings(&dir, true);
    write_dictionary(&settings.input, DICTIONARY);

    let runtime = create_test_runtime();
    let written = runtime.block_on(async {
        let server = I18nServer::new(open(&settings).await);
        export_locales(&server, &settings).await.unwrap()
    });
    assert_eq!(written, vec![dir.path().join("public/all.js")]);

    let content = std::fs::read_to_string(&written[0]).unwrap();
    let locales: Vec<String> = content
        .split(";\n")
        .map(|script| parse_script(script).0)
        .collect();
    assert_eq!(locales, vec!["en", "fr"]);
}

// ============================================================================
// Watch
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_watch_exports_changes() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings(&dir, false);
    write_dictionary(&settings.input, DICTIONARY);
    let store = open(&settings).await;
    export_locales(&I18nServer::new(Arc::clone(&store)), &settings)
        .await
        .unwrap();

    let (stop, stopped) = tokio::sync::oneshot::channel::<()>();
    let watching = {
        let settings = settings.clone();
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            watch_input(store, move || Ok(settings.clone()), async {
                let _ = stopped.await;
            })
            .await
        })
    };

    tokio::time::sleep(Duration::from_millis(200)).await;
    write_dictionary(
        &settings.input,
        &DICTIONARY.replace("\tfr:Nom\n", "\tfr:Nom complet\n"),
    );

    let fr: PathBuf = dir.path().join("public/fr.js");
    let mut updated = false;
    for _ in 0..100 {
        tokio::time::sleep(Duration::from_millis(50)).await;
        let script = std::fs::read_to_string(&fr).unwrap_or_default();
        if script.contains("Nom complet") {
            updated = true;
            break;
        }
    }
    assert!(updated, "fr.js was not re-exported");

    stop.send(()).unwrap();
    watching.await.unwrap().unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_watch_follows_cached_configuration() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("dictionary.db");
    write_dictionary(&input, DICTIONARY);
    let store = Arc::new(FileStore::open(&input, Duration::from_secs(10)).await.unwrap());

    let mut config = Config::default();
    config.extract.output = Some(dir.path().join("public"));
    config.extract.locales = vec!["fr".to_string()];
    let cache = Arc::new(ConfigCache::new(config));
    let cli = Cli {
        input: Some(input.clone()),
        output: None,
        pattern: None,
        grouped: false,
        watch: true,
        config: None,
        locales: Vec::new(),
    };

    let (stop, stopped) = tokio::sync::oneshot::channel::<()>();
    let watching = {
        let cache = Arc::clone(&cache);
        tokio::spawn(async move {
            watch_input(store, move || cli.clone().settings(&cache.get().extract), async {
                let _ = stopped.await;
            })
            .await
        })
    };

    tokio::time::sleep(Duration::from_millis(200)).await;
    cache
        .update_with(|config| config.extract.pattern = "i18n-$.js".to_string())
        .unwrap();
    write_dictionary(&input, &DICTIONARY.replace("\tfr:Nom\n", "\tfr:Nom complet\n"));

    let fr = dir.path().join("public/i18n-fr.js");
    let mut exported = false;
    for _ in 0..100 {
        tokio::time::sleep(Duration::from_millis(50)).await;
        if std::fs::read_to_string(&fr).unwrap_or_default().contains("Nom complet") {
            exported = true;
            break;
        }
    }
    assert!(exported, "i18n-fr.js was not exported");
    assert!(!dir.path().join("public/fr.js").exists());

    stop.send(()).unwrap();
    watching.await.unwrap().unwrap();
}
