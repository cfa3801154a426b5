//! Re-exporting on dictionary changes.

use crate::export::{export_locales, ExtractSettings};
use anyhow::{Context, Result};
use notify::{Event, RecursiveMode, Watcher};
use polyglot_server::I18nServer;
use polyglot_store::FileStore;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Reloads `store` and exports again each time its file changes, until
/// `shutdown` completes.
///
/// `settings` is called before every export, so that output settings can
/// follow a reloaded configuration. The input stays the file `store` was
/// opened on.
pub async fn watch_input<F>(
    store: Arc<FileStore>,
    settings: F,
    shutdown: impl Future<Output = ()>,
) -> Result<()>
where
    F: Fn() -> Result<ExtractSettings>,
{
    let (tx, mut rx) = mpsc::unbounded_channel();
    let target = store.path().to_path_buf();
    let filter_target = target.clone();
    let mut watcher = notify::recommended_watcher(move |event: notify::Result<Event>| match event {
        Ok(event) if concerns(&event, &filter_target) => {
            let _ = tx.send(());
        }
        Ok(_) => {}
        Err(e) => warn!("Watch error: {}", e),
    })
    .context("Failed to create file watcher")?;
    watcher
        .watch(&watched_dir(&target), RecursiveMode::NonRecursive)
        .with_context(|| format!("Failed to watch {}", target.display()))?;

    let server = I18nServer::new(Arc::clone(&store));
    tokio::pin!(shutdown);
    info!("Waiting for changes...");
    loop {
        tokio::select! {
            () = &mut shutdown => break,
            changed = rx.recv() => {
                if changed.is_none() {
                    break;
                }
                // One export per burst of events
                while rx.try_recv().is_ok() {}
                if let Err(e) = store.reload().await {
                    error!("Failed to reload {}: {}", target.display(), e);
                    continue;
                }
                match settings() {
                    Ok(settings) => {
                        if let Err(e) = export_locales(&server, &settings).await {
                            error!("Export failed: {:#}", e);
                        }
                    }
                    Err(e) => error!("Invalid extraction settings: {:#}", e),
                }
                info!("Waiting for changes...");
            }
        }
    }
    Ok(())
}

fn concerns(event: &Event, target: &Path) -> bool {
    (event.kind.is_modify() || event.kind.is_create())
        && event
            .paths
            .iter()
            .any(|p| p.file_name() == target.file_name())
}

fn watched_dir(target: &Path) -> PathBuf {
    match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, EventKind, ModifyKind, RemoveKind};

    #[test]
    fn test_concerns() {
        let target = Path::new("/data/dictionary.db");
        let modify = Event::new(EventKind::Modify(ModifyKind::Any))
            .add_path(PathBuf::from("/data/dictionary.db"));
        let create = Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/data/dictionary.db"));
        let other = Event::new(EventKind::Modify(ModifyKind::Any))
            .add_path(PathBuf::from("/data/fr.js"));
        let removed = Event::new(EventKind::Remove(RemoveKind::File))
            .add_path(PathBuf::from("/data/dictionary.db"));

        assert!(concerns(&modify, target));
        assert!(concerns(&create, target));
        assert!(!concerns(&other, target));
        assert!(!concerns(&removed, target));
    }

    #[test]
    fn test_watched_dir() {
        assert_eq!(watched_dir(Path::new("dictionary.db")), PathBuf::from("."));
        assert_eq!(watched_dir(Path::new("i18n/dictionary.db")), PathBuf::from("i18n"));
    }
}
