//! File-backed store: an in-memory store persisted as UTF-16LE text with
//! debounced saves.

use crate::error::{StoreError, StoreResult};
use crate::memory::{MemDictionary, MemStore};
use crate::serialization::{deserialize, serialize};
use crate::traits::{EditableStore, InteractiveStore, ReKeyed, Store, TranslatableStore};
use async_trait::async_trait;
use parking_lot::Mutex;
use polyglot_common::{Infos, Locale, RawDictionary, Translation, WorkDictionary, Zone};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Default delay between the first unsaved mutation and the write.
pub const DEFAULT_SAVE_DELAY: Duration = Duration::from_secs(10);

/// Encodes text as UTF-16LE without byte-order mark.
pub fn encode_utf16le(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(u16::to_le_bytes).collect()
}

/// Decodes UTF-16LE bytes, dropping a leading byte-order mark.
pub fn decode_utf16le(bytes: &[u8]) -> StoreResult<String> {
    if bytes.len() % 2 != 0 {
        return Err(StoreError::Encoding(format!(
            "odd byte count ({}) for UTF-16LE content",
            bytes.len()
        )));
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    let text = String::from_utf16(&units).map_err(|e| StoreError::Encoding(e.to_string()))?;
    if text.starts_with('\u{feff}') {
        Ok(text['\u{feff}'.len_utf8()..].to_string())
    } else {
        Ok(text)
    }
}

async fn write_dictionary(path: &Path, dictionary: &MemDictionary) -> StoreResult<()> {
    let staging = path.with_extension("saving");
    tokio::fs::write(&staging, encode_utf16le(&serialize(dictionary))).await?;
    tokio::fs::rename(&staging, path).await?;
    Ok(())
}

async fn read_dictionary(path: &Path) -> StoreResult<MemDictionary> {
    match tokio::fs::read(path).await {
        Ok(bytes) if bytes.is_empty() => Ok(MemDictionary::default()),
        Ok(bytes) => deserialize(&decode_utf16le(&bytes)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(MemDictionary::default()),
        Err(e) => Err(e.into()),
    }
}

/// A [`MemStore`] loaded from and saved to a file.
///
/// Every mutation schedules a save `save_delay` later unless one is already
/// pending, so bursts of edits cost a single write.
#[derive(Debug)]
pub struct FileStore {
    memory: MemStore,
    path: PathBuf,
    save_delay: Duration,
    pending_save: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl FileStore {
    /// Opens the store at `path`. A missing or empty file gives an empty dictionary.
    pub async fn open(path: impl Into<PathBuf>, save_delay: Duration) -> StoreResult<Self> {
        let path = path.into();
        let dictionary = read_dictionary(&path).await?;
        info!(
            "Loaded {} keys from {}",
            dictionary.entries.len(),
            path.display()
        );
        Ok(Self {
            memory: MemStore::new(dictionary),
            path,
            save_delay,
            pending_save: Arc::new(Mutex::new(None)),
        })
    }

    /// The file this store persists to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The in-memory store holding the current content.
    pub const fn memory(&self) -> &MemStore {
        &self.memory
    }

    /// Re-reads the file, discarding unsaved changes.
    pub async fn reload(&self) -> StoreResult<()> {
        self.cancel_pending_save();
        let dictionary = read_dictionary(&self.path).await?;
        self.memory.replace(dictionary);
        debug!("Reloaded {}", self.path.display());
        Ok(())
    }

    /// Writes the current content immediately, cancelling any pending save.
    pub async fn save_now(&self) -> StoreResult<()> {
        self.cancel_pending_save();
        write_dictionary(&self.path, &self.memory.snapshot()).await
    }

    /// True while a debounced save is scheduled.
    pub fn has_pending_save(&self) -> bool {
        self.pending_save
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    fn cancel_pending_save(&self) {
        if let Some(handle) = self.pending_save.lock().take() {
            handle.abort();
        }
    }

    fn schedule_save(&self) {
        let mut pending = self.pending_save.lock();
        if pending.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }
        let memory = self.memory.clone();
        let path = self.path.clone();
        let delay = self.save_delay;
        let slot = Arc::clone(&self.pending_save);
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Later mutations must schedule their own save.
            slot.lock().take();
            match write_dictionary(&path, &memory.snapshot()).await {
                Ok(()) => debug!("Saved dictionary to {}", path.display()),
                Err(e) => error!("Failed to save dictionary to {}: {}", path.display(), e),
            }
        }));
    }
}

#[async_trait]
impl Store for FileStore {
    async fn list(&self, locales: &[Locale], zone: &str) -> StoreResult<RawDictionary> {
        self.memory.list(locales, zone).await
    }
}

#[async_trait]
impl TranslatableStore for FileStore {
    async fn work_list(&self, locales: &[Locale]) -> StoreResult<WorkDictionary> {
        self.memory.work_list(locales).await
    }

    async fn modify(
        &self,
        key: &str,
        locale: &str,
        text: &str,
        text_infos: Option<&Infos>,
    ) -> StoreResult<Option<Zone>> {
        let zone = self.memory.modify(key, locale, text, text_infos).await?;
        if zone.is_some() {
            self.schedule_save();
        }
        Ok(zone)
    }
}

#[async_trait]
impl EditableStore for FileStore {
    async fn key(&self, key: &str, zone: &str, key_infos: Option<&Infos>) -> StoreResult<bool> {
        let moved = self.memory.key(key, zone, key_infos).await?;
        self.schedule_save();
        Ok(moved)
    }

    async fn re_key(&self, key: &str, new_key: Option<&str>) -> StoreResult<ReKeyed> {
        let rekeyed = self.memory.re_key(key, new_key).await?;
        self.schedule_save();
        Ok(rekeyed)
    }
}

#[async_trait]
impl InteractiveStore for FileStore {
    async fn get(&self, key: &str) -> StoreResult<BTreeMap<Locale, Translation>> {
        self.memory.get(key).await
    }

    async fn get_zone(&self, key: &str, locales: Option<&[Locale]>) -> StoreResult<Option<Zone>> {
        self.memory.get_zone(key, locales).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf16le_round_trip_with_bom() {
        let mut bytes = vec![0xFF, 0xFE];
        bytes.extend(encode_utf16le("fld.name:\n\thu:Név\n"));
        assert_eq!(decode_utf16le(&bytes).unwrap(), "fld.name:\n\thu:Név\n");
        assert!(matches!(
            decode_utf16le(&[0x41]),
            Err(StoreError::Encoding(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("absent.db"), DEFAULT_SAVE_DELAY)
            .await
            .unwrap();
        assert!(store.memory().snapshot().entries.is_empty());
        assert!(!store.has_pending_save());
    }
}
