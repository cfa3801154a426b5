//! In-memory store, the reference implementation of every store trait.

use crate::error::{StoreError, StoreResult};
use crate::traits::{EditableStore, InteractiveStore, ReKeyed, Store, TranslatableStore};
use async_trait::async_trait;
use parking_lot::RwLock;
use polyglot_common::{
    is_in_locale_tree, validate_key, validate_locale, Infos, Locale, RawDictionary, TextKey,
    Translation, WorkDictionary, WorkEntry, WorkText, Zone,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Everything stored for one key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemEntry {
    /// Zone the key belongs to.
    pub zone: Zone,
    /// Texts by locale.
    pub texts: BTreeMap<Locale, Translation>,
    /// Per-key metadata.
    pub key_infos: Option<Infos>,
    /// Per-text metadata, possibly for locales without a text.
    pub text_infos: BTreeMap<Locale, Infos>,
}

impl MemEntry {
    /// Creates an entry in `zone` with the given texts.
    pub fn new<L, T>(zone: impl Into<Zone>, texts: impl IntoIterator<Item = (L, T)>) -> Self
    where
        L: Into<Locale>,
        T: Into<Translation>,
    {
        Self {
            zone: zone.into(),
            texts: texts
                .into_iter()
                .map(|(locale, text)| (locale.into(), text.into()))
                .collect(),
            ..Self::default()
        }
    }
}

/// A whole dictionary with its file-level metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemDictionary {
    /// Dictionary-level metadata.
    pub infos: Option<Infos>,
    /// Entries by key.
    pub entries: BTreeMap<TextKey, MemEntry>,
}

impl MemDictionary {
    /// Builds a dictionary from `(key, entry)` pairs.
    pub fn from_entries<K: Into<TextKey>>(entries: impl IntoIterator<Item = (K, MemEntry)>) -> Self {
        Self {
            infos: None,
            entries: entries
                .into_iter()
                .map(|(key, entry)| (key.into(), entry))
                .collect(),
        }
    }
}

/// Merges `update` into `target`, removing fields whose new value is `null`.
/// Returns whether anything changed.
pub(crate) fn merge_infos(target: &mut Option<Infos>, update: &Infos) -> bool {
    let mut merged = target.clone().unwrap_or_default();
    for (field, value) in update {
        if value.is_null() {
            merged.remove(field);
        } else {
            merged.insert(field.clone(), value.clone());
        }
    }
    let merged = (!merged.is_empty()).then_some(merged);
    let changed = *target != merged;
    *target = merged;
    changed
}

/// Thread-safe in-memory store. Clones share the same dictionary.
#[derive(Debug, Clone, Default)]
pub struct MemStore {
    dictionary: Arc<RwLock<MemDictionary>>,
}

impl MemStore {
    /// Creates a store over an existing dictionary.
    pub fn new(dictionary: MemDictionary) -> Self {
        Self {
            dictionary: Arc::new(RwLock::new(dictionary)),
        }
    }

    /// Returns a copy of the current dictionary.
    pub fn snapshot(&self) -> MemDictionary {
        self.dictionary.read().clone()
    }

    /// Replaces the whole dictionary.
    pub fn replace(&self, dictionary: MemDictionary) {
        *self.dictionary.write() = dictionary;
    }

    /// Runs `f` with read access to the dictionary.
    pub fn read<R>(&self, f: impl FnOnce(&MemDictionary) -> R) -> R {
        f(&self.dictionary.read())
    }
}

#[async_trait]
impl Store for MemStore {
    async fn list(&self, locales: &[Locale], zone: &str) -> StoreResult<RawDictionary> {
        let dictionary = self.dictionary.read();
        Ok(dictionary
            .entries
            .iter()
            .filter(|(_, entry)| entry.zone == zone)
            .filter_map(|(key, entry)| {
                locales.iter().find_map(|locale| {
                    entry
                        .texts
                        .get(locale)
                        .map(|text| (key.clone(), (locale.clone(), text.clone())))
                })
            })
            .collect())
    }
}

#[async_trait]
impl TranslatableStore for MemStore {
    async fn work_list(&self, locales: &[Locale]) -> StoreResult<WorkDictionary> {
        let demanded = |locale: &str| {
            locales
                .iter()
                .any(|wanted| is_in_locale_tree(wanted, locale))
        };
        let dictionary = self.dictionary.read();
        let mut result = WorkDictionary::new();
        for (key, entry) in &dictionary.entries {
            let mut texts: BTreeMap<Locale, WorkText> = BTreeMap::new();
            for (locale, text) in entry.texts.iter().filter(|(l, _)| demanded(l.as_str())) {
                texts.entry(locale.clone()).or_default().text = Some(text.clone());
            }
            for (locale, infos) in entry.text_infos.iter().filter(|(l, _)| demanded(l.as_str())) {
                texts.entry(locale.clone()).or_default().infos = Some(infos.clone());
            }
            result.insert(
                key.clone(),
                WorkEntry {
                    texts,
                    zone: entry.zone.clone(),
                    infos: entry.key_infos.clone(),
                },
            );
        }
        Ok(result)
    }

    async fn modify(
        &self,
        key: &str,
        locale: &str,
        text: &str,
        text_infos: Option<&Infos>,
    ) -> StoreResult<Option<Zone>> {
        validate_locale(locale)?;
        let mut dictionary = self.dictionary.write();
        let entry = dictionary
            .entries
            .get_mut(key)
            .ok_or_else(|| StoreError::KeyNotFound(key.to_string()))?;
        let previous = entry.texts.insert(locale.to_string(), text.to_string());
        let mut changed = previous.as_deref() != Some(text);
        if let Some(update) = text_infos {
            let mut infos = entry.text_infos.remove(locale);
            changed |= merge_infos(&mut infos, update);
            if let Some(infos) = infos {
                entry.text_infos.insert(locale.to_string(), infos);
            }
        }
        debug!("Modified '{}' in locale '{}' (changed: {})", key, locale, changed);
        Ok(changed.then(|| entry.zone.clone()))
    }
}

#[async_trait]
impl EditableStore for MemStore {
    async fn key(&self, key: &str, zone: &str, key_infos: Option<&Infos>) -> StoreResult<bool> {
        validate_key(key)?;
        let mut dictionary = self.dictionary.write();
        let previous_zone = dictionary.entries.get(key).map(|entry| entry.zone.clone());
        let entry = dictionary.entries.entry(key.to_string()).or_default();
        entry.zone = zone.to_string();
        if let Some(update) = key_infos {
            merge_infos(&mut entry.key_infos, update);
        }
        Ok(previous_zone.as_deref() != Some(zone))
    }

    async fn re_key(&self, key: &str, new_key: Option<&str>) -> StoreResult<ReKeyed> {
        if let Some(new_key) = new_key {
            validate_key(new_key)?;
        }
        let mut dictionary = self.dictionary.write();
        if !dictionary.entries.contains_key(key) {
            return Err(StoreError::KeyNotFound(key.to_string()));
        }
        if let Some(new_key) = new_key {
            if dictionary.entries.contains_key(new_key) {
                return Err(StoreError::KeyExists(new_key.to_string()));
            }
        }
        let entry = dictionary
            .entries
            .remove(key)
            .ok_or_else(|| StoreError::KeyNotFound(key.to_string()))?;
        let rekeyed = ReKeyed {
            zone: entry.zone.clone(),
            texts: entry.texts.clone(),
        };
        if let Some(new_key) = new_key {
            dictionary.entries.insert(new_key.to_string(), entry);
        }
        Ok(rekeyed)
    }
}

#[async_trait]
impl InteractiveStore for MemStore {
    async fn get(&self, key: &str) -> StoreResult<BTreeMap<Locale, Translation>> {
        self.dictionary
            .read()
            .entries
            .get(key)
            .map(|entry| entry.texts.clone())
            .ok_or_else(|| StoreError::KeyNotFound(key.to_string()))
    }

    async fn get_zone(&self, key: &str, locales: Option<&[Locale]>) -> StoreResult<Option<Zone>> {
        let dictionary = self.dictionary.read();
        let entry = dictionary
            .entries
            .get(key)
            .ok_or_else(|| StoreError::KeyNotFound(key.to_string()))?;
        let specified = locales.map_or(true, |locales| {
            locales.iter().any(|locale| entry.texts.contains_key(locale))
        });
        Ok(specified.then(|| entry.zone.clone()))
    }
}
