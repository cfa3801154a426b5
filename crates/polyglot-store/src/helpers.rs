//! Adapters for storage engines that cannot express "first locale of a list
//! that has a text" in one query, and loaders building in-memory
//! dictionaries from flat rows.

use crate::error::StoreResult;
use crate::memory::{MemDictionary, MemEntry};
use crate::traits::{KeySet, Store};
use async_trait::async_trait;
use polyglot_common::{Infos, Locale, RawDictionary, TextKey, Translation, Zone};
use std::collections::BTreeMap;

/// A backend answering one query per locale.
#[async_trait]
pub trait LocaleLister: Send + Sync {
    /// Texts of `zone` in exactly `locale`, skipping the keys in `exclusion`.
    async fn list_locale(
        &self,
        locale: &str,
        zone: &str,
        exclusion: &KeySet,
    ) -> StoreResult<Vec<(TextKey, Translation)>>;
}

/// [`Store`] built from a [`LocaleLister`]: one query per locale, in
/// preference order, each excluding the keys already found.
#[derive(Debug, Clone, Default)]
pub struct MultiQueryStore<L>(pub L);

#[async_trait]
impl<L: LocaleLister> Store for MultiQueryStore<L> {
    async fn list(&self, locales: &[Locale], zone: &str) -> StoreResult<RawDictionary> {
        let mut result = RawDictionary::new();
        let mut found = KeySet::new();
        for locale in locales {
            for (key, text) in self.0.list_locale(locale, zone, &found).await? {
                if found.insert(key.clone()) {
                    result.insert(key, (locale.clone(), text));
                }
            }
        }
        Ok(result)
    }
}

/// A backend returning every text of a zone in the given locales at once.
#[async_trait]
pub trait ExhaustiveLister: Send + Sync {
    /// All `(locale, key, text)` rows of `zone` whose locale is in `locales`, in any order.
    async fn exhaustive_list(
        &self,
        locales: &[Locale],
        zone: &str,
    ) -> StoreResult<Vec<(Locale, TextKey, Translation)>>;
}

/// [`Store`] built from an [`ExhaustiveLister`]: a single query whose rows are
/// ordered by locale preference before keeping the first text per key.
#[derive(Debug, Clone, Default)]
pub struct SingleQueryStore<L>(pub L);

#[async_trait]
impl<L: ExhaustiveLister> Store for SingleQueryStore<L> {
    async fn list(&self, locales: &[Locale], zone: &str) -> StoreResult<RawDictionary> {
        let mut rows = self.0.exhaustive_list(locales, zone).await?;
        rows.retain(|(locale, _, _)| locales.contains(locale));
        rows.sort_by_key(|(locale, _, _)| locales.iter().position(|l| l == locale));
        let mut result = RawDictionary::new();
        for (locale, key, text) in rows {
            result.entry(key).or_insert((locale, text));
        }
        Ok(result)
    }
}

/// A key row, for backends storing keys apart from their texts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyRow {
    /// The key.
    pub key: TextKey,
    /// Its zone; the root zone when absent.
    pub zone: Option<Zone>,
    /// Per-key metadata.
    pub key_infos: Option<Infos>,
}

/// A text row, possibly carrying its key's zone and metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextRow {
    /// The key.
    pub key: TextKey,
    /// The key's zone, used when the key has no [`KeyRow`].
    pub zone: Option<Zone>,
    /// The key's metadata, used when the key has no [`KeyRow`].
    pub key_infos: Option<Infos>,
    /// Locale of the text.
    pub locale: Locale,
    /// The text itself.
    pub text: Translation,
    /// Per-text metadata.
    pub text_infos: Option<Infos>,
}

/// Builds a dictionary from raw rows; `keys` lists keys stored separately.
pub fn load_from_list(
    rows: impl IntoIterator<Item = TextRow>,
    keys: impl IntoIterator<Item = KeyRow>,
) -> MemDictionary {
    let mut dictionary = MemDictionary::default();
    for KeyRow {
        key,
        zone,
        key_infos,
    } in keys
    {
        dictionary.entries.insert(
            key,
            MemEntry {
                zone: zone.unwrap_or_default(),
                key_infos,
                ..MemEntry::default()
            },
        );
    }
    for row in rows {
        let entry = dictionary
            .entries
            .entry(row.key)
            .or_insert_with(|| MemEntry {
                zone: row.zone.unwrap_or_default(),
                key_infos: row.key_infos,
                ..MemEntry::default()
            });
        if let Some(infos) = row.text_infos {
            entry.text_infos.insert(row.locale.clone(), infos);
        }
        entry.texts.insert(row.locale, row.text);
    }
    dictionary
}

/// Builds a root-zone dictionary from per-locale translation tables.
pub fn load_from_translations(
    translations: &BTreeMap<Locale, BTreeMap<TextKey, Translation>>,
) -> MemDictionary {
    let rows = translations.iter().flat_map(|(locale, texts)| {
        texts.iter().map(move |(key, text)| TextRow {
            key: key.clone(),
            locale: locale.clone(),
            text: text.clone(),
            ..TextRow::default()
        })
    });
    load_from_list(rows, Vec::new())
}
