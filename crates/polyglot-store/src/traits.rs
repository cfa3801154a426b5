//! Store trait definitions, from read-only listing up to interactive editing.

use crate::error::StoreResult;
use async_trait::async_trait;
use polyglot_common::{Infos, Locale, RawDictionary, TextKey, Translation, WorkDictionary, Zone};
use std::collections::BTreeMap;

/// What a key held when it was renamed or removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReKeyed {
    /// The zone the key belonged to.
    pub zone: Zone,
    /// Every text the key had, by locale.
    pub texts: BTreeMap<Locale, Translation>,
}

/// A source of translations for the condenser.
#[async_trait]
pub trait Store: Send + Sync {
    /// Lists every key of `zone` that has a text in one of `locales`,
    /// pairing it with the first locale of the list that has one.
    async fn list(&self, locales: &[Locale], zone: &str) -> StoreResult<RawDictionary>;
}

/// A store translators can work on.
#[async_trait]
pub trait TranslatableStore: Store {
    /// Everything known about every key, restricted to `locales` and their sub-locales.
    async fn work_list(&self, locales: &[Locale]) -> StoreResult<WorkDictionary>;

    /// Sets the text of `key` in `locale`. Metadata fields set to `null` are
    /// removed, others are merged.
    ///
    /// Returns the key's zone, or `None` when nothing changed.
    async fn modify(
        &self,
        key: &str,
        locale: &str,
        text: &str,
        text_infos: Option<&Infos>,
    ) -> StoreResult<Option<Zone>>;
}

/// A store whose keys can be created, moved and renamed.
#[async_trait]
pub trait EditableStore: TranslatableStore {
    /// Creates `key` in `zone` or moves it there. Returns whether the zone changed.
    async fn key(&self, key: &str, zone: &str, key_infos: Option<&Infos>) -> StoreResult<bool>;

    /// Renames `key` to `new_key`, or removes it with all its texts when
    /// `new_key` is `None`.
    async fn re_key(&self, key: &str, new_key: Option<&str>) -> StoreResult<ReKeyed>;
}

/// A store that can answer the point queries live-update propagation needs.
#[async_trait]
pub trait InteractiveStore: EditableStore {
    /// All texts of a key, by locale.
    async fn get(&self, key: &str) -> StoreResult<BTreeMap<Locale, Translation>>;

    /// The zone of `key`. When `locales` is given, `None` is returned unless
    /// the key has a text in at least one of them.
    async fn get_zone(&self, key: &str, locales: Option<&[Locale]>) -> StoreResult<Option<Zone>>;
}

/// Lists of text keys, as handed to [`crate::LocaleLister`] implementations.
pub type KeySet = std::collections::BTreeSet<TextKey>;
