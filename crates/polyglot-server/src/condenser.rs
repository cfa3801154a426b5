//! The condenser: turns raw per-locale store listings into condensed trees.

use crate::error::ServerResult;
use async_trait::async_trait;
use futures::future::try_join_all;
use polyglot_common::{
    locale_tree, search_locales, Condense, CondensedDictionary, Locale, RawDictionary, Zone,
};
use polyglot_store::{Store, StoreResult};
use std::sync::Arc;
use tracing::debug;

/// Builds the condensed tree of one zone listing.
///
/// A text is a fallback when its locale is not in the tree of
/// `most_preferred`. A fallback is dropped when a shorter key on its path
/// already holds a genuine text, so that ancestor keeps resolving instead.
pub fn condense_raw(raw: &RawDictionary, most_preferred: &str) -> CondensedDictionary {
    let tree = locale_tree(most_preferred);
    let mut result = CondensedDictionary::default();
    for (key, (locale, text)) in raw {
        let fallback = !tree.contains(locale);
        if fallback && has_genuine_ancestor(&result, key) {
            debug!("Skipping fallback '{}' ({}) under a genuine ancestor", key, locale);
            continue;
        }
        result.insert(key, text.clone(), fallback);
    }
    result
}

fn has_genuine_ancestor(dictionary: &CondensedDictionary, key: &str) -> bool {
    let segments: Vec<&str> = key.split('.').collect();
    let mut node = dictionary;
    for segment in &segments[..segments.len() - 1] {
        match node.children.get(*segment) {
            Some(child) if child.text.is_some() && !child.fallback => return true,
            Some(child) => node = child,
            None => return false,
        }
    }
    false
}

/// Serves condensed dictionaries out of a store.
#[derive(Debug)]
pub struct I18nServer<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for I18nServer<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: Store + ?Sized> I18nServer<S> {
    /// Creates a server reading from `store`.
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub const fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Lists `zone` for a locale preference list, each key paired with the
    /// first locale of the expanded search list that has a text.
    pub async fn list(&self, locales: &[Locale], zone: &str) -> StoreResult<RawDictionary> {
        self.store.list(&search_locales(locales), zone).await
    }

    /// Condenses each of `zones` for `locales`, in the order of `zones`.
    /// No zone at all means the root zone.
    pub async fn condense_zones(
        &self,
        locales: &[Locale],
        zones: &[Zone],
    ) -> ServerResult<Vec<CondensedDictionary>> {
        let root = [Zone::new()];
        let zones = if zones.is_empty() { &root[..] } else { zones };
        let most_preferred = locales.first().map_or("", String::as_str);
        let raws = try_join_all(zones.iter().map(|zone| self.list(locales, zone))).await?;
        debug!(
            "Condensed {} zone(s) for locales {:?}",
            raws.len(),
            locales
        );
        Ok(raws
            .iter()
            .map(|raw| condense_raw(raw, most_preferred))
            .collect())
    }
}

#[async_trait]
impl<S: Store + ?Sized> Condense for I18nServer<S> {
    async fn condense(
        &self,
        locales: &[Locale],
        zones: &[Zone],
    ) -> polyglot_common::Result<Vec<CondensedDictionary>> {
        Ok(self.condense_zones(locales, zones).await?)
    }
}
