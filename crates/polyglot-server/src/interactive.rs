//! Interactive server: edits go through it, and the clients that can see
//! an edit get it pushed on the next propagation.

use crate::condenser::I18nServer;
use crate::error::{ServerError, ServerResult};
use async_trait::async_trait;
use futures::future::join_all;
use parking_lot::{Mutex, RwLock};
use polyglot_common::{
    is_in_locale_tree, locale_tree, Condense, CondensedDictionary, Infos, Locale, ModifiedEntries,
    TextKey, Translation, WorkDictionary, Zone,
};
use polyglot_store::{InteractiveStore, ReKeyed, StoreError, StoreResult};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, error, info};
use uuid::Uuid;

/// One text change waiting for propagation. `text` is `None` for removals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modification {
    /// Modified key.
    pub key: TextKey,
    /// Locale of the modified text.
    pub locale: Locale,
    /// Zone of the key when the change happened.
    pub zone: Zone,
    /// New text.
    pub text: Option<Translation>,
}

impl Modification {
    fn new(key: &str, locale: &str, zone: &str, text: Option<Translation>) -> Self {
        Self {
            key: key.to_string(),
            locale: locale.to_string(),
            zone: zone.to_string(),
            text,
        }
    }
}

/// What a subscriber receives for a key: the new text and its zone, or
/// `None` for a removal.
type Entry = Option<(Translation, Zone)>;

/// Receives the modifications a subscriber can observe.
#[async_trait]
pub trait ModificationListener: Send + Sync {
    /// Called once per propagation with every change visible to the subscriber.
    async fn modified(&self, entries: ModifiedEntries) -> polyglot_common::Result<()>;
}

#[derive(Clone)]
struct Subscription {
    locale: Locale,
    zones: BTreeSet<Zone>,
    listener: Arc<dyn ModificationListener>,
}

/// The subscriptions of every interactive server sharing a store.
#[derive(Default)]
pub struct SubscriptionRegistry {
    subscriptions: RwLock<HashMap<Uuid, Subscription>>,
}

impl std::fmt::Debug for SubscriptionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionRegistry")
            .field("subscriptions", &self.len())
            .finish()
    }
}

impl SubscriptionRegistry {
    /// Creates an empty registry, ready to be shared.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Number of registered subscribers.
    pub fn len(&self) -> usize {
        self.subscriptions.read().len()
    }

    /// True when nobody is registered.
    pub fn is_empty(&self) -> bool {
        self.subscriptions.read().is_empty()
    }

    fn register(&self, listener: Arc<dyn ModificationListener>) -> Uuid {
        let id = Uuid::new_v4();
        self.subscriptions.write().insert(
            id,
            Subscription {
                locale: Locale::new(),
                zones: BTreeSet::new(),
                listener,
            },
        );
        id
    }

    fn unregister(&self, id: Uuid) -> bool {
        self.subscriptions.write().remove(&id).is_some()
    }

    fn subscribe(&self, id: Uuid, locale: &str, zones: &[Zone]) {
        if let Some(subscription) = self.subscriptions.write().get_mut(&id) {
            subscription.locale = locale.to_string();
            subscription.zones.extend(zones.iter().cloned());
        }
    }

    fn snapshot(&self) -> Vec<(Uuid, Subscription)> {
        self.subscriptions
            .read()
            .iter()
            .map(|(id, subscription)| (*id, subscription.clone()))
            .collect()
    }
}

/// Outcome of a propagation.
#[derive(Debug, Default)]
pub struct PropagationReport {
    /// Subscribers that received their modifications.
    pub notified: Vec<Uuid>,
    /// One [`ServerError::Visibility`] per subscriber whose visibility
    /// check failed, one [`ServerError::Subscriber`] per listener that failed.
    pub failures: Vec<ServerError>,
}

/// A condenser wrapping an interactive store, registered in a
/// [`SubscriptionRegistry`] so that edits made through any server sharing
/// the registry reach the clients it serves.
pub struct InteractiveServer<S: ?Sized> {
    server: I18nServer<S>,
    registry: Arc<SubscriptionRegistry>,
    id: Uuid,
    modifications: Mutex<Vec<Modification>>,
}

impl<S: ?Sized> std::fmt::Debug for InteractiveServer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractiveServer")
            .field("id", &self.id)
            .field("pending", &self.modifications.lock().len())
            .finish_non_exhaustive()
    }
}

impl<S: InteractiveStore + ?Sized> InteractiveServer<S> {
    /// Creates a server over `store` whose clients are notified through `listener`.
    pub fn new(
        store: Arc<S>,
        registry: Arc<SubscriptionRegistry>,
        listener: Arc<dyn ModificationListener>,
    ) -> Self {
        let id = registry.register(listener);
        debug!("Registered interactive server {}", id);
        Self {
            server: I18nServer::new(store),
            registry,
            id,
            modifications: Mutex::new(Vec::new()),
        }
    }

    /// Registration id of this server.
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Number of modifications waiting for [`Self::propagate`].
    pub fn pending_modifications(&self) -> usize {
        self.modifications.lock().len()
    }

    fn store(&self) -> &S {
        self.server.store()
    }

    fn push(&self, modification: Modification) {
        self.modifications.lock().push(modification);
    }

    /// Condenses like [`I18nServer::condense_zones`] and records the primary
    /// locale and the zones for this server's subscription.
    pub async fn condense_zones(
        &self,
        locales: &[Locale],
        zones: &[Zone],
    ) -> ServerResult<Vec<CondensedDictionary>> {
        let root = [Zone::new()];
        let entered = if zones.is_empty() { &root[..] } else { zones };
        self.registry
            .subscribe(self.id, locales.first().map_or("", String::as_str), entered);
        self.server.condense_zones(locales, zones).await
    }

    /// Everything known about every key for the given locales.
    pub async fn work_list(&self, locales: &[Locale]) -> ServerResult<WorkDictionary> {
        Ok(self.store().work_list(locales).await?)
    }

    /// Sets a text. Returns the key's zone, or `None` when nothing changed.
    pub async fn modify(
        &self,
        key: &str,
        locale: &str,
        text: &str,
        text_infos: Option<&Infos>,
    ) -> ServerResult<Option<Zone>> {
        let zone = self.store().modify(key, locale, text, text_infos).await?;
        if let Some(zone) = &zone {
            self.push(Modification::new(key, locale, zone, Some(text.to_string())));
        }
        Ok(zone)
    }

    /// Creates `key` in `zone` (or moves it there) and sets `translations`.
    ///
    /// On a zone change, the texts disappear from the old zone and every
    /// text of the key shows up in the new one.
    pub async fn key(
        &self,
        key: &str,
        zone: &str,
        translations: &BTreeMap<Locale, Translation>,
        key_infos: Option<&Infos>,
        text_infos: Option<&Infos>,
    ) -> ServerResult<()> {
        let old_zone = match self.store().get_zone(key, None).await {
            Ok(zone) => zone,
            Err(StoreError::KeyNotFound(_)) => None,
            Err(e) => return Err(e.into()),
        };
        let moved = self.store().key(key, zone, key_infos).await?;
        let previous = if moved {
            self.store().get(key).await?
        } else {
            BTreeMap::new()
        };
        for (locale, text) in translations {
            let changed = self.store().modify(key, locale, text, text_infos).await?;
            if changed.is_some() && !moved {
                self.push(Modification::new(key, locale, zone, Some(text.clone())));
            }
        }
        if moved {
            if let Some(old_zone) = old_zone {
                for locale in previous.keys() {
                    self.push(Modification::new(key, locale, &old_zone, None));
                }
            }
            for (locale, text) in self.store().get(key).await? {
                self.push(Modification::new(key, &locale, zone, Some(text)));
            }
        }
        Ok(())
    }

    /// Renames `key`, or removes it when `new_key` is `None`.
    pub async fn re_key(&self, key: &str, new_key: Option<&str>) -> ServerResult<()> {
        let ReKeyed { zone, texts } = self.store().re_key(key, new_key).await?;
        for (locale, text) in texts {
            self.push(Modification::new(key, &locale, &zone, None));
            if let Some(new_key) = new_key {
                self.push(Modification::new(new_key, &locale, &zone, Some(text)));
            }
        }
        Ok(())
    }

    /// Records that `key`, edited directly in the store, now lives in `zone`.
    pub async fn modified_key(&self, key: &str, zone: &str) -> ServerResult<()> {
        for (locale, text) in self.store().get(key).await? {
            self.push(Modification::new(key, &locale, zone, Some(text)));
        }
        Ok(())
    }

    /// Records a text edited directly in the store.
    pub async fn modified_text(
        &self,
        key: &str,
        locale: &str,
        text: Option<&str>,
    ) -> ServerResult<()> {
        let zone = self.store().get_zone(key, None).await?.unwrap_or_default();
        self.push(Modification::new(key, locale, &zone, text.map(str::to_string)));
        Ok(())
    }

    /// Whether `subscription` sees `modification`: the zone is entered, the
    /// edited locale is in the tree of the subscriber's locale, and no more
    /// specific locale of that tree already has a text for the key.
    async fn observes(
        &self,
        subscription: &Subscription,
        modification: &Modification,
    ) -> StoreResult<bool> {
        if !subscription.zones.contains(&modification.zone)
            || !is_in_locale_tree(&modification.locale, &subscription.locale)
        {
            return Ok(false);
        }
        let more_specific: Vec<Locale> = locale_tree(&subscription.locale)
            .into_iter()
            .take_while(|locale| *locale != modification.locale)
            .collect();
        if more_specific.is_empty() {
            return Ok(true);
        }
        match self
            .store()
            .get_zone(&modification.key, Some(more_specific.as_slice()))
            .await
        {
            Ok(shadowing) => Ok(shadowing.is_none()),
            Err(StoreError::KeyNotFound(_)) => Ok(true),
            Err(e) => Err(e),
        }
    }

    /// What replaces a removed text for `subscription`: the text of the next
    /// less specific locale of its tree, if the key still has one and has
    /// not left the zone. Locales of the client's preference list outside
    /// that tree are not looked at.
    async fn fallback(
        &self,
        subscription: &Subscription,
        modification: &Modification,
    ) -> StoreResult<Entry> {
        let zone = match self.store().get_zone(&modification.key, None).await {
            Ok(Some(zone)) => zone,
            Ok(None) | Err(StoreError::KeyNotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };
        if zone != modification.zone {
            return Ok(None);
        }
        let texts = match self.store().get(&modification.key).await {
            Ok(texts) => texts,
            Err(StoreError::KeyNotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };
        Ok(locale_tree(&subscription.locale)
            .into_iter()
            .skip_while(|locale| *locale != modification.locale)
            .skip(1)
            .find_map(|locale| texts.get(&locale).cloned())
            .map(|text| (text, zone)))
    }

    /// The entry `subscription` gets for `modification`, `None` when it does
    /// not see it.
    async fn entry_for(
        &self,
        subscription: &Subscription,
        modification: &Modification,
    ) -> StoreResult<Option<Entry>> {
        if !self.observes(subscription, modification).await? {
            return Ok(None);
        }
        Ok(Some(match &modification.text {
            Some(text) => Some((text.clone(), modification.zone.clone())),
            None => self.fallback(subscription, modification).await?,
        }))
    }

    /// Every entry of `modifications` visible to `subscription`, later
    /// modifications of a key replacing earlier ones. Fails with the key
    /// being checked when the store cannot tell.
    async fn visible_entries(
        &self,
        subscription: &Subscription,
        modifications: &[Modification],
    ) -> Result<ModifiedEntries, (TextKey, StoreError)> {
        let mut entries = ModifiedEntries::new();
        for modification in modifications {
            match self.entry_for(subscription, modification).await {
                Ok(Some(entry)) => {
                    entries.insert(modification.key.clone(), entry);
                }
                Ok(None) => {}
                Err(e) => return Err((modification.key.clone(), e)),
            }
        }
        Ok(entries)
    }

    /// Pushes every pending modification to the subscribers that can see it,
    /// each subscriber being called once. A subscriber whose visibility
    /// check or listener fails is reported and does not keep the others
    /// from being notified.
    pub async fn propagate(&self) -> ServerResult<PropagationReport> {
        let modifications = std::mem::take(&mut *self.modifications.lock());
        if modifications.is_empty() {
            return Ok(PropagationReport::default());
        }
        let mut report = PropagationReport::default();
        let mut batches: Vec<(Uuid, Arc<dyn ModificationListener>, ModifiedEntries)> = Vec::new();
        for (id, subscription) in self.registry.snapshot() {
            match self.visible_entries(&subscription, &modifications).await {
                Ok(entries) if entries.is_empty() => {}
                Ok(entries) => batches.push((id, subscription.listener, entries)),
                Err((key, source)) => {
                    error!("Cannot tell whether subscriber {} sees {}: {}", id, key, source);
                    report.failures.push(ServerError::Visibility { id, key, source });
                }
            }
        }
        info!(
            "Propagating {} modification(s) to {} subscriber(s)",
            modifications.len(),
            batches.len()
        );

        let outcomes = join_all(batches.into_iter().map(|(id, listener, entries)| async move {
            (id, listener.modified(entries).await)
        }))
        .await;

        for (id, outcome) in outcomes {
            match outcome {
                Ok(()) => report.notified.push(id),
                Err(e) => {
                    error!("Subscriber {} failed to receive modifications: {}", id, e);
                    report.failures.push(ServerError::Subscriber {
                        id,
                        message: e.to_string(),
                    });
                }
            }
        }
        Ok(report)
    }

    /// Same as [`Self::propagate`].
    pub async fn save(&self) -> ServerResult<PropagationReport> {
        self.propagate().await
    }
}

impl<S: ?Sized> InteractiveServer<S> {
    /// Leaves the registry: this server's clients stop receiving modifications.
    pub fn destroy(&self) {
        if self.registry.unregister(self.id) {
            debug!("Unregistered interactive server {}", self.id);
        }
    }
}

impl<S: ?Sized> Drop for InteractiveServer<S> {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[async_trait]
impl<S: InteractiveStore + ?Sized> Condense for InteractiveServer<S> {
    async fn condense(
        &self,
        locales: &[Locale],
        zones: &[Zone],
    ) -> polyglot_common::Result<Vec<CondensedDictionary>> {
        Ok(self.condense_zones(locales, zones).await?)
    }
}
