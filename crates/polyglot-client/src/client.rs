//! The client: loads zones through a [`Condense`] implementation, keeps the
//! merged dictionary and hands out [`Translator`]s.
//!
//! Zone loading is batched. Every zone requested before the pending batch
//! starts joins it, so a burst of [`I18nClient::enter`] calls costs a single
//! condense round-trip. Batches run one after the other on the Tokio runtime
//! the client is used from.

use crate::args::TranslationArg;
use crate::dictionary::ClientDictionary;
use crate::error::{ClientError, ClientResult};
use crate::formats::FormatRegistry;
use crate::internals::{Internals, INTERNALS_KEY};
use crate::interpolation::Resolver;
use crate::plural::PluralRulesSet;
use crate::processors::{ProcessorContext, ProcessorRegistry};
use crate::reports::{Reporter, TracingReporter};
use crate::translator::Translator;
use chrono_tz::Tz;
use futures::future::{self, BoxFuture, FutureExt, Shared};
use parking_lot::{Mutex, RwLock};
use polyglot_common::{
    dedup_locales, Condense, CondensedDictionary, Locale, ModifiedEntries, TextKey, Zone,
};
use polyglot_config::ClientConfig;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::future::IntoFuture;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

/// Completion handle of a loading batch. Cloneable; every clone resolves
/// with the same outcome.
pub type Loading = Shared<BoxFuture<'static, ClientResult<()>>>;

/// Observer called with the keys whose texts changed.
pub type ModificationCallback = Arc<dyn Fn(&[TextKey]) + Send + Sync>;

fn settled(outcome: ClientResult<()>) -> Loading {
    future::ready(outcome).boxed().shared()
}

/// Every loaded zone except some, to seed another client with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialLoad {
    /// Locales the texts were condensed for.
    pub locales: Vec<Locale>,
    /// One payload per zone.
    pub zones: BTreeMap<Zone, CondensedDictionary>,
}

struct ClientState {
    locales: Vec<Locale>,
    dictionary: ClientDictionary,
    internals: Internals,
    plurals: PluralRulesSet,
    loaded_zones: BTreeSet<Zone>,
    /// Bumped on each locale change; batches started before are discarded.
    generation: u64,
}

impl ClientState {
    fn refresh_internals(&mut self) {
        self.internals = Internals::from_dictionary(&self.dictionary);
    }
}

struct LoaderState {
    pending: BTreeSet<Zone>,
    in_flight: BTreeSet<Zone>,
    /// Set while the pending batch has not started yet.
    batch: Option<AbortHandle>,
    loaded: Loading,
}

/// What became of a downloaded batch.
enum Download {
    Merged,
    /// The locales changed meanwhile; the zones are queued again.
    Stale,
}

// Lock order: `loader` before `state`.
struct ClientInner {
    condense: Arc<dyn Condense>,
    state: RwLock<ClientState>,
    loader: Mutex<LoaderState>,
    /// Held by the running batch, so that batches run in scheduling order.
    turn: tokio::sync::Mutex<()>,
    reporter: Arc<dyn Reporter>,
    processors: ProcessorRegistry,
    formats: FormatRegistry,
    time_zone: Tz,
    currency: Option<String>,
    on_modification: Option<ModificationCallback>,
}

impl ClientInner {
    fn notify(&self, keys: &[TextKey]) {
        if keys.is_empty() {
            return;
        }
        if let Some(callback) = &self.on_modification {
            callback(keys);
        }
    }

    fn request(self: &Arc<Self>, zones: &[Zone]) -> Loading {
        let mut loader = self.loader.lock();
        let missing: Vec<Zone> = {
            let state = self.state.read();
            let root = Zone::new();
            std::iter::once(&root)
                .chain(zones)
                .filter(|zone| !state.loaded_zones.contains(*zone))
                .cloned()
                .collect()
        };
        if missing.is_empty() {
            return settled(Ok(()));
        }
        let new: Vec<Zone> = missing
            .into_iter()
            .filter(|zone| !loader.pending.contains(zone) && !loader.in_flight.contains(zone))
            .collect();
        if !new.is_empty() {
            debug!("Requesting zones {:?}", new);
            loader.pending.extend(new);
            if loader.batch.is_none() {
                self.schedule(&mut loader);
            }
        }
        loader.loaded.clone()
    }

    /// Starts a batch on the next scheduler turn, after the previous one.
    fn schedule(self: &Arc<Self>, loader: &mut LoaderState) {
        let Ok(handle) = Handle::try_current() else {
            warn!("No Tokio runtime, zones {:?} cannot be loaded", loader.pending);
            loader.pending.clear();
            loader.loaded = settled(Err(ClientError::NoRuntime));
            return;
        };
        let (tx, rx) = oneshot::channel();
        let inner = Arc::clone(self);
        let task = handle.spawn(async move {
            tokio::task::yield_now().await;
            let _ = tx.send(inner.run_batch().await);
        });
        loader.batch = Some(task.abort_handle());
        loader.loaded = rx
            .map(|received| received.unwrap_or(Err(ClientError::Cancelled)))
            .boxed()
            .shared();
    }

    /// Runs the pending batch once the previous one is over. When the
    /// locales changed while it was downloading, it completes with the batch
    /// that loads its zones again.
    async fn run_batch(&self) -> ClientResult<()> {
        let outcome = {
            let _turn = self.turn.lock().await;
            let (zones, locales, generation) = {
                let mut loader = self.loader.lock();
                loader.batch = None;
                let zones: Vec<Zone> = std::mem::take(&mut loader.pending).into_iter().collect();
                loader.in_flight.extend(zones.iter().cloned());
                let state = self.state.read();
                (zones, state.locales.clone(), state.generation)
            };
            if zones.is_empty() {
                return Ok(());
            }
            let outcome = self.download(&locales, &zones, generation).await;
            let mut loader = self.loader.lock();
            for zone in &zones {
                loader.in_flight.remove(zone);
            }
            outcome
        };
        match outcome? {
            Download::Merged => Ok(()),
            Download::Stale => {
                let replacement = self.loader.lock().loaded.clone();
                replacement.await
            }
        }
    }

    async fn download(
        &self,
        locales: &[Locale],
        zones: &[Zone],
        generation: u64,
    ) -> ClientResult<Download> {
        debug!("Loading zones {:?} for locales {:?}", zones, locales);
        let condensed = self.condense.condense(locales, zones).await.map_err(|e| {
            warn!("Failed to load zones {:?}: {}", zones, e);
            ClientError::Condense(e.to_string())
        })?;
        if condensed.len() != zones.len() {
            return Err(ClientError::ZoneCount {
                expected: zones.len(),
                received: condensed.len(),
            });
        }

        let keys = {
            let mut state = self.state.write();
            if state.generation != generation {
                debug!("Discarding zones {:?} loaded for previous locales", zones);
                return Ok(Download::Stale);
            }
            let mut keys = Vec::new();
            for (zone, dictionary) in zones.iter().zip(&condensed) {
                state.dictionary.merge(dictionary, zone);
                state.loaded_zones.insert(zone.clone());
                keys.extend(dictionary.long_key_list());
            }
            if keys.iter().any(|key| is_internal(key)) {
                state.refresh_internals();
            }
            keys
        };
        info!("Loaded zones {:?} ({} texts)", zones, keys.len());
        self.notify(&keys);
        Ok(Download::Merged)
    }
}

fn is_internal(key: &str) -> bool {
    key.split('.').next() == Some(INTERNALS_KEY)
}

/// Result of [`I18nClient::enter`]: a translator usable right away, that
/// renders `...` for texts still loading, and the completion of its zones.
///
/// Awaiting it yields the translator once its zones are merged.
pub struct Entering {
    translator: Translator,
    loaded: Loading,
}

impl Entering {
    /// The translator, before its zones are loaded.
    pub const fn translator(&self) -> &Translator {
        &self.translator
    }

    /// Completion of the zones of this entry.
    pub fn loaded(&self) -> Loading {
        self.loaded.clone()
    }

    /// Gives up waiting and keeps the translator.
    pub fn into_translator(self) -> Translator {
        self.translator
    }
}

impl IntoFuture for Entering {
    type Output = ClientResult<Translator>;
    type IntoFuture = BoxFuture<'static, ClientResult<Translator>>;

    fn into_future(self) -> Self::IntoFuture {
        let Self { translator, loaded } = self;
        async move { loaded.await.map(|()| translator) }.boxed()
    }
}

/// Builder of [`I18nClient`].
pub struct I18nClientBuilder {
    locales: Vec<Locale>,
    condense: Arc<dyn Condense>,
    on_modification: Option<ModificationCallback>,
    reporter: Arc<dyn Reporter>,
    processors: ProcessorRegistry,
    formats: FormatRegistry,
    time_zone: Tz,
    currency: Option<String>,
}

impl I18nClientBuilder {
    /// Starts from the `client` configuration section: its locales, time
    /// zone and currency.
    pub fn from_config(config: &ClientConfig, condense: Arc<dyn Condense>) -> ClientResult<Self> {
        let mut builder = I18nClient::builder(&config.locales, condense);
        if let Some(name) = &config.time_zone {
            builder.time_zone = name
                .parse::<Tz>()
                .map_err(|_| ClientError::Config(format!("unknown time zone {name:?}")))?;
        }
        builder.currency.clone_from(&config.currency);
        Ok(builder)
    }

    /// Called with the changed keys after every merge or modification.
    #[must_use]
    pub fn on_modification<F>(mut self, callback: F) -> Self
    where
        F: Fn(&[TextKey]) + Send + Sync + 'static,
    {
        self.on_modification = Some(Arc::new(callback));
        self
    }

    /// Replaces the default [`TracingReporter`].
    #[must_use]
    pub fn reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Replaces the built-in processors.
    #[must_use]
    pub fn processors(mut self, processors: ProcessorRegistry) -> Self {
        self.processors = processors;
        self
    }

    /// Replaces the built-in format presets.
    #[must_use]
    pub fn formats(mut self, formats: FormatRegistry) -> Self {
        self.formats = formats;
        self
    }

    /// Time zone of the `date` processor, UTC by default.
    #[must_use]
    pub fn time_zone(mut self, time_zone: Tz) -> Self {
        self.time_zone = time_zone;
        self
    }

    /// Currency of the `number` processor when the style is `currency`.
    #[must_use]
    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    /// Builds the client. Nothing is loaded before the first entry.
    pub fn build(self) -> I18nClient {
        let plurals = PluralRulesSet::for_locale(self.locales.first().map_or("", String::as_str));
        I18nClient {
            inner: Arc::new(ClientInner {
                condense: self.condense,
                state: RwLock::new(ClientState {
                    locales: self.locales,
                    dictionary: ClientDictionary::default(),
                    internals: Internals::default(),
                    plurals,
                    loaded_zones: BTreeSet::new(),
                    generation: 0,
                }),
                loader: Mutex::new(LoaderState {
                    pending: BTreeSet::new(),
                    in_flight: BTreeSet::new(),
                    batch: None,
                    loaded: settled(Ok(())),
                }),
                turn: tokio::sync::Mutex::new(()),
                reporter: self.reporter,
                processors: self.processors,
                formats: self.formats,
                time_zone: self.time_zone,
                currency: self.currency,
                on_modification: self.on_modification,
            }),
        }
    }
}

/// A translation client for one locale preference list.
///
/// Cheap to clone; clones share the dictionary.
#[derive(Clone)]
pub struct I18nClient {
    inner: Arc<ClientInner>,
}

impl fmt::Debug for I18nClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.read();
        f.debug_struct("I18nClient")
            .field("locales", &state.locales)
            .field("loaded_zones", &state.loaded_zones)
            .finish_non_exhaustive()
    }
}

impl I18nClient {
    /// Starts building a client.
    pub fn builder<S: AsRef<str>>(locales: &[S], condense: Arc<dyn Condense>) -> I18nClientBuilder {
        I18nClientBuilder {
            locales: dedup_locales(locales),
            condense,
            on_modification: None,
            reporter: Arc::new(TracingReporter),
            processors: ProcessorRegistry::default(),
            formats: FormatRegistry::default(),
            time_zone: Tz::UTC,
            currency: None,
        }
    }

    /// A client with the default reporter, processors and formats.
    pub fn new<S: AsRef<str>>(locales: &[S], condense: Arc<dyn Condense>) -> Self {
        Self::builder(locales, condense).build()
    }

    /// Builds a client out of the `client` configuration section and enters
    /// its start-up zones. The client is reachable from the translator.
    pub fn from_config(config: &ClientConfig, condense: Arc<dyn Condense>) -> ClientResult<Entering> {
        let client = I18nClientBuilder::from_config(config, condense)?.build();
        info!(
            "Starting client for {:?} with zones {:?}",
            config.locales, config.zones
        );
        Ok(client.enter(config.zones.iter().cloned()))
    }

    /// Current locales, most preferred first.
    pub fn locales(&self) -> Vec<Locale> {
        self.inner.state.read().locales.clone()
    }

    /// Zones merged so far.
    pub fn loaded_zones(&self) -> BTreeSet<Zone> {
        self.inner.state.read().loaded_zones.clone()
    }

    /// Requests `zones` (the root zone when empty) and returns a translator
    /// for them. The root zone is always loaded with the first entry.
    pub fn enter<I, Z>(&self, zones: I) -> Entering
    where
        I: IntoIterator<Item = Z>,
        Z: Into<Zone>,
    {
        let mut zones: Vec<Zone> = zones.into_iter().map(Into::into).collect();
        if zones.is_empty() {
            zones.push(Zone::new());
        }
        let loaded = self.inner.request(&zones);
        Entering {
            translator: Translator::new(self.clone(), zones),
            loaded,
        }
    }

    /// Completion of the last scheduled batch.
    pub fn loaded(&self) -> Loading {
        self.inner.loader.lock().loaded.clone()
    }

    /// Whether a batch is waiting to start or running.
    pub fn loading(&self) -> bool {
        let loader = self.inner.loader.lock();
        loader.batch.is_some() || !loader.pending.is_empty() || !loader.in_flight.is_empty()
    }

    /// Cancels the batch that has not started yet. Its callers get
    /// [`ClientError::Cancelled`]; running batches are not affected.
    pub fn cancel_loading(&self) {
        let mut loader = self.inner.loader.lock();
        if let Some(batch) = loader.batch.take() {
            batch.abort();
            info!("Cancelled loading of zones {:?}", loader.pending);
        }
        loader.pending.clear();
    }

    /// Switches locales. When they differ from the current ones, the
    /// dictionary is cleared and every loaded zone is loaded again for the
    /// new locales. A batch still running for the old locales is discarded
    /// and its callers wait for the reload of its zones.
    pub fn set_locales<S: AsRef<str>>(&self, locales: &[S]) -> Loading {
        let locales = dedup_locales(locales);
        let mut loader = self.inner.loader.lock();
        {
            let mut state = self.inner.state.write();
            if state.locales == locales {
                return loader.loaded.clone();
            }
            info!("Switching locales from {:?} to {:?}", state.locales, locales);
            let reload: BTreeSet<Zone> = std::mem::take(&mut state.loaded_zones)
                .into_iter()
                .chain(loader.in_flight.iter().cloned())
                .collect();
            state.plurals = PluralRulesSet::for_locale(locales.first().map_or("", String::as_str));
            state.locales = locales;
            state.dictionary = ClientDictionary::default();
            state.internals = Internals::default();
            state.generation += 1;
            loader.pending.extend(reload);
        }
        if !loader.pending.is_empty() && loader.batch.is_none() {
            self.inner.schedule(&mut loader);
        }
        loader.loaded.clone()
    }

    /// Applies the modifications pushed by a server. Modifications of zones
    /// that are not loaded are ignored.
    pub fn modified(&self, entries: ModifiedEntries) {
        let keys: Vec<TextKey> = {
            let mut state = self.inner.state.write();
            let mut keys = Vec::new();
            for (key, value) in &entries {
                if let Some((_, zone)) = value {
                    if !state.loaded_zones.contains(zone) {
                        continue;
                    }
                }
                state
                    .dictionary
                    .apply(key, value.as_ref().map(|(text, zone)| (text.as_str(), zone.as_str())));
                keys.push(key.clone());
            }
            if keys.iter().any(|key| is_internal(key)) {
                state.refresh_internals();
            }
            keys
        };
        debug!("Applied {} modification(s)", keys.len());
        self.inner.notify(&keys);
    }

    /// Sets (or removes, with `None`) the text of one key.
    pub fn apply_modification(&self, key: &str, text: Option<&str>, zone: &str) {
        {
            let mut state = self.inner.state.write();
            state.dictionary.apply(key, text.map(|text| (text, zone)));
            if is_internal(key) {
                state.refresh_internals();
            }
        }
        self.inner.notify(&[key.to_string()]);
    }

    /// Exports every loaded zone but `excluded`.
    pub fn get_partial_load(&self, excluded: &[Zone]) -> PartialLoad {
        let excluded: BTreeSet<Zone> = excluded.iter().cloned().collect();
        let state = self.inner.state.read();
        let mut zones = state.dictionary.export(&excluded);
        for zone in state.loaded_zones.difference(&excluded) {
            zones.entry(zone.clone()).or_default();
        }
        PartialLoad {
            locales: state.locales.clone(),
            zones,
        }
    }

    /// Merges the zones of a partial load that are not loaded yet.
    pub fn use_partial(&self, payload: PartialLoad) -> ClientResult<()> {
        let keys = {
            let mut state = self.inner.state.write();
            if state.locales != payload.locales {
                return Err(ClientError::LocaleMismatch {
                    expected: state.locales.clone(),
                    received: payload.locales,
                });
            }
            let mut keys = Vec::new();
            for (zone, dictionary) in &payload.zones {
                if state.loaded_zones.contains(zone) {
                    continue;
                }
                state.dictionary.merge(dictionary, zone);
                state.loaded_zones.insert(zone.clone());
                keys.extend(dictionary.long_key_list());
            }
            if keys.iter().any(|key| is_internal(key)) {
                state.refresh_internals();
            }
            keys
        };
        debug!("Seeded {} text(s) from a partial load", keys.len());
        self.inner.notify(&keys);
        Ok(())
    }

    /// Translates `key` for a translator of `zones`.
    pub fn translate(&self, zones: &[Zone], key: &str, args: &[TranslationArg]) -> String {
        self.with_resolver(zones, |resolver| resolver.translate(key, args))
    }

    /// Runs `f` with a resolver reading the current dictionary.
    ///
    /// The dictionary is read-locked meanwhile: `f`, the processors and the
    /// reporter must not modify the client.
    pub(crate) fn with_resolver<R>(&self, zones: &[Zone], f: impl FnOnce(&Resolver<'_>) -> R) -> R {
        let loading = self.loading();
        let inner = &*self.inner;
        let state = inner.state.read();
        let resolver = Resolver {
            dictionary: &state.dictionary,
            processors: &inner.processors,
            reporter: &*inner.reporter,
            zones,
            loading,
            context: ProcessorContext {
                key: "",
                locales: &state.locales,
                internals: &state.internals,
                plurals: &state.plurals,
                formats: &inner.formats,
                time_zone: inner.time_zone,
                currency: inner.currency.as_deref(),
            },
        };
        f(&resolver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    /// Payload with `zone.<name> = "<name>:<primary locale>"` for each zone.
    fn payload(locales: &[Locale], zones: &[Zone]) -> Vec<CondensedDictionary> {
        let locale = locales.first().cloned().unwrap_or_default();
        zones
            .iter()
            .map(|zone| {
                let mut dictionary = CondensedDictionary::default();
                let name = if zone.is_empty() { "root" } else { zone.as_str() };
                dictionary.insert(&format!("zone.{name}"), format!("{name}:{locale}"), false);
                dictionary
            })
            .collect()
    }

    #[derive(Default)]
    struct Echo {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Condense for Echo {
        async fn condense(
            &self,
            locales: &[Locale],
            zones: &[Zone],
        ) -> polyglot_common::Result<Vec<CondensedDictionary>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(payload(locales, zones))
        }
    }

    /// Holds its first call until released.
    #[derive(Default)]
    struct Gated {
        calls: AtomicUsize,
        started: Notify,
        release: Notify,
    }

    #[async_trait]
    impl Condense for Gated {
        async fn condense(
            &self,
            locales: &[Locale],
            zones: &[Zone],
        ) -> polyglot_common::Result<Vec<CondensedDictionary>> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                self.started.notify_one();
                self.release.notified().await;
            }
            Ok(payload(locales, zones))
        }
    }

    struct Short;

    #[async_trait]
    impl Condense for Short {
        async fn condense(
            &self,
            _locales: &[Locale],
            _zones: &[Zone],
        ) -> polyglot_common::Result<Vec<CondensedDictionary>> {
            Ok(Vec::new())
        }
    }

    fn client(echo: &Arc<Echo>, locales: &[&str]) -> I18nClient {
        I18nClient::new(locales, echo.clone())
    }

    // ========================================================================
    // Zone loading
    // ========================================================================

    #[tokio::test]
    async fn test_enter_loads_root_zone() {
        let echo = Arc::new(Echo::default());
        let client = client(&echo, &["en"]);
        let translator = client.enter(["adm"]).await.unwrap();
        assert_eq!(translator.t("zone.root", &[]), "root:en");
        assert_eq!(translator.t("zone.adm", &[]), "adm:en");
        assert_eq!(echo.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            client.loaded_zones(),
            BTreeSet::from([String::new(), "adm".to_string()])
        );
    }

    #[tokio::test]
    async fn test_entries_are_batched() {
        let echo = Arc::new(Echo::default());
        let client = client(&echo, &["en"]);
        let first = client.enter(["a"]);
        let second = client.enter(["b"]);
        let third = client.enter(["a"]);
        assert!(client.loading());
        first.await.unwrap();
        second.await.unwrap();
        third.await.unwrap();
        assert_eq!(echo.calls.load(Ordering::SeqCst), 1);
        assert!(!client.loading());

        client.enter(["a", "b"]).await.unwrap();
        assert_eq!(echo.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_translator_renders_dots_while_loading() {
        let echo = Arc::new(Echo::default());
        let client = client(&echo, &["en"]);
        let entering = client.enter(Vec::<Zone>::new());
        assert_eq!(entering.translator().t("zone.root", &[]), "...");
        let translator = entering.await.unwrap();
        assert_eq!(translator.t("zone.root", &[]), "root:en");
    }

    #[tokio::test]
    async fn test_cancel_rejects_waiting_callers() {
        let echo = Arc::new(Echo::default());
        let client = client(&echo, &["en"]);
        let entering = client.enter(["a"]);
        client.cancel_loading();
        assert_eq!(entering.await.unwrap_err(), ClientError::Cancelled);
        assert_eq!(echo.calls.load(Ordering::SeqCst), 0);
        assert!(!client.loading());

        client.enter(["a"]).await.unwrap();
        assert_eq!(echo.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_enter_without_runtime() {
        let echo = Arc::new(Echo::default());
        let client = client(&echo, &["en"]);
        let entering = client.enter(["a"]);
        let outcome = futures::executor::block_on(entering.loaded());
        assert_eq!(outcome, Err(ClientError::NoRuntime));
        assert!(!client.loading());
    }

    #[tokio::test]
    async fn test_zone_count_mismatch() {
        let client = I18nClient::new(&["en"], Arc::new(Short));
        let error = client.enter(["a"]).await.unwrap_err();
        assert_eq!(
            error,
            ClientError::ZoneCount {
                expected: 2,
                received: 0
            }
        );
        assert!(client.loaded_zones().is_empty());
    }

    // ========================================================================
    // Locales
    // ========================================================================

    #[tokio::test]
    async fn test_set_locales_reloads_loaded_zones() {
        let echo = Arc::new(Echo::default());
        let client = client(&echo, &["en"]);
        let translator = client.enter(["adm"]).await.unwrap();

        client.set_locales(&["en"]).await.unwrap();
        assert_eq!(echo.calls.load(Ordering::SeqCst), 1);

        client.set_locales(&["fr", "en"]).await.unwrap();
        assert_eq!(echo.calls.load(Ordering::SeqCst), 2);
        assert_eq!(client.locales(), vec!["fr".to_string(), "en".to_string()]);
        assert_eq!(translator.t("zone.adm", &[]), "adm:fr");
    }

    #[tokio::test]
    async fn test_set_locales_applies_to_deferred_batch() {
        let echo = Arc::new(Echo::default());
        let client = client(&echo, &["en"]);
        let entering = client.enter(["a"]);
        let switched = client.set_locales(&["de"]);
        let translator = entering.await.unwrap();
        switched.await.unwrap();
        assert_eq!(translator.t("zone.a", &[]), "a:de");
        assert_eq!(echo.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_set_locales_discards_running_batch() {
        let gated = Arc::new(Gated::default());
        let client = I18nClient::new(&["en"], gated.clone());
        let entering = client.enter(["a"]);
        gated.started.notified().await;

        let switched = client.set_locales(&["de"]);
        gated.release.notify_one();
        let translator = entering.await.unwrap();
        switched.await.unwrap();

        assert_eq!(translator.t("zone.a", &[]), "a:de");
        assert_eq!(gated.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_entry_interrupted_by_locale_switch_waits_for_reload() {
        let gated = Arc::new(Gated::default());
        let client = I18nClient::new(&["en"], gated.clone());
        let entering = client.enter(["a"]);
        gated.started.notified().await;

        let _switched = client.set_locales(&["de"]);
        gated.release.notify_one();
        let translator = entering.await.unwrap();

        assert!(client.loaded_zones().contains("a"));
        assert_eq!(translator.t("zone.a", &[]), "a:de");
        assert!(!client.loading());
    }

    #[tokio::test]
    async fn test_entry_interrupted_by_cancelled_reload() {
        let gated = Arc::new(Gated::default());
        let client = I18nClient::new(&["en"], gated.clone());
        let entering = client.enter(["a"]);
        gated.started.notified().await;

        let switched = client.set_locales(&["de"]);
        client.cancel_loading();
        gated.release.notify_one();

        assert_eq!(entering.await.unwrap_err(), ClientError::Cancelled);
        assert_eq!(switched.await, Err(ClientError::Cancelled));
        assert!(client.loaded_zones().is_empty());
    }

    // ========================================================================
    // Configuration
    // ========================================================================

    #[tokio::test]
    async fn test_client_from_config() {
        let echo = Arc::new(Echo::default());
        let config = ClientConfig {
            locales: vec!["fr".to_string(), "en".to_string(), "fr".to_string()],
            zones: vec!["adm".to_string()],
            time_zone: Some("Europe/Paris".to_string()),
            currency: Some("EUR".to_string()),
        };
        let translator = I18nClient::from_config(&config, echo.clone())
            .unwrap()
            .await
            .unwrap();
        let client = translator.client();

        assert_eq!(client.locales(), vec!["fr".to_string(), "en".to_string()]);
        assert_eq!(
            client.loaded_zones(),
            BTreeSet::from([String::new(), "adm".to_string()])
        );
        assert_eq!(translator.t("zone.adm", &[]), "adm:fr");
        assert_eq!(client.inner.time_zone, chrono_tz::Europe::Paris);
        assert_eq!(client.inner.currency.as_deref(), Some("EUR"));
        assert_eq!(echo.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_client_from_config_rejects_unknown_time_zone() {
        let config = ClientConfig {
            time_zone: Some("Mars/Olympus_Mons".to_string()),
            ..ClientConfig::default()
        };
        assert!(matches!(
            I18nClient::from_config(&config, Arc::new(Echo::default())),
            Err(ClientError::Config(_))
        ));
        let builder = I18nClientBuilder::from_config(&ClientConfig::default(), Arc::new(Echo::default()))
            .unwrap();
        assert_eq!(builder.locales, vec!["en".to_string()]);
        assert_eq!(builder.time_zone, Tz::UTC);
    }

    // ========================================================================
    // Modifications and partial loads
    // ========================================================================

    #[tokio::test]
    async fn test_modifications_notify_observer() {
        let echo = Arc::new(Echo::default());
        let seen = Arc::new(Mutex::new(Vec::<TextKey>::new()));
        let observer = Arc::clone(&seen);
        let client = I18nClient::builder(&["en"], echo.clone())
            .on_modification(move |keys| observer.lock().extend_from_slice(keys))
            .build();
        let translator = client.enter(["adm"]).await.unwrap();
        assert_eq!(seen.lock().len(), 2);
        seen.lock().clear();

        let mut entries = ModifiedEntries::new();
        entries.insert("zone.adm".into(), Some(("changed".into(), "adm".into())));
        entries.insert("zone.root".into(), None);
        entries.insert("zone.other".into(), Some(("ignored".into(), "other".into())));
        client.modified(entries);

        assert_eq!(translator.t("zone.adm", &[]), "changed");
        assert_eq!(translator.t("zone.root", &[]), "[zone.root]");
        assert_eq!(translator.t("zone.other", &[]), "[zone.other]");
        assert_eq!(*seen.lock(), vec!["zone.adm".to_string(), "zone.root".to_string()]);

        client.apply_modification("fld.new", Some("New"), "");
        assert_eq!(translator.t("fld.new", &[]), "New");
    }

    #[tokio::test]
    async fn test_partial_load_seeds_another_client() {
        let echo = Arc::new(Echo::default());
        let source = client(&echo, &["en"]);
        source.enter(["adm", "web"]).await.unwrap();
        let partial = source.get_partial_load(&["web".to_string()]);
        assert_eq!(partial.zones.len(), 2);

        let target = client(&echo, &["en"]);
        target.use_partial(partial.clone()).unwrap();
        let translator = target.enter(["adm"]).await.unwrap();
        assert_eq!(translator.t("zone.adm", &[]), "adm:en");
        assert_eq!(echo.calls.load(Ordering::SeqCst), 1);

        let other = client(&echo, &["fr"]);
        assert!(matches!(
            other.use_partial(partial),
            Err(ClientError::LocaleMismatch { .. })
        ));
    }
}
