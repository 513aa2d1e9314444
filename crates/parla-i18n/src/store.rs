//! Translation store: catalogs per language, the active language, and the
//! lookup path that feeds templates through the resolver.
//!
//! # Invariants
//!
//! 1. **Active implies loaded**: the active language always has a catalog.
//!    [`Translator::use_language`] on an unknown language changes nothing and
//!    notifies nobody.
//! 2. **Merges are silent**: [`Translator::add_translations`] never changes
//!    the active language and never notifies. Lookups see merged entries
//!    immediately, including for the active language.
//! 3. **Replay-last**: subscribers to the active language receive the last
//!    published catalog snapshot on subscription, then every successful
//!    switch, synchronously and in subscription order. A snapshot is frozen
//!    at publication; later merges reach lookups and
//!    [`Translator::active_language`] but not snapshots already handed out.
//! 4. **Shared streams**: [`Translator::translate_stream`] returns the same
//!    handle for the same key and parameters while any handle is alive.
//!
//! # Threading
//!
//! The store is single-threaded (`Rc`/`RefCell`). No internal borrow is held
//! while subscriber callbacks run, so callbacks may translate re-entrantly.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use parla_reactive::{MemoCache, Observable, Subscription};
use tracing::{debug, trace};

use crate::catalog::{CoverageReport, LanguageCatalog, LanguageId};
use crate::config::{DEFAULT_MAX_NESTING_DEPTH, TranslatorConfig};
use crate::error::TranslateError;
use crate::params::Params;
use crate::template;
use crate::transform::{IdentityTransform, KeyTransform, KeyTransformer};

/// Outcome of a lookup: `Ok(None)` is a miss (unknown key or no active
/// language), `Ok(Some(text))` a rendered translation, which may be empty.
pub type Translation = Result<Option<String>, TranslateError>;

struct Inner {
    catalogs: RefCell<HashMap<LanguageId, Rc<LanguageCatalog>>>,
    active_id: RefCell<Option<LanguageId>>,
    active: Observable<Rc<LanguageCatalog>>,
    transform: Box<dyn KeyTransform>,
    max_nesting_depth: usize,
    streams: RefCell<MemoCache<StreamKey, StreamInner>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct StreamKey {
    key: String,
    params: Option<String>,
}

impl Inner {
    fn current_catalog(&self) -> Option<Rc<LanguageCatalog>> {
        let id = self.active_id.borrow().clone()?;
        self.catalogs.borrow().get(&id).cloned()
    }

    fn translate_at(&self, key: &str, params: Option<&Params>, depth: usize) -> Translation {
        let key = self.transform.transform_key(key, params);
        let Some(catalog) = self.current_catalog() else {
            trace!(key = key.as_str(), "no active language");
            return Ok(None);
        };
        let Some(raw) = catalog.get(&key) else {
            trace!(key = key.as_str(), language = %catalog.id(), "translation key not found");
            return Ok(None);
        };

        let rendered = template::render(raw, params, |nested| {
            if depth >= self.max_nesting_depth {
                return Err(TranslateError::NestingTooDeep {
                    key: nested.to_string(),
                    limit: self.max_nesting_depth,
                });
            }
            Ok(self
                .translate_at(nested, params, depth + 1)?
                .unwrap_or_default())
        });

        match rendered {
            Ok(text) => Ok(Some(text)),
            Err(err) => {
                if depth == 0 {
                    debug!(key = key.as_str(), error = %err, "translation failed");
                }
                Err(err.in_key(key))
            }
        }
    }
}

/// The translation store and lookup entry point.
///
/// Cloning a `Translator` creates another handle to the **same** store.
///
/// # Example
///
/// ```
/// use parla_i18n::{Params, Translator};
///
/// let translator = Translator::new();
/// translator.add_translations("de", [
///     ("GREETING", "Hallo {name}"),
///     ("YEARS", "{n, plural, one{Jahr} other{Jahren}}"),
/// ]);
/// translator.use_language("de");
///
/// let params = Params::new().with("name", "Robin");
/// assert_eq!(
///     translator.translate("GREETING", Some(&params)).unwrap().as_deref(),
///     Some("Hallo Robin")
/// );
/// let one = Params::new().with("n", 1);
/// assert_eq!(translator.translate_or_empty("YEARS", Some(&one)).unwrap(), "Jahr");
/// assert_eq!(translator.translate("UNKNOWN", None).unwrap(), None);
/// ```
#[derive(Clone)]
pub struct Translator {
    inner: Rc<Inner>,
}

impl Default for Translator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Translator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Translator")
            .field("languages", &self.languages())
            .field("active", &self.active_language_id())
            .field("max_nesting_depth", &self.inner.max_nesting_depth)
            .field("streams", &self.inner.streams.borrow().len())
            .finish_non_exhaustive()
    }
}

impl Translator {
    /// Create an empty store with the identity key transform.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Start configuring a store.
    #[must_use]
    pub fn builder() -> TranslatorBuilder {
        TranslatorBuilder::default()
    }

    /// Create a store from configuration.
    ///
    /// An unrecognised `key_transform` name logs a warning and falls back to
    /// the identity transform.
    #[must_use]
    pub fn from_config(config: &TranslatorConfig) -> Self {
        Self::builder()
            .transform(KeyTransformer::from_config(config.key_transform.as_deref()))
            .max_nesting_depth(config.max_nesting_depth)
            .build()
    }

    /// Merge `entries` into the catalog for `language`, creating it if
    /// needed. Returns how many keys were new.
    ///
    /// Does not change the active language and does not notify subscribers.
    ///
    /// Catalogs are copy-on-write. Merging into a catalog that is shared
    /// (always the case for the active language, whose last snapshot the
    /// subscriber list retains) clones it once per call, so batch entries
    /// into one call rather than many.
    pub fn add_translations<K, V>(
        &self,
        language: impl Into<LanguageId>,
        entries: impl IntoIterator<Item = (K, V)>,
    ) -> usize
    where
        K: Into<String>,
        V: Into<String>,
    {
        let id = language.into();
        let mut catalogs = self.inner.catalogs.borrow_mut();
        let catalog = catalogs
            .entry(id.clone())
            .or_insert_with(|| Rc::new(LanguageCatalog::new(id.clone())));
        let catalog = Rc::make_mut(catalog);
        let added = catalog.merge(entries);
        debug!(language = %id, added, total = catalog.len(), "merged translations");
        added
    }

    /// Make `language` active and notify subscribers.
    ///
    /// Returns `false` and does nothing when no catalog exists for
    /// `language`: translations must be added before activation.
    pub fn use_language(&self, language: impl Into<LanguageId>) -> bool {
        let id = language.into();
        let catalog = self.inner.catalogs.borrow().get(&id).cloned();
        let Some(catalog) = catalog else {
            debug!(language = %id, "activation ignored: language has no translations");
            return false;
        };
        *self.inner.active_id.borrow_mut() = Some(id.clone());
        debug!(language = %id, entries = catalog.len(), "active language switched");
        self.inner.active.publish(catalog);
        true
    }

    /// The active catalog, or `None` before the first successful
    /// [`use_language`](Self::use_language).
    #[must_use]
    pub fn active_language(&self) -> Option<Rc<LanguageCatalog>> {
        self.inner.current_catalog()
    }

    #[must_use]
    pub fn active_language_id(&self) -> Option<LanguageId> {
        self.inner.active_id.borrow().clone()
    }

    /// Observe language switches.
    ///
    /// `callback` runs immediately with the last published catalog (if any),
    /// then on every successful [`use_language`](Self::use_language). Drop
    /// the returned [`Subscription`] to stop.
    ///
    /// The catalog passed to `callback` is a snapshot: entries merged after
    /// it was published are not in it. Use
    /// [`active_language`](Self::active_language) or
    /// [`translate`](Self::translate) for the live contents.
    pub fn subscribe_active_language(
        &self,
        callback: impl Fn(&Rc<LanguageCatalog>) + 'static,
    ) -> Subscription {
        self.inner.active.subscribe(callback)
    }

    /// Resolve `key` in the active language and render it with `params`.
    ///
    /// The key transform runs first. Nested `{translate, KEY}` references
    /// resolve through this same path with the same `params`; a nested miss
    /// renders as the empty string.
    ///
    /// # Errors
    ///
    /// [`TranslateError::Render`] naming the key, wrapping a missing
    /// parameter or an exceeded nesting depth. Lookup misses are `Ok(None)`.
    pub fn translate(&self, key: &str, params: Option<&Params>) -> Translation {
        self.inner.translate_at(key, params, 0)
    }

    /// [`translate`](Self::translate) with misses rendered as `""`.
    ///
    /// # Errors
    ///
    /// Same as [`translate`](Self::translate).
    pub fn translate_or_empty(
        &self,
        key: &str,
        params: Option<&Params>,
    ) -> Result<String, TranslateError> {
        Ok(self.translate(key, params)?.unwrap_or_default())
    }

    /// A stream of renderings of `key`, refreshed on every language switch.
    ///
    /// Requests with the same key and equal parameters return the same
    /// shared stream while any handle to it is alive.
    #[must_use]
    pub fn translate_stream(&self, key: &str, params: Option<&Params>) -> TranslationStream {
        let memo_key = StreamKey {
            key: key.to_string(),
            params: params.map(Params::fingerprint),
        };
        if let Some(existing) = self.inner.streams.borrow().get(&memo_key) {
            return TranslationStream { inner: existing };
        }

        let output = Observable::new();
        let sink = output.clone();
        let weak: Weak<Inner> = Rc::downgrade(&self.inner);
        let owned_key = key.to_string();
        let owned_params = params.cloned();
        // Replays the current language, so `output` starts populated when a
        // language is already active.
        let source = self.inner.active.subscribe(move |_| {
            if let Some(inner) = weak.upgrade() {
                sink.publish(inner.translate_at(&owned_key, owned_params.as_ref(), 0));
            }
        });

        let stream = StreamInner {
            key: key.to_string(),
            output,
            _source: source,
        };
        let inner = self
            .inner
            .streams
            .borrow_mut()
            .get_or_insert_with(memo_key, || stream);
        trace!(key, "translation stream created");
        TranslationStream { inner }
    }

    /// Number of memoized streams currently cached.
    #[must_use]
    pub fn stream_count(&self) -> usize {
        self.inner.streams.borrow().len()
    }

    /// All language ids with a catalog, sorted.
    #[must_use]
    pub fn languages(&self) -> Vec<LanguageId> {
        let mut ids: Vec<LanguageId> = self.inner.catalogs.borrow().keys().cloned().collect();
        ids.sort_unstable();
        ids
    }

    #[must_use]
    pub fn has_language(&self, language: &LanguageId) -> bool {
        self.inner.catalogs.borrow().contains_key(language)
    }

    /// Snapshot of the catalog for `language`.
    #[must_use]
    pub fn catalog(&self, language: &LanguageId) -> Option<Rc<LanguageCatalog>> {
        self.inner.catalogs.borrow().get(language).cloned()
    }

    /// Key coverage of every language against the union of all keys.
    #[must_use]
    pub fn coverage_report(&self) -> CoverageReport {
        let catalogs = self.inner.catalogs.borrow();
        CoverageReport::from_catalogs(catalogs.values().map(|c| &**c))
    }
}

/// Builder for [`Translator`].
pub struct TranslatorBuilder {
    transform: Box<dyn KeyTransform>,
    max_nesting_depth: usize,
}

impl Default for TranslatorBuilder {
    fn default() -> Self {
        Self {
            transform: Box::new(IdentityTransform),
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}

impl fmt::Debug for TranslatorBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslatorBuilder")
            .field("max_nesting_depth", &self.max_nesting_depth)
            .finish_non_exhaustive()
    }
}

impl TranslatorBuilder {
    /// Key transform applied before every lookup.
    #[must_use]
    pub fn transform(mut self, transform: impl KeyTransform + 'static) -> Self {
        self.transform = Box::new(transform);
        self
    }

    /// Maximum chain length of nested key references.
    #[must_use]
    pub fn max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    #[must_use]
    pub fn build(self) -> Translator {
        Translator {
            inner: Rc::new(Inner {
                catalogs: RefCell::new(HashMap::new()),
                active_id: RefCell::new(None),
                active: Observable::new(),
                transform: self.transform,
                max_nesting_depth: self.max_nesting_depth,
                streams: RefCell::new(MemoCache::new()),
            }),
        }
    }
}

struct StreamInner {
    key: String,
    output: Observable<Translation>,
    _source: Subscription,
}

/// Shared handle to a per-key translation stream.
///
/// Cloning shares the stream. The stream stops updating once the store it
/// came from is dropped.
#[derive(Clone)]
pub struct TranslationStream {
    inner: Rc<StreamInner>,
}

impl fmt::Debug for TranslationStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslationStream")
            .field("key", &self.inner.key)
            .field("latest", &self.latest())
            .finish()
    }
}

impl TranslationStream {
    /// Key this stream renders (before transformation).
    #[must_use]
    pub fn key(&self) -> &str {
        &self.inner.key
    }

    /// Last rendering, if any language has been active since creation.
    #[must_use]
    pub fn latest(&self) -> Option<Translation> {
        self.inner.output.get()
    }

    /// Receive the latest rendering now (if any) and every later one.
    pub fn subscribe(&self, callback: impl Fn(&Translation) + 'static) -> Subscription {
        self.inner.output.subscribe(callback)
    }

    /// Number of renderings published so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.output.version()
    }

    /// Whether both handles share one stream.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}
