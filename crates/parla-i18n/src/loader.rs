//! Loading translation files into a [`Translator`].
//!
//! Each configured file is a JSON object whose nested structure is
//! flattened into dot-joined keys before it is merged:
//!
//! ```text
//! { "menu": { "open": "Öffnen", "recent": ["A", "B"] }, "count": 3 }
//!   → menu.open = "Öffnen", menu.recent.0 = "A", menu.recent.1 = "B", count = "3"
//! ```
//!
//! # Failure Modes
//!
//! Every file is fetched and flattened before any catalog is touched. If a
//! single file fails, the error is returned and the translator is left
//! exactly as it was.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use serde_json::Value;
use tracing::{debug, info};

use crate::catalog::LanguageId;
use crate::config::LoaderConfig;
use crate::error::LoaderError;
use crate::store::Translator;

/// Transport for translation documents.
pub trait AssetSource {
    /// Fetch the document at `location` as text.
    ///
    /// # Errors
    ///
    /// [`LoaderError`] when the document cannot be read.
    fn fetch(&self, location: &str) -> Result<String, LoaderError>;
}

/// Reads documents from the filesystem, relative to an optional root.
#[derive(Debug, Clone, Default)]
pub struct FsAssetSource {
    root: Option<PathBuf>,
}

impl FsAssetSource {
    /// Resolve locations relative to the working directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve locations relative to `root`.
    #[must_use]
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }
}

impl AssetSource for FsAssetSource {
    fn fetch(&self, location: &str) -> Result<String, LoaderError> {
        let path = match &self.root {
            Some(root) => root.join(location),
            None => PathBuf::from(location),
        };
        std::fs::read_to_string(&path).map_err(|source| LoaderError::Io {
            location: location.to_string(),
            source,
        })
    }
}

/// Serves documents registered in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssetSource {
    documents: HashMap<String, String>,
}

impl MemoryAssetSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style registration of a document.
    #[must_use]
    pub fn with(mut self, location: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(location, text);
        self
    }

    pub fn insert(&mut self, location: impl Into<String>, text: impl Into<String>) {
        self.documents.insert(location.into(), text.into());
    }
}

impl AssetSource for MemoryAssetSource {
    fn fetch(&self, location: &str) -> Result<String, LoaderError> {
        self.documents
            .get(location)
            .cloned()
            .ok_or_else(|| LoaderError::NotFound {
                location: location.to_string(),
            })
    }
}

/// Flatten a JSON object into dot-joined keys.
///
/// Objects and arrays recurse (array elements are keyed by index), strings
/// are taken as-is, numbers and booleans are stringified, `null` is skipped.
///
/// # Errors
///
/// [`LoaderError::NotAnObject`] if `value` is not an object.
pub fn flatten_json(value: &Value) -> Result<BTreeMap<String, String>, LoaderError> {
    let Value::Object(_) = value else {
        return Err(LoaderError::NotAnObject {
            location: String::new(),
        });
    };
    let mut out = BTreeMap::new();
    flatten_into("", value, &mut out);
    Ok(out)
}

fn flatten_into(prefix: &str, value: &Value, out: &mut BTreeMap<String, String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                flatten_into(&join_key(prefix, key), child, out);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                flatten_into(&join_key(prefix, &index.to_string()), child, out);
            }
        }
        Value::String(s) => {
            out.insert(prefix.to_string(), s.clone());
        }
        Value::Number(n) => {
            out.insert(prefix.to_string(), n.to_string());
        }
        Value::Bool(b) => {
            out.insert(prefix.to_string(), b.to_string());
        }
        Value::Null => {}
    }
}

fn join_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

/// Parse and flatten one translation document.
///
/// # Errors
///
/// [`LoaderError::Parse`] for invalid JSON, [`LoaderError::NotAnObject`]
/// for a non-object document.
pub fn parse_document(
    location: &str,
    text: &str,
) -> Result<BTreeMap<String, String>, LoaderError> {
    let value: Value = serde_json::from_str(text).map_err(|source| LoaderError::Parse {
        location: location.to_string(),
        source,
    })?;
    flatten_json(&value).map_err(|_| LoaderError::NotAnObject {
        location: location.to_string(),
    })
}

/// What a [`TranslationLoader::load_into`] call did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Languages merged, in configuration order.
    pub loaded: Vec<LanguageId>,
    /// Total entries merged across all files.
    pub entries: usize,
    /// Language activated by the loader, if any.
    pub activated: Option<LanguageId>,
}

/// Loads the files named in a [`LoaderConfig`] from an [`AssetSource`].
#[derive(Debug, Clone)]
pub struct TranslationLoader<S> {
    source: S,
    config: LoaderConfig,
}

impl TranslationLoader<FsAssetSource> {
    /// Loader reading from the filesystem.
    #[must_use]
    pub fn from_fs(config: LoaderConfig) -> Self {
        Self::new(FsAssetSource::new(), config)
    }
}

impl<S: AssetSource> TranslationLoader<S> {
    #[must_use]
    pub fn new(source: S, config: LoaderConfig) -> Self {
        Self { source, config }
    }

    #[must_use]
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Fetch, flatten, and merge every configured file into `translator`.
    ///
    /// Files marked `default` are activated after merging. If no language
    /// is active once all files are merged, the last configured language is
    /// activated.
    ///
    /// # Errors
    ///
    /// The first [`LoaderError`] encountered; `translator` is unchanged.
    pub fn load_into(&self, translator: &Translator) -> Result<LoadReport, LoaderError> {
        let Some(files) = self.config.languages.as_deref() else {
            debug!("no translation files configured");
            return Ok(LoadReport::default());
        };

        let mut documents = Vec::with_capacity(files.len());
        for file in files {
            let location = self.config.location_of(file);
            let text = self.source.fetch(&location)?;
            let entries = parse_document(&location, &text)?;
            debug!(location = location.as_str(), entries = entries.len(), "translation file parsed");
            documents.push((file, entries));
        }

        let mut report = LoadReport::default();
        for (file, entries) in documents {
            let language = file.language.clone();
            report.entries += entries.len();
            translator.add_translations(language.clone(), entries);
            if file.default && translator.use_language(language.clone()) {
                report.activated = Some(language.clone());
            }
            report.loaded.push(language);
        }

        if translator.active_language_id().is_none()
            && let Some(last) = report.loaded.last().cloned()
            && translator.use_language(last.clone())
        {
            report.activated = Some(last);
        }

        info!(
            languages = report.loaded.len(),
            entries = report.entries,
            active = ?report.activated,
            "translations loaded"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LanguageFile;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn flatten_nested_objects() {
        let value = json!({ "a": { "b": "x", "c": { "d": "y" } }, "top": "z" });
        let flat = flatten_json(&value).unwrap();
        let expected: BTreeMap<String, String> = [("a.b", "x"), ("a.c.d", "y"), ("top", "z")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        assert_eq!(flat, expected);
    }

    #[test]
    fn flatten_scalars_arrays_and_nulls() {
        let value = json!({ "n": 3, "ok": true, "list": ["a", "b"], "gone": null });
        let flat = flatten_json(&value).unwrap();
        assert_eq!(flat.get("n").map(String::as_str), Some("3"));
        assert_eq!(flat.get("ok").map(String::as_str), Some("true"));
        assert_eq!(flat.get("list.1").map(String::as_str), Some("b"));
        assert!(!flat.contains_key("gone"));
    }

    #[test]
    fn non_object_root_is_rejected() {
        let err = parse_document("de.json", "[1, 2]").unwrap_err();
        assert!(matches!(err, LoaderError::NotAnObject { ref location } if location == "de.json"));
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        let err = parse_document("de.json", "{ nope").unwrap_err();
        assert!(matches!(err, LoaderError::Parse { .. }));
    }

    fn source() -> MemoryAssetSource {
        MemoryAssetSource::new()
            .with("t/de.json", r#"{ "GREETING": "Hallo {name}" }"#)
            .with("t/en.json", r#"{ "GREETING": "Hello {name}" }"#)
    }

    #[test]
    fn default_language_is_activated() {
        let config = LoaderConfig::default()
            .asset_location("t/")
            .language(LanguageFile::new("de", "de.json").as_default())
            .language(LanguageFile::new("en", "en.json"));
        let translator = Translator::new();
        let report = TranslationLoader::new(source(), config)
            .load_into(&translator)
            .unwrap();
        assert_eq!(report.activated, Some(LanguageId::from("de")));
        assert_eq!(report.loaded.len(), 2);
        assert_eq!(translator.active_language_id(), Some(LanguageId::from("de")));
    }

    #[test]
    fn last_language_is_the_fallback_default() {
        let config = LoaderConfig::default()
            .asset_location("t/")
            .language(LanguageFile::new("de", "de.json"))
            .language(LanguageFile::new("en", "en.json"));
        let translator = Translator::new();
        let report = TranslationLoader::new(source(), config)
            .load_into(&translator)
            .unwrap();
        assert_eq!(report.activated, Some(LanguageId::from("en")));
        assert_eq!(report.entries, 2);
    }

    #[test]
    fn existing_active_language_is_kept() {
        let translator = Translator::new();
        translator.add_translations("fr", [("GREETING", "Salut {name}")]);
        translator.use_language("fr");

        let config = LoaderConfig::default()
            .asset_location("t/")
            .language(LanguageFile::new("de", "de.json"));
        let report = TranslationLoader::new(source(), config)
            .load_into(&translator)
            .unwrap();
        assert_eq!(report.activated, None);
        assert_eq!(translator.active_language_id(), Some(LanguageId::from("fr")));
    }

    #[test]
    fn failure_leaves_translator_untouched() {
        let translator = Translator::new();
        translator.add_translations("de", [("KEEP", "bleibt")]);

        let config = LoaderConfig::default()
            .asset_location("t/")
            .language(LanguageFile::new("de", "de.json"))
            .language(LanguageFile::new("xx", "missing.json"));
        let err = TranslationLoader::new(source(), config)
            .load_into(&translator)
            .unwrap_err();
        assert!(matches!(err, LoaderError::NotFound { .. }));

        let de = translator.catalog(&LanguageId::from("de")).unwrap();
        assert_eq!(de.len(), 1);
        assert_eq!(translator.active_language_id(), None);
    }

    #[test]
    fn nothing_configured_is_a_noop() {
        let translator = Translator::new();
        let report = TranslationLoader::new(source(), LoaderConfig::default())
            .load_into(&translator)
            .unwrap();
        assert_eq!(report, LoadReport::default());
        assert!(translator.languages().is_empty());
    }
}
