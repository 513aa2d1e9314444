//! Translator and loader configuration.
//!
//! Both structs deserialize from JSON with every field optional, so a
//! partial document only overrides what it names:
//!
//! ```
//! use parla_i18n::config::{LoaderConfig, TranslatorConfig};
//!
//! let cfg = TranslatorConfig::from_json(r#"{ "key_transform": "uppercase" }"#).unwrap();
//! assert_eq!(cfg.max_nesting_depth, 32);
//!
//! let loader = LoaderConfig::from_json(r#"{
//!     "languages": [
//!         { "language": "de", "file_name": "de.json", "default": true },
//!         { "language": "en", "file_name": "en.json" }
//!     ]
//! }"#).unwrap();
//! assert_eq!(loader.asset_location, "assets/translations/");
//! ```

use serde::{Deserialize, Serialize};

use crate::catalog::LanguageId;
use crate::error::ConfigError;

/// Default depth limit for nested `{translate, KEY}` references.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 32;

/// Default directory (or URL prefix) for translation assets.
pub const DEFAULT_ASSET_LOCATION: &str = "assets/translations/";

/// Settings for a [`Translator`](crate::Translator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    /// Name of a built-in key transform (see
    /// [`KeyTransformer::parse`](crate::KeyTransformer::parse)). `None`
    /// selects the identity.
    pub key_transform: Option<String>,
    /// Maximum chain length of nested key references before rendering
    /// fails with [`TranslateError::NestingTooDeep`](crate::TranslateError::NestingTooDeep).
    pub max_nesting_depth: usize,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            key_transform: None,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}

impl TranslatorConfig {
    /// Parse from JSON text.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] if the text is not valid JSON for this struct.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(ConfigError)
    }
}

/// One translation file to load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageFile {
    /// Language the file's entries are merged into. Integer ids are accepted
    /// and converted to their decimal text.
    pub language: LanguageId,
    /// Location relative to [`LoaderConfig::asset_location`].
    pub file_name: String,
    /// Activate this language once loaded.
    #[serde(default)]
    pub default: bool,
}

impl LanguageFile {
    #[must_use]
    pub fn new(language: impl Into<LanguageId>, file_name: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            file_name: file_name.into(),
            default: false,
        }
    }

    /// Mark this file's language as the one to activate.
    #[must_use]
    pub fn as_default(mut self) -> Self {
        self.default = true;
        self
    }
}

/// Settings for a [`TranslationLoader`](crate::loader::TranslationLoader).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Prefix joined with each file name.
    pub asset_location: String,
    /// Files to load. `None` means there is nothing to load.
    pub languages: Option<Vec<LanguageFile>>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            asset_location: DEFAULT_ASSET_LOCATION.to_string(),
            languages: None,
        }
    }
}

impl LoaderConfig {
    /// Parse from JSON text.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] if the text is not valid JSON for this struct.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(ConfigError)
    }

    /// Builder-style setter for the asset location.
    #[must_use]
    pub fn asset_location(mut self, location: impl Into<String>) -> Self {
        self.asset_location = location.into();
        self
    }

    /// Builder-style append of a language file.
    #[must_use]
    pub fn language(mut self, file: LanguageFile) -> Self {
        self.languages.get_or_insert_with(Vec::new).push(file);
        self
    }

    /// Full location of `file` (asset location + file name).
    #[must_use]
    pub fn location_of(&self, file: &LanguageFile) -> String {
        format!("{}{}", self.asset_location, file.file_name)
    }
}
