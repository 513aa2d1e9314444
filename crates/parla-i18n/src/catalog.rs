//! Language identifiers and per-language template catalogs.
//!
//! # Invariants
//!
//! 1. **Additive merge**: [`LanguageCatalog::merge`] inserts new keys and
//!    overwrites existing ones; it never removes a key. Merging the same
//!    entries twice yields the same catalog as merging them once.
//!
//! 2. **Raw storage**: templates are stored exactly as supplied. Nothing is
//!    parsed at insertion time.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque language identifier (e.g. `"en"`, `"de-CH"`).
///
/// Identifiers are standardised on strings; integer identifiers are
/// converted at the boundary. That includes deserialization: `"de"` and `1`
/// are both accepted, and serialization always writes a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawLanguageId", into = "String")]
pub struct LanguageId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLanguageId {
    Text(String),
    Signed(i64),
    Unsigned(u64),
}

impl From<RawLanguageId> for LanguageId {
    fn from(raw: RawLanguageId) -> Self {
        match raw {
            RawLanguageId::Text(s) => Self(s),
            RawLanguageId::Signed(n) => Self(n.to_string()),
            RawLanguageId::Unsigned(n) => Self(n.to_string()),
        }
    }
}

impl From<LanguageId> for String {
    fn from(id: LanguageId) -> Self {
        id.0
    }
}

impl LanguageId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LanguageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LanguageId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for LanguageId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for LanguageId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&String> for LanguageId {
    fn from(s: &String) -> Self {
        Self(s.clone())
    }
}

impl From<&LanguageId> for LanguageId {
    fn from(id: &LanguageId) -> Self {
        id.clone()
    }
}

macro_rules! numeric_language_id {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for LanguageId {
                fn from(n: $ty) -> Self {
                    Self(n.to_string())
                }
            }
        )*
    };
}

numeric_language_id!(i32, i64, u8, u16, u32, u64, usize);

/// Templates for a single language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageCatalog {
    id: LanguageId,
    templates: HashMap<String, String>,
}

impl LanguageCatalog {
    /// Create an empty catalog for `id`.
    #[must_use]
    pub fn new(id: impl Into<LanguageId>) -> Self {
        Self {
            id: id.into(),
            templates: HashMap::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &LanguageId {
        &self.id
    }

    /// Insert or overwrite one template.
    pub fn insert(&mut self, key: impl Into<String>, template: impl Into<String>) {
        self.templates.insert(key.into(), template.into());
    }

    /// Merge `entries` into this catalog. Returns how many keys were new.
    pub fn merge<K, V>(&mut self, entries: impl IntoIterator<Item = (K, V)>) -> usize
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut added = 0;
        for (key, template) in entries {
            if self.templates.insert(key.into(), template.into()).is_none() {
                added += 1;
            }
        }
        added
    }

    /// Raw template for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.templates.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.templates.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Iterate over all keys (unordered).
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    /// Iterate over `(key, template)` pairs (unordered).
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.templates
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Coverage of every language against the union of all keys.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageReport {
    /// Number of unique keys across all languages.
    pub total_keys: usize,
    /// Per-language data, sorted by language id.
    pub languages: Vec<LanguageCoverage>,
}

/// Per-language coverage statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageCoverage {
    pub language: LanguageId,
    pub present: usize,
    /// Keys other languages define but this one lacks, sorted.
    pub missing: Vec<String>,
    /// Coverage as a percentage (0.0–100.0).
    pub coverage_percent: f32,
}

impl CoverageReport {
    /// Build a report over `catalogs`.
    pub fn from_catalogs<'a>(catalogs: impl IntoIterator<Item = &'a LanguageCatalog>) -> Self {
        let mut catalogs: Vec<&LanguageCatalog> = catalogs.into_iter().collect();
        catalogs.sort_unstable_by(|a, b| a.id().cmp(b.id()));

        let mut all: Vec<&str> = catalogs.iter().copied().flat_map(|c| c.keys()).collect();
        all.sort_unstable();
        all.dedup();
        let total = all.len();

        let languages = catalogs
            .into_iter()
            .map(|catalog| {
                let missing: Vec<String> = all
                    .iter()
                    .filter(|key| !catalog.contains_key(key))
                    .map(|key| (*key).to_string())
                    .collect();
                let present = total - missing.len();
                let coverage_percent = if total == 0 {
                    100.0
                } else {
                    (present as f32 / total as f32) * 100.0
                };
                LanguageCoverage {
                    language: catalog.id().clone(),
                    present,
                    missing,
                    coverage_percent,
                }
            })
            .collect();

        Self {
            total_keys: total,
            languages,
        }
    }
}
