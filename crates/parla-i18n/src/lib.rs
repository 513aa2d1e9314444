#![forbid(unsafe_code)]

//! Runtime string translation for parla.
//!
//! Catalogs of raw templates are stored per language in a [`Translator`].
//! Looking up a key in the active language renders its template in three
//! passes: plural selection, named interpolation, and nested-key
//! resolution (see [`template`]).
//!
//! # How it fits in the system
//!
//! UI bindings call [`Translator::translate`] for an immediate string, or
//! hold a [`TranslationStream`] to be re-rendered on every language switch.
//! Translation files reach the store through [`loader::TranslationLoader`],
//! which flattens nested JSON into dot-joined keys.

pub mod catalog;
pub mod config;
pub mod error;
pub mod loader;
pub mod params;
pub mod store;
pub mod template;
pub mod transform;

pub use catalog::{CoverageReport, LanguageCatalog, LanguageCoverage, LanguageId};
pub use config::{LanguageFile, LoaderConfig, TranslatorConfig};
pub use error::{ConfigError, LoaderError, RenderError, TranslateError};
pub use params::{ParamValue, Params};
pub use parla_reactive::Subscription;
pub use store::{Translation, TranslationStream, Translator, TranslatorBuilder};
pub use transform::{IdentityTransform, KeyTransform, KeyTransformer};
