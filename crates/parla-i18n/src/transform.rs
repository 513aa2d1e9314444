//! Key transformation applied before every catalog lookup.
//!
//! Callers may address translations with keys that do not match the catalog
//! spelling (enum variant names, prefixed ids, ...). A [`KeyTransform`]
//! maps the caller's key to the catalog key. The default is the identity.
//!
//! Transforms can also be chosen by name from configuration
//! ([`KeyTransformer::from_config`]). Names are validated once, at
//! construction: an unknown name logs a warning and binds the identity
//! transform instead of failing.

use std::fmt;

use crate::params::Params;

/// Maps a caller-supplied key to the key looked up in the catalog.
pub trait KeyTransform {
    fn transform_key(&self, key: &str, params: Option<&Params>) -> String;
}

impl<F> KeyTransform for F
where
    F: Fn(&str, Option<&Params>) -> String,
{
    fn transform_key(&self, key: &str, params: Option<&Params>) -> String {
        self(key, params)
    }
}

/// Returns keys unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdentityTransform;

impl KeyTransform for IdentityTransform {
    fn transform_key(&self, key: &str, _params: Option<&Params>) -> String {
        key.to_string()
    }
}

/// Built-in transforms selectable from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum KeyTransformer {
    #[default]
    Identity,
    Lowercase,
    Uppercase,
    /// Prepend a fixed namespace, e.g. `prefix:errors.`.
    Prefix(String),
    /// `FooBar` / `fooBar` → `FOO_BAR`, for enum-style keys.
    SnakeUpper,
}

impl KeyTransformer {
    /// Parse a configured transform name.
    ///
    /// Accepted: `identity`, `lowercase`, `uppercase`, `snake_upper`,
    /// `prefix:<text>`. Returns `None` for anything else.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        if let Some(prefix) = name.strip_prefix("prefix:") {
            return Some(Self::Prefix(prefix.to_string()));
        }
        match name {
            "identity" | "" => Some(Self::Identity),
            "lowercase" => Some(Self::Lowercase),
            "uppercase" => Some(Self::Uppercase),
            "snake_upper" => Some(Self::SnakeUpper),
            _ => None,
        }
    }

    /// Resolve the transform named in configuration.
    ///
    /// `None` selects the identity. An unrecognised name is not an error:
    /// a warning is logged and the identity transform is used.
    #[must_use]
    pub fn from_config(name: Option<&str>) -> Self {
        let Some(name) = name else {
            return Self::Identity;
        };
        Self::parse(name).unwrap_or_else(|| {
            tracing::warn!(
                transform = name,
                "configured key transform is not recognised; using the identity transform"
            );
            Self::Identity
        })
    }
}

impl KeyTransform for KeyTransformer {
    fn transform_key(&self, key: &str, _params: Option<&Params>) -> String {
        match self {
            Self::Identity => key.to_string(),
            Self::Lowercase => key.to_lowercase(),
            Self::Uppercase => key.to_uppercase(),
            Self::Prefix(prefix) => format!("{prefix}{key}"),
            Self::SnakeUpper => snake_upper(key),
        }
    }
}

impl fmt::Display for KeyTransformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identity => f.write_str("identity"),
            Self::Lowercase => f.write_str("lowercase"),
            Self::Uppercase => f.write_str("uppercase"),
            Self::Prefix(p) => write!(f, "prefix:{p}"),
            Self::SnakeUpper => f.write_str("snake_upper"),
        }
    }
}

fn snake_upper(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    let mut prev_lower = false;
    for ch in key.chars() {
        if ch.is_uppercase() && prev_lower {
            out.push('_');
        }
        prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        out.extend(ch.to_uppercase());
    }
    out
}
