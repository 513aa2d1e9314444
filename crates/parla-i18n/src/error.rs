//! Error types for rendering, lookup, and asset loading.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Missing parameter | `{name}` with no `name` in params | [`TranslateError::MissingParameter`], wrapped in [`TranslateError::Render`] per key |
//! | Nested cycle | `{translate, A}` chain deeper than the limit | [`TranslateError::NestingTooDeep`] |
//! | Missing key | Key not in active catalog | `Ok(None)`, not an error |
//! | No active language | `use_language` never succeeded | `Ok(None)`, not an error |
//! | Bad asset file | I/O or JSON failure | [`LoaderError`], store untouched |

use std::fmt;

/// Failure of a single template render pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// An interpolation placeholder has no value in the parameter bag.
    MissingParameter {
        /// Placeholder name without braces.
        parameter: String,
        /// Template text as seen by the interpolation pass.
        template: String,
    },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingParameter {
                parameter,
                template,
            } => write!(
                f,
                "no value provided for parameter '{parameter}' in '{template}'"
            ),
        }
    }
}

impl std::error::Error for RenderError {}

/// Errors returned by [`Translator::translate`](crate::Translator::translate).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslateError {
    /// Interpolation needed a parameter that was not supplied.
    MissingParameter {
        parameter: String,
        template: String,
    },
    /// Nested `{translate, ..}` references exceeded the configured depth.
    NestingTooDeep { key: String, limit: usize },
    /// Rendering the template for `key` failed.
    Render {
        key: String,
        source: Box<TranslateError>,
    },
}

impl TranslateError {
    /// Wrap `self` with the key whose template was being rendered.
    #[must_use]
    pub fn in_key(self, key: impl Into<String>) -> Self {
        Self::Render {
            key: key.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, past every [`TranslateError::Render`] layer.
    #[must_use]
    pub fn root_cause(&self) -> &Self {
        let mut current = self;
        while let Self::Render { source, .. } = current {
            current = &**source;
        }
        current
    }

    /// Keys being rendered, outermost first.
    #[must_use]
    pub fn key_chain(&self) -> Vec<&str> {
        let mut keys = Vec::new();
        let mut current = self;
        while let Self::Render { key, source } = current {
            keys.push(key.as_str());
            current = &**source;
        }
        keys
    }

    /// Name of the missing parameter, if that is the root cause.
    #[must_use]
    pub fn missing_parameter(&self) -> Option<&str> {
        match self.root_cause() {
            Self::MissingParameter { parameter, .. } => Some(parameter),
            _ => None,
        }
    }
}

impl From<RenderError> for TranslateError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::MissingParameter {
                parameter,
                template,
            } => Self::MissingParameter {
                parameter,
                template,
            },
        }
    }
}

impl fmt::Display for TranslateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingParameter {
                parameter,
                template,
            } => write!(
                f,
                "no value provided for parameter '{parameter}' in '{template}'"
            ),
            Self::NestingTooDeep { key, limit } => write!(
                f,
                "nested translation of '{key}' exceeds the depth limit of {limit}"
            ),
            Self::Render { key, source } => write!(f, "could not translate '{key}'\n{source}"),
        }
    }
}

impl std::error::Error for TranslateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Render { source, .. } => Some(&**source),
            _ => None,
        }
    }
}

/// Errors from loading translation assets.
#[derive(Debug)]
pub enum LoaderError {
    /// The asset could not be read.
    Io {
        location: String,
        source: std::io::Error,
    },
    /// The asset is not valid JSON.
    Parse {
        location: String,
        source: serde_json::Error,
    },
    /// The asset's top-level value is not a JSON object.
    NotAnObject { location: String },
    /// The in-memory source has no document at this location.
    NotFound { location: String },
}

impl fmt::Display for LoaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { location, source } => write!(f, "cannot read '{location}': {source}"),
            Self::Parse { location, source } => {
                write!(f, "cannot parse '{location}': {source}")
            }
            Self::NotAnObject { location } => {
                write!(f, "'{location}' must contain a JSON object at the top level")
            }
            Self::NotFound { location } => write!(f, "no translation asset at '{location}'"),
        }
    }
}

impl std::error::Error for LoaderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::NotAnObject { .. } | Self::NotFound { .. } => None,
        }
    }
}

/// Malformed configuration text.
#[derive(Debug)]
pub struct ConfigError(pub serde_json::Error);

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid configuration: {}", self.0)
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}
