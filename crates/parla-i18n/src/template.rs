//! Template resolution: plural selection, interpolation, nested keys.
//!
//! A template is rendered by three passes, each consuming the full text
//! output of the previous one:
//!
//! 1. [`select_plurals`] replaces `{n, plural, one{A} other{B}}` with `A`
//!    when `n` is numerically one, `B` otherwise.
//! 2. [`interpolate`] replaces `{name}` with the stringified parameter.
//!    Names are word characters; bare `{}` names the empty parameter.
//! 3. [`resolve_nested`] replaces `{translate, KEY}` with the rendered text
//!    of `KEY`, supplied by the caller's resolver.
//!
//! Templates are re-scanned on every call; nothing is compiled or cached
//! apart from the patterns themselves.
//!
//! # Known limitation
//!
//! Plural blocks do not nest. Branches are matched non-greedily, so the
//! first `} other{` ends the `one` branch and the first `}}` ends the block.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::error::{RenderError, TranslateError};
use crate::params::Params;

static PLURAL_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{(\w*), plural, one\{(.*?)\} other\{(.*?)\}\}").expect("plural pattern")
});

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(\w*)\}").expect("placeholder pattern"));

static NESTED_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{translate, (.*?)\}").expect("nested key pattern"));

/// Pass 1: choose the `one` or `other` branch of every plural block.
///
/// Missing params or a missing name select `other`. Never fails.
#[must_use]
pub fn select_plurals(template: &str, params: Option<&Params>) -> String {
    PLURAL_BLOCK
        .replace_all(template, |caps: &Captures<'_>| {
            let one = params.is_some_and(|p| p.is_one(&caps[1]));
            let branch = if one { &caps[2] } else { &caps[3] };
            branch.to_string()
        })
        .into_owned()
}

/// Pass 2: substitute every `{name}` placeholder.
///
/// # Errors
///
/// [`RenderError::MissingParameter`] for the first placeholder without a
/// value. No partial result is returned.
pub fn interpolate(template: &str, params: Option<&Params>) -> Result<String, RenderError> {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;
    for caps in PLACEHOLDER.captures_iter(template) {
        let whole = caps.get(0).expect("group 0 always matches");
        let name = &caps[1];
        let value = params
            .and_then(|p| p.get(name))
            .ok_or_else(|| RenderError::MissingParameter {
                parameter: name.to_string(),
                template: template.to_string(),
            })?;
        out.push_str(&template[last..whole.start()]);
        out.push_str(&value.to_string());
        last = whole.end();
    }
    out.push_str(&template[last..]);
    Ok(out)
}

/// Pass 3: replace every `{translate, KEY}` block with `resolve(KEY)`.
///
/// The key is trimmed before it is handed to `resolve`. The first error
/// from `resolve` aborts the pass.
///
/// # Errors
///
/// Whatever `resolve` returns.
pub fn resolve_nested<F>(template: &str, mut resolve: F) -> Result<String, TranslateError>
where
    F: FnMut(&str) -> Result<String, TranslateError>,
{
    let mut out = String::with_capacity(template.len());
    let mut last = 0;
    for caps in NESTED_KEY.captures_iter(template) {
        let whole = caps.get(0).expect("group 0 always matches");
        let rendered = resolve(caps[1].trim())?;
        out.push_str(&template[last..whole.start()]);
        out.push_str(&rendered);
        last = whole.end();
    }
    out.push_str(&template[last..]);
    Ok(out)
}

/// Run all three passes over `template`.
///
/// `resolve` renders nested keys; it normally re-enters the full lookup
/// path with the same `params`.
///
/// # Errors
///
/// Missing parameters from pass 2 and anything `resolve` reports.
pub fn render<F>(
    template: &str,
    params: Option<&Params>,
    resolve: F,
) -> Result<String, TranslateError>
where
    F: FnMut(&str) -> Result<String, TranslateError>,
{
    let text = select_plurals(template, params);
    let text = interpolate(&text, params)?;
    resolve_nested(&text, resolve)
}

/// Whether `template` contains any `{translate, KEY}` reference.
#[must_use]
pub fn has_nested_keys(template: &str) -> bool {
    NESTED_KEY.is_match(template)
}

/// Placeholder names `template` would need after plural selection with no
/// parameters (i.e. along the `other` branches), in order of appearance.
#[must_use]
pub fn placeholders(template: &str) -> Vec<String> {
    let text = select_plurals(template, None);
    PLACEHOLDER
        .captures_iter(&text)
        .map(|caps| caps[1].to_string())
        .collect()
}
