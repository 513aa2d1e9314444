//! Per-call parameter bag for interpolation and plural selection.

use std::collections::BTreeMap;
use std::fmt;

/// A single parameter value: text or a number.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl ParamValue {
    /// Whether this value is the number one.
    ///
    /// Only numeric values qualify; the text `"1"` does not.
    #[must_use]
    pub fn is_one(&self) -> bool {
        match self {
            Self::Integer(n) => *n == 1,
            Self::Float(x) => *x == 1.0,
            Self::Text(_) => false,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Integer(n) => write!(f, "{n}"),
            // Integral floats print without a fraction: 5.0 -> "5".
            Self::Float(x) if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e15 => {
                write!(f, "{}", *x as i64)
            }
            Self::Float(x) => write!(f, "{x}"),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&String> for ParamValue {
    fn from(s: &String) -> Self {
        Self::Text(s.clone())
    }
}

macro_rules! integer_param {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ParamValue {
                fn from(n: $ty) -> Self {
                    Self::Integer(i64::from(n))
                }
            }
        )*
    };
}

integer_param!(i8, i16, i32, i64, u8, u16, u32);

impl From<usize> for ParamValue {
    fn from(n: usize) -> Self {
        i64::try_from(n).map_or(Self::Float(n as f64), Self::Integer)
    }
}

impl From<u64> for ParamValue {
    fn from(n: u64) -> Self {
        i64::try_from(n).map_or(Self::Float(n as f64), Self::Integer)
    }
}

impl From<f32> for ParamValue {
    fn from(x: f32) -> Self {
        Self::Float(f64::from(x))
    }
}

impl From<f64> for ParamValue {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

/// Named parameters supplied to a single translation call.
///
/// # Example
///
/// ```
/// use parla_i18n::Params;
///
/// let params = Params::new().with("name", "Robin").with("n", 3);
/// assert_eq!(params.get("name").map(ToString::to_string), Some("Robin".into()));
/// assert!(!params.is_one("n"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    values: BTreeMap<String, ParamValue>,
}

impl Params {
    /// Create an empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace a value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.values.insert(name.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Whether `name` is present and numerically equal to one.
    #[must_use]
    pub fn is_one(&self, name: &str) -> bool {
        self.get(name).is_some_and(ParamValue::is_one)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Canonical text identity of this bag.
    ///
    /// Two bags with the same names and values produce the same fingerprint.
    /// Names are emitted in sorted order and each entry is tagged with its
    /// value kind, so `1` and `"1"` differ.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut out = String::new();
        for (name, value) in &self.values {
            let (tag, text) = match value {
                ParamValue::Text(s) => ('s', s.clone()),
                ParamValue::Integer(n) => ('i', n.to_string()),
                ParamValue::Float(x) => ('f', format!("{x:?}")),
            };
            out.push_str(&format!("{}:{name}={tag}{}:{text};", name.len(), text.len()));
        }
        out
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}

impl<K: Into<String>, V: Into<ParamValue>, const N: usize> From<[(K, V); N]> for Params {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}
