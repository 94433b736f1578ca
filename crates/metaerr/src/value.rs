//! Typed metadata values.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use strum_macros::{Display, IntoStaticStr};

/// Metadata attached to an [`Error`](crate::Error).
///
/// Keys are kept sorted so rendering and iteration are deterministic.
pub type Metadata = BTreeMap<String, Value>;

/// A single metadata value.
///
/// Every variant is a distinct kind: typed getters only succeed when the
/// stored variant matches, an `Int` is never read back as an `Int64` or a
/// `Float64`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Int(isize),
    Int64(i64),
    Float64(f64),
    Bool(bool),
    Time(DateTime<Utc>),
}

/// Discriminant of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoStaticStr, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ValueKind {
    Str,
    Int,
    Int64,
    Float64,
    Bool,
    Time,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Str(_) => ValueKind::Str,
            Value::Int(_) => ValueKind::Int,
            Value::Int64(_) => ValueKind::Int64,
            Value::Float64(_) => ValueKind::Float64,
            Value::Bool(_) => ValueKind::Bool,
            Value::Time(_) => ValueKind::Time,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<isize> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int64(&self) -> Option<i64> {
        match self {
            Value::Int64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float64(&self) -> Option<f64> {
        match self {
            Value::Float64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Time(v) => Some(*v),
            _ => None,
        }
    }

    /// The value as it appears after `key=` in the canonical error string.
    pub fn canonical(&self) -> String {
        let mut out = String::new();
        // Writing into a String never fails.
        let _ = self.render(&mut out);
        out
    }

    /// Write the value the way it appears after `key=` in the canonical
    /// error string.
    ///
    /// Strings are quoted and escaped, timestamps use RFC 3339 in UTC.
    pub(crate) fn render(&self, f: &mut impl fmt::Write) -> fmt::Result {
        match self {
            Value::Str(v) => write!(f, "{v:?}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Time(v) => f.write_str(&format_time(v)),
        }
    }
}

/// Timestamp format shared by rendering and JSON encoding.
pub(crate) fn format_time(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Plain textual form: strings are not quoted.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(v) => f.write_str(v),
            other => other.render(f),
        }
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<isize> for Value {
    fn from(v: isize) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Time(v)
    }
}
