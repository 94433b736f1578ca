//! The metadata-carrying Error type.

use std::collections::btree_map::Entry;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::fielder::{Fielder, HasMetadata};
use crate::iter::Fields;
use crate::value::{Metadata, Value};

/// Token between the message and the fields in the canonical string.
pub const SEPARATOR: &str = " :: ";

/// Token inserted by [`Error::str_append`] between string values.
pub const APPEND_SEPARATOR: &str = ";";

/// Boxed foreign error accepted by [`Error::wrap_boxed`].
pub type DynError = dyn StdError + Send + Sync + 'static;

#[derive(Clone)]
enum Cause {
    /// Message given to `Error::new` or `Error::imm`.
    Message(Arc<str>),
    /// Foreign error passed to `Error::wrap`.
    Source(Arc<DynError>),
    /// Immutable error this one was promoted from.
    Error(Error),
}

#[derive(Clone)]
struct Node {
    cause: Cause,
    code: String,
    immutable: bool,
    metadata: Metadata,
}

/// An error with a code and typed metadata.
///
/// `Error` is a handle: cloning it is cheap and the clone is the *same* error
/// as far as [`Error::ptr_eq`] and [`Error::is`] are concerned. This is what
/// makes immutable errors usable as shared sentinels:
///
/// ```rust
/// use std::sync::LazyLock;
/// use metaerr::Error;
///
/// static NOT_FOUND: LazyLock<Error> =
///     LazyLock::new(|| Error::imm_with_code("not found", "ENF"));
///
/// let err = Error::wrap(NOT_FOUND.clone()).str("id", "42");
/// assert!(err.is(&NOT_FOUND));
/// assert_eq!(err.get_str("id"), Some("42"));
/// assert!(NOT_FOUND.metadata().is_empty());
/// ```
///
/// Setters consume `self`. On a mutable error they update it in place and
/// hand it back; on an immutable one they return a new mutable error whose
/// cause is the immutable one, leaving the original untouched.
///
/// Mutable errors have value semantics. When another clone of the handle is
/// alive, a setter copies the node first, so the decorated error is no
/// longer [`Error::ptr_eq`] to that clone and the clone does not see the
/// change:
///
/// ```rust
/// use metaerr::Error;
///
/// let err = Error::new("boom");
/// let decorated = Error::wrap(err.clone()).str("a", "b");
/// assert!(!decorated.is(&err));
/// assert!(!err.has_key("a"));
/// ```
///
/// Use an immutable error when identity has to survive decoration.
#[derive(Clone)]
pub struct Error {
    node: Arc<Node>,
}

impl Error {
    fn from_node(node: Node) -> Self {
        Self {
            node: Arc::new(node),
        }
    }

    fn from_cause(cause: Cause, immutable: bool) -> Self {
        Self::from_node(Node {
            cause,
            code: String::new(),
            immutable,
            metadata: Metadata::new(),
        })
    }

    /// Create a new mutable error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self::from_cause(Cause::Message(message.into().into()), false)
    }

    /// Create an immutable error, usually a process-wide sentinel.
    pub fn imm(message: impl Into<String>) -> Self {
        Self::from_cause(Cause::Message(message.into().into()), true)
    }

    /// Create an immutable error carrying a code.
    ///
    /// The code can't be changed on the returned error itself, calling
    /// [`Error::with_code`] on it produces a new error instead.
    pub fn imm_with_code(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self::from_node(Node {
            cause: Cause::Message(message.into().into()),
            code: code.into(),
            immutable: true,
            metadata: Metadata::new(),
        })
    }

    /// Wrap any error.
    ///
    /// An `Error` is returned as is, keeping its identity. Anything else
    /// becomes the cause of a new mutable error. When the chain of a foreign
    /// error holds an `Error`, the new error starts with its code and
    /// metadata so lookups answer the same before and after wrapping.
    pub fn wrap<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::wrap_boxed(Box::new(err))
    }

    /// Same as [`Error::wrap`] for an already boxed error.
    pub fn wrap_boxed(err: Box<DynError>) -> Self {
        match err.downcast::<Error>() {
            Ok(err) => *err,
            Err(other) => {
                let (code, metadata) = match crate::inspect::find(&*other) {
                    Some(inner) => (inner.node.code.clone(), inner.node.metadata.clone()),
                    None => (String::new(), Metadata::new()),
                };
                Self::from_node(Node {
                    cause: Cause::Source(Arc::from(other)),
                    code,
                    immutable: false,
                    metadata,
                })
            }
        }
    }

    /// Wrap an optional error, `None` stays `None`.
    pub fn wrap_opt<E>(err: Option<E>) -> Option<Self>
    where
        E: StdError + Send + Sync + 'static,
    {
        err.map(Self::wrap)
    }

    /// Copy code and metadata into a new mutable error with the same cause.
    ///
    /// Unlike decorating an immutable error, the copy does not keep the
    /// original in its chain.
    pub fn to_mutable(&self) -> Self {
        Self::from_node(Node {
            cause: self.node.cause.clone(),
            code: self.node.code.clone(),
            immutable: false,
            metadata: self.node.metadata.clone(),
        })
    }

    /// Return an error that may be mutated.
    ///
    /// Mutable errors are returned as is. An immutable error becomes the
    /// cause of a new mutable error which inherits its code and metadata.
    fn promote(self) -> Self {
        if !self.node.immutable {
            return self;
        }

        trace!(code = %self.node.code, "promoting immutable error");
        let code = self.node.code.clone();
        let metadata = self.node.metadata.clone();
        Self::from_node(Node {
            cause: Cause::Error(self),
            code,
            immutable: false,
            metadata,
        })
    }

    fn node_mut(&mut self) -> &mut Node {
        debug_assert!(!self.node.immutable, "mutating an immutable error");
        Arc::make_mut(&mut self.node)
    }

    /// Set the error code.
    pub fn with_code(self, code: impl Into<String>) -> Self {
        let mut err = self.promote();
        err.node_mut().code = code.into();
        err
    }

    /// Set metadata key to any value.
    pub fn set(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut err = self.promote();
        err.node_mut().metadata.insert(key.into(), value.into());
        err
    }

    pub fn str(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, Value::Str(value.into()))
    }

    /// Append to a string value using [`APPEND_SEPARATOR`].
    ///
    /// If the key is missing or holds a value of another kind it is set to
    /// `value`.
    pub fn str_append(self, key: impl Into<String>, value: impl AsRef<str>) -> Self {
        let mut err = self.promote();
        let value = value.as_ref();
        match err.node_mut().metadata.entry(key.into()) {
            Entry::Occupied(mut slot) => match slot.get_mut() {
                Value::Str(existing) => {
                    existing.push_str(APPEND_SEPARATOR);
                    existing.push_str(value);
                }
                other => *other = Value::Str(value.to_string()),
            },
            Entry::Vacant(slot) => {
                slot.insert(Value::Str(value.to_string()));
            }
        }
        err
    }

    pub fn int(self, key: impl Into<String>, value: isize) -> Self {
        self.set(key, Value::Int(value))
    }

    pub fn int64(self, key: impl Into<String>, value: i64) -> Self {
        self.set(key, Value::Int64(value))
    }

    pub fn float64(self, key: impl Into<String>, value: f64) -> Self {
        self.set(key, Value::Float64(value))
    }

    pub fn bool(self, key: impl Into<String>, value: bool) -> Self {
        self.set(key, Value::Bool(value))
    }

    pub fn time(self, key: impl Into<String>, value: DateTime<Utc>) -> Self {
        self.set(key, Value::Time(value))
    }

    /// Copy all entries of `metadata`, overriding existing keys.
    ///
    /// An immutable error is promoted once, before any key is copied.
    pub fn set_metadata(self, metadata: &Metadata) -> Self {
        let mut err = self.promote();
        if !metadata.is_empty() {
            let node = err.node_mut();
            for (key, value) in metadata {
                node.metadata.insert(key.clone(), value.clone());
            }
        }
        err
    }

    /// Copy all metadata exposed by `source`.
    pub fn set_metadata_from(self, source: &impl HasMetadata) -> Self {
        self.set_metadata(source.metadata())
    }

    /// Let `fielder` decorate this error.
    pub fn fields_from(self, fielder: &impl Fielder) -> Self {
        fielder.set_fields(self)
    }

    /// The error message without metadata.
    pub fn message(&self) -> String {
        match &self.node.cause {
            Cause::Message(message) => message.to_string(),
            Cause::Source(source) => source.to_string(),
            Cause::Error(err) => err.message(),
        }
    }

    /// The error code, empty when not set.
    pub fn code(&self) -> &str {
        &self.node.code
    }

    pub fn is_immutable(&self) -> bool {
        self.node.immutable
    }

    pub fn metadata(&self) -> &Metadata {
        &self.node.metadata
    }

    /// Iterate metadata in ascending key order.
    pub fn fields(&self) -> Fields<'_> {
        Fields::new(&self.node.metadata)
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.node.metadata.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.node.metadata.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn get_int(&self, key: &str) -> Option<isize> {
        self.get(key).and_then(Value::as_int)
    }

    pub fn get_int64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_int64)
    }

    pub fn get_float64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_float64)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    pub fn get_time(&self, key: &str) -> Option<DateTime<Utc>> {
        self.get(key).and_then(Value::as_time)
    }

    /// The wrapped error, `None` for errors created from a message.
    pub fn cause(&self) -> Option<&DynError> {
        match &self.node.cause {
            Cause::Message(_) => None,
            Cause::Source(source) => Some(&**source),
            Cause::Error(err) => Some(err),
        }
    }

    /// Check whether both handles point to the same error.
    pub fn ptr_eq(&self, other: &Error) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }

    /// Check whether `target` is this error or anywhere in its chain.
    pub fn is(&self, target: &Error) -> bool {
        crate::inspect::is(self, target)
    }

    /// Message followed by metadata: `msg :: a=1 b="two"`.
    ///
    /// Same as formatting with `{:#}`.
    pub fn canonical(&self) -> String {
        format!("{self:#}")
    }

    /// Space separated `key=value` pairs, empty without metadata.
    pub fn fields_string(&self) -> String {
        let mut out = String::new();
        // Writing into a String never fails.
        let _ = self.write_fields(&mut out);
        out
    }

    fn write_message(&self, f: &mut impl fmt::Write) -> fmt::Result {
        match &self.node.cause {
            Cause::Message(message) => f.write_str(message),
            Cause::Source(source) => write!(f, "{source}"),
            Cause::Error(err) => err.write_message(f),
        }
    }

    fn write_fields(&self, f: &mut impl fmt::Write) -> fmt::Result {
        for (i, (key, value)) in self.fields().enumerate() {
            if i > 0 {
                f.write_char(' ')?;
            }
            write!(f, "{key}=")?;
            value.render(f)?;
        }
        Ok(())
    }
}

/// Writes the plain message; the alternate form `{:#}` appends the metadata.
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_message(f)?;
        if f.alternate() && !self.node.metadata.is_empty() {
            f.write_str(SEPARATOR)?;
            self.write_fields(f)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_message(f)?;
        if !self.node.code.is_empty() {
            write!(f, " [{}]", self.node.code)?;
        }
        if self.node.immutable {
            write!(f, " (immutable)")?;
        }
        writeln!(f)?;

        if !self.node.metadata.is_empty() {
            writeln!(f)?;
            writeln!(f, "    Fields:")?;
            for (key, value) in self.fields() {
                write!(f, "        {key}: ")?;
                value.render(f)?;
                writeln!(f)?;
            }
        }

        if let Some(source) = self.cause() {
            writeln!(f)?;
            writeln!(f, "    Source: {source:?}")?;
        }

        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match &self.node.cause {
            Cause::Message(_) => None,
            Cause::Source(source) => Some(&**source as &(dyn StdError + 'static)),
            Cause::Error(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::wrap(err)
    }
}

impl From<String> for Error {
    fn from(message: String) -> Self {
        Error::new(message)
    }
}

impl From<&str> for Error {
    fn from(message: &str) -> Self {
        Error::new(message)
    }
}
