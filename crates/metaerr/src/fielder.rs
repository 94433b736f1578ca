//! Traits for moving metadata between errors and other types.

use crate::error::Error;
use crate::value::Metadata;

/// A type able to decorate an [`Error`] with its own fields.
///
/// ```rust
/// use metaerr::{Error, Fielder};
///
/// struct Request {
///     id: i64,
///     path: String,
/// }
///
/// impl Fielder for Request {
///     fn set_fields(&self, err: Error) -> Error {
///         err.int64("request_id", self.id).str("path", &self.path)
///     }
/// }
///
/// let req = Request { id: 7, path: "/users".to_string() };
/// let err = Error::new("handler failed").fields_from(&req);
/// assert_eq!(err.get_int64("request_id"), Some(7));
/// ```
pub trait Fielder {
    fn set_fields(&self, err: Error) -> Error;
}

/// A type exposing a metadata map that can be copied onto an error.
pub trait HasMetadata {
    fn metadata(&self) -> &Metadata;
}

impl HasMetadata for Error {
    fn metadata(&self) -> &Metadata {
        Error::metadata(self)
    }
}

impl HasMetadata for Metadata {
    fn metadata(&self) -> &Metadata {
        self
    }
}
