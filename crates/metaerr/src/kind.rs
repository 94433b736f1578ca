//! Failure kinds of structured encoding

use strum_macros::{Display, IntoStaticStr};

/// The kind of failure reported by [`JsonError`](crate::JsonError).
///
/// Match on it to tell a payload that is valid JSON but not an error record
/// apart from input that could not be parsed at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoStaticStr, Display)]
#[non_exhaustive]
pub enum JsonErrorKind {
    /// The payload parsed but has no `error` field
    InvalidPayload,

    /// Not JSON, not an object, or a field of the wrong type
    Malformed,

    /// The error could not be encoded
    EncodeFailed,
}

impl JsonErrorKind {
    /// Returns the kind as a static string
    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_display() {
        assert_eq!(JsonErrorKind::InvalidPayload.to_string(), "InvalidPayload");
        assert_eq!(JsonErrorKind::Malformed.as_str(), "Malformed");
    }
}
