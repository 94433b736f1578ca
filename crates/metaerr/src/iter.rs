//! Deterministic iteration over error metadata.

use std::collections::btree_map;
use std::iter::FusedIterator;

use crate::error::Error;
use crate::value::{Metadata, Value};

/// Iterator over the metadata of an [`Error`] in ascending key order.
///
/// Obtained from [`Error::fields`]. It borrows the error, so the error can't
/// change while a traversal is in progress; a finished iterator stays
/// finished, ask the error for a new one to walk the fields again.
///
/// ```rust
/// use metaerr::Error;
///
/// let err = Error::new("msg").str("k0", "v0").str("k2", "v2").str("k1", "v1");
/// let keys: Vec<&str> = err.fields().map(|(key, _)| key).collect();
/// assert_eq!(keys, ["k0", "k1", "k2"]);
/// ```
pub struct Fields<'a> {
    inner: btree_map::Iter<'a, String, Value>,
}

impl<'a> Fields<'a> {
    pub(crate) fn new(metadata: &'a Metadata) -> Self {
        Self {
            inner: metadata.iter(),
        }
    }
}

impl<'a> Iterator for Fields<'a> {
    type Item = (&'a str, &'a Value);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, value)| (key.as_str(), value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Fields<'_> {}

impl FusedIterator for Fields<'_> {}

impl<'a> IntoIterator for &'a Error {
    type Item = (&'a str, &'a Value);
    type IntoIter = Fields<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_fields_sorted() {
        let err = Error::new("msg").str("k0", "v0").str("k2", "v2").str("k1", "v1");

        let mut keys = Vec::new();
        let mut vals = Vec::new();
        for (key, value) in err.fields() {
            keys.push(key);
            vals.push(value.clone());
        }

        assert_eq!(keys, vec!["k0", "k1", "k2"]);
        assert_eq!(
            vals,
            vec![Value::from("v0"), Value::from("v1"), Value::from("v2")]
        );
    }

    #[test]
    fn test_fields_empty() {
        let err = Error::new("msg");
        let mut fields = err.fields();
        assert_eq!(fields.len(), 0);
        assert!(fields.next().is_none());
        assert!(fields.next().is_none());
    }

    #[test]
    fn test_two_iterators_agree() {
        let err = Error::new("msg").int("b", 1).bool("a", true).float64("c", 1.5);
        let first: Vec<_> = err.fields().collect();
        let second: Vec<_> = (&err).into_iter().collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn test_single_pass() {
        let err = Error::new("msg").int("a", 1);
        let mut fields = err.fields();
        assert_eq!(fields.next(), Some(("a", &Value::Int(1))));
        assert_eq!(fields.next(), None);
        assert_eq!(fields.next(), None);
    }
}
