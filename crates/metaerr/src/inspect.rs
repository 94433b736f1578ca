//! Inspection helpers working on any error value.
//!
//! Every function accepts a `&dyn std::error::Error` and looks for the first
//! [`Error`] in its `source()` chain. Errors without one answer `false`,
//! `None` or an empty string.

use std::error::Error as StdError;

use chrono::{DateTime, Utc};

use crate::error::Error;
use crate::value::Value;

/// Iterate `err` followed by all of its sources.
pub fn chain<'a>(
    err: &'a (dyn StdError + 'static),
) -> impl Iterator<Item = &'a (dyn StdError + 'static)> {
    std::iter::successors(Some(err), |&err| err.source())
}

/// Find the first [`Error`] in the chain of `err`.
pub fn find<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a Error> {
    chain(err).find_map(|err| err.downcast_ref::<Error>())
}

/// Check whether `target` is `err` or anywhere in its chain.
///
/// Errors are compared by identity, see [`Error::ptr_eq`].
pub fn is(err: &(dyn StdError + 'static), target: &Error) -> bool {
    chain(err)
        .filter_map(|err| err.downcast_ref::<Error>())
        .any(|err| err.ptr_eq(target))
}

pub fn is_immutable(err: &(dyn StdError + 'static)) -> bool {
    find(err).is_some_and(Error::is_immutable)
}

pub fn has_key(err: &(dyn StdError + 'static), key: &str) -> bool {
    find(err).is_some_and(|err| err.has_key(key))
}

/// Check whether the error code equals any of `codes`.
///
/// An unset code matches nothing, not even an empty candidate.
pub fn has_code(err: &(dyn StdError + 'static), codes: &[&str]) -> bool {
    find(err).is_some_and(|err| {
        !err.code().is_empty() && codes.iter().any(|code| *code == err.code())
    })
}

/// The error code, empty when unset or when `err` has no [`Error`].
pub fn get_code<'a>(err: &'a (dyn StdError + 'static)) -> &'a str {
    find(err).map_or("", Error::code)
}

pub fn get<'a>(err: &'a (dyn StdError + 'static), key: &str) -> Option<&'a Value> {
    find(err).and_then(|err| err.get(key))
}

pub fn get_str<'a>(err: &'a (dyn StdError + 'static), key: &str) -> Option<&'a str> {
    get(err, key).and_then(Value::as_str)
}

pub fn get_int(err: &(dyn StdError + 'static), key: &str) -> Option<isize> {
    get(err, key).and_then(Value::as_int)
}

pub fn get_int64(err: &(dyn StdError + 'static), key: &str) -> Option<i64> {
    get(err, key).and_then(Value::as_int64)
}

pub fn get_float64(err: &(dyn StdError + 'static), key: &str) -> Option<f64> {
    get(err, key).and_then(Value::as_float64)
}

pub fn get_bool(err: &(dyn StdError + 'static), key: &str) -> Option<bool> {
    get(err, key).and_then(Value::as_bool)
}

pub fn get_time(err: &(dyn StdError + 'static), key: &str) -> Option<DateTime<Utc>> {
    get(err, key).and_then(Value::as_time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use std::fmt;
    use std::io;

    #[derive(Debug)]
    struct Outer(Error);

    impl fmt::Display for Outer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "outer: {}", self.0)
        }
    }

    impl StdError for Outer {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(&self.0)
        }
    }

    fn plain() -> io::Error {
        io::Error::other("message")
    }

    #[test]
    fn test_is_immutable() {
        let cases: Vec<(bool, Box<dyn StdError>)> = vec![
            (true, Box::new(Error::imm("em0"))),
            (true, Box::new(Error::imm_with_code("em0", "ECode"))),
            (false, Box::new(Error::new("em0").with_code("ECode"))),
            (false, Box::new(plain())),
        ];
        for (i, (exp, err)) in cases.iter().enumerate() {
            assert_eq!(*exp, is_immutable(&**err), "case {i}");
        }
    }

    #[test]
    fn test_has_key() {
        assert!(has_key(&Error::new("em0").int("key0", 123), "key0"));
        assert!(!has_key(&Error::new("em0"), "key0"));
        assert!(!has_key(&plain(), "key0"));
    }

    #[test]
    fn test_has_code() {
        let err = Error::new("em0").with_code("ECode");
        assert!(has_code(&err, &["ECode"]));
        assert!(has_code(&err, &["ECodeX", "ECode"]));
        assert!(!has_code(&err, &["ECodeX"]));
        assert!(!has_code(&err, &[]));
        assert!(!has_code(&plain(), &["ECode"]));
        assert!(!has_code(&Error::new("em0"), &[""]));
    }

    #[test]
    fn test_get_code() {
        assert_eq!(get_code(&Error::new("em0")), "");
        assert_eq!(get_code(&Error::new("em0").with_code("ECode")), "ECode");
        assert_eq!(get_code(&plain()), "");
    }

    #[test]
    fn test_get_str() {
        assert_eq!(get_str(&Error::new("em0"), "key0"), None);
        assert_eq!(get_str(&Error::new("em0").str("key0", ""), "key0"), Some(""));
        assert_eq!(get_str(&Error::new("em0").str("key0", "val0"), "key0"), Some("val0"));
        assert_eq!(get_str(&Error::new("em0").int("key0", 0), "key0"), None);
        assert_eq!(get_str(&plain(), "key0"), None);
    }

    #[test]
    fn test_get_int() {
        assert_eq!(get_int(&Error::new("em0"), "key0"), None);
        assert_eq!(get_int(&Error::new("em0").int("key0", 0), "key0"), Some(0));
        assert_eq!(get_int(&Error::new("em0").int("key0", 123), "key0"), Some(123));
        assert_eq!(get_int(&Error::new("em0").str("key0", "val0"), "key0"), None);
        assert_eq!(get_int(&Error::new("em0").str("n", "5"), "n"), None);
    }

    #[test]
    fn test_get_int64() {
        assert_eq!(get_int64(&Error::new("em0").int64("key0", 123), "key0"), Some(123));
        assert_eq!(get_int64(&Error::new("em0").int("key0", 123), "key0"), None);
        assert_eq!(get_int64(&Error::new("em0").str("key0", "val0"), "key0"), None);
    }

    #[test]
    fn test_get_float64() {
        assert_eq!(get_float64(&Error::new("em0").float64("key0", 0.0), "key0"), Some(0.0));
        assert_eq!(get_float64(&Error::new("em0").float64("key0", 0.123), "key0"), Some(0.123));
        assert_eq!(get_float64(&Error::new("em0").int("key0", 1), "key0"), None);
    }

    #[test]
    fn test_get_time() {
        let time = Utc.with_ymd_and_hms(2022, 1, 18, 13, 57, 0).unwrap();
        assert_eq!(get_time(&Error::new("em0").time("key0", time), "key0"), Some(time));
        assert_eq!(get_time(&Error::new("em0").str("key0", "val0"), "key0"), None);
    }

    #[test]
    fn test_get_bool() {
        assert_eq!(get_bool(&Error::new("em0").bool("key0", false), "key0"), Some(false));
        assert_eq!(get_bool(&Error::new("em0").bool("key0", true), "key0"), Some(true));
        assert_eq!(get_bool(&Error::new("em0").str("key0", "val0"), "key0"), None);
    }

    #[test]
    fn test_find_through_foreign_error() {
        let inner = Error::new("inner").with_code("EIn").str("k", "v");
        let outer = Outer(inner.clone());

        let found = find(&outer).expect("inner error is found");
        assert!(found.ptr_eq(&inner));
        assert_eq!(get_code(&outer), "EIn");
        assert_eq!(get_str(&outer, "k"), Some("v"));
        assert_eq!(chain(&outer).count(), 2);
    }

    #[test]
    fn test_is_walks_promotion_chain() {
        let sentinel = Error::imm_with_code("not found", "ENF");
        let err = Error::wrap(sentinel.clone())
            .with_code("ENF2")
            .str("id", "42");

        assert!(is(&err, &sentinel));
        assert!(is(&Outer(err.clone()), &sentinel));
        assert!(!is(&Error::new("not found"), &sentinel));
        assert!(!is(&plain(), &sentinel));

        // The outermost error wins for lookups.
        assert_eq!(get_code(&err), "ENF2");
        assert_eq!(get_code(&sentinel), "ENF");
    }
}
