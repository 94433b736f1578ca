//! Test assertions for `metaerr` errors.
//!
//! Every helper takes the error under test as `&dyn std::error::Error`,
//! looks up the first [`metaerr::Error`] in its source chain and panics with
//! a descriptive message when the expectation does not hold. The helpers are
//! `#[track_caller]`, so the panic points at the assertion in the test.

use std::error::Error as StdError;
use std::fmt::Write;

use chrono::{DateTime, Utc};
use metaerr::Error;
use similar::TextDiff;

#[track_caller]
fn as_error<'a>(err: &'a (dyn StdError + 'static), name: &str) -> &'a Error {
    match metaerr::find(err) {
        Some(err) => err,
        None => panic!("expected {name} to be instance of metaerr::Error, got: {err}"),
    }
}

/// Assert the error message, without fields, equals `cause`.
#[track_caller]
pub fn assert_cause(err: &(dyn StdError + 'static), cause: &str) {
    let err = as_error(err, "err");
    let got = err.message();
    if got != cause {
        panic!("expected cause '{cause}' but got '{got}'");
    }
}

/// Assert the error message, without fields, contains `part`.
#[track_caller]
pub fn assert_contains(err: &(dyn StdError + 'static), part: &str) {
    let err = as_error(err, "err");
    let got = err.message();
    if !got.contains(part) {
        panic!("expected cause '{got}' to contain '{part}'");
    }
}

/// Assert the error code equals `exp`.
#[track_caller]
pub fn assert_code(err: &(dyn StdError + 'static), exp: &str) {
    let err = as_error(err, "err");
    let got = err.code();
    if got != exp {
        panic!("expected code '{exp}' got '{got}'");
    }
}

/// Assert both errors render to the same canonical string.
///
/// On mismatch the panic message carries a field by field diff.
#[track_caller]
pub fn assert_equal(exp: &(dyn StdError + 'static), got: &(dyn StdError + 'static)) {
    let exp = as_error(exp, "exp");
    let got = as_error(got, "got");
    let expected = field_lines(exp);
    let actual = field_lines(got);
    if expected != actual {
        panic!("{}", format_diff(&expected, &actual));
    }
}

/// Message on the first line, then one `key=value` line per field.
fn field_lines(err: &Error) -> String {
    let mut buf = String::new();
    let _ = writeln!(buf, "{}", err.message());
    for (key, value) in err.fields() {
        let _ = writeln!(buf, "{key}={}", value.canonical());
    }
    buf
}

fn format_diff(expected: &str, actual: &str) -> String {
    let diff = TextDiff::from_lines(expected, actual);
    let mut buf = String::new();
    let _ = writeln!(buf, "errors are not equal:");
    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            similar::ChangeTag::Delete => "-",
            similar::ChangeTag::Insert => "+",
            similar::ChangeTag::Equal => " ",
        };
        let _ = write!(buf, "{sign}{change}");
    }
    buf
}

#[track_caller]
fn missing_key(key: &str) -> ! {
    panic!("expected key '{key}' is present")
}

/// Assert the error has a string field `key` equal to `exp`.
#[track_caller]
pub fn assert_str(err: &(dyn StdError + 'static), key: &str, exp: &str) {
    let err = as_error(err, "err");
    let Some(got) = err.get_str(key) else {
        missing_key(key)
    };
    if got != exp {
        panic!("expected {key}='{exp}' got {key}='{got}'");
    }
}

/// Assert the error has an `int` field `key` equal to `exp`.
#[track_caller]
pub fn assert_int(err: &(dyn StdError + 'static), key: &str, exp: isize) {
    let err = as_error(err, "err");
    let Some(got) = err.get_int(key) else {
        missing_key(key)
    };
    if got != exp {
        panic!("expected {key}={exp} got {key}={got}");
    }
}

/// Assert the error has an `int64` field `key` equal to `exp`.
#[track_caller]
pub fn assert_int64(err: &(dyn StdError + 'static), key: &str, exp: i64) {
    let err = as_error(err, "err");
    let Some(got) = err.get_int64(key) else {
        missing_key(key)
    };
    if got != exp {
        panic!("expected {key}={exp} got {key}={got}");
    }
}

/// Assert the error has a `float64` field `key` equal to `exp`.
#[track_caller]
pub fn assert_float64(err: &(dyn StdError + 'static), key: &str, exp: f64) {
    let err = as_error(err, "err");
    let Some(got) = err.get_float64(key) else {
        missing_key(key)
    };
    if got != exp {
        panic!("expected {key}={exp} got {key}={got}");
    }
}

/// Assert the error has a `time` field `key` equal to `exp`.
#[track_caller]
pub fn assert_time(err: &(dyn StdError + 'static), key: &str, exp: DateTime<Utc>) {
    let err = as_error(err, "err");
    let Some(got) = err.get_time(key) else {
        missing_key(key)
    };
    if got != exp {
        panic!("expected {key}='{exp}' got {key}='{got}'");
    }
}

/// Assert the error has a `bool` field `key` equal to `exp`.
#[track_caller]
pub fn assert_bool(err: &(dyn StdError + 'static), key: &str, exp: bool) {
    let err = as_error(err, "err");
    let Some(got) = err.get_bool(key) else {
        missing_key(key)
    };
    if got != exp {
        panic!("expected {key}={exp} got {key}={got}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use std::io;

    fn sample() -> Error {
        Error::new("disk full")
            .with_code("EIO")
            .str("path", "/tmp/x")
            .int("retries", 3)
            .int64("size", 1 << 40)
            .float64("ratio", 0.5)
            .bool("fatal", true)
            .time("at", Utc.with_ymd_and_hms(2022, 1, 18, 13, 57, 0).unwrap())
    }

    #[test]
    fn test_passing_assertions() {
        let err = sample();
        assert_cause(&err, "disk full");
        assert_contains(&err, "full");
        assert_code(&err, "EIO");
        assert_str(&err, "path", "/tmp/x");
        assert_int(&err, "retries", 3);
        assert_int64(&err, "size", 1 << 40);
        assert_float64(&err, "ratio", 0.5);
        assert_bool(&err, "fatal", true);
        assert_time(&err, "at", Utc.with_ymd_and_hms(2022, 1, 18, 13, 57, 0).unwrap());
        assert_equal(&err, &sample());
    }

    #[test]
    #[should_panic(expected = "expected cause 'disk empty' but got 'disk full'")]
    fn test_assert_cause_fails() {
        assert_cause(&sample(), "disk empty");
    }

    #[test]
    #[should_panic(expected = "expected err to be instance of metaerr::Error")]
    fn test_assert_cause_foreign_error() {
        assert_cause(&io::Error::other("boom"), "boom");
    }

    #[derive(Debug)]
    struct Context(Error);

    impl std::fmt::Display for Context {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "context: {}", self.0)
        }
    }

    impl StdError for Context {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_assertions_through_foreign_error() {
        let err = Context(sample());
        assert_cause(&err, "disk full");
        assert_code(&err, "EIO");
        assert_str(&err, "path", "/tmp/x");
        assert_int(&err, "retries", 3);
        assert_bool(&err, "fatal", true);
        assert_equal(&err, &sample());
    }

    #[test]
    #[should_panic(expected = "expected retries=4 got retries=3")]
    fn test_assert_int_through_foreign_error_fails() {
        assert_int(&Context(sample()), "retries", 4);
    }

    #[test]
    #[should_panic(expected = "to contain 'empty'")]
    fn test_assert_contains_fails() {
        assert_contains(&sample(), "empty");
    }

    #[test]
    #[should_panic(expected = "expected code 'ENF' got 'EIO'")]
    fn test_assert_code_fails() {
        assert_code(&sample(), "ENF");
    }

    #[test]
    #[should_panic(expected = "expected key 'missing' is present")]
    fn test_assert_str_missing() {
        assert_str(&sample(), "missing", "x");
    }

    #[test]
    #[should_panic(expected = "expected key 'path' is present")]
    fn test_assert_int_wrong_kind() {
        assert_int(&sample(), "path", 1);
    }

    #[test]
    #[should_panic(expected = "expected retries=4 got retries=3")]
    fn test_assert_int_fails() {
        assert_int(&sample(), "retries", 4);
    }

    #[test]
    #[should_panic(expected = "expected fatal=false got fatal=true")]
    fn test_assert_bool_fails() {
        assert_bool(&sample(), "fatal", false);
    }

    #[test]
    #[should_panic(expected = "errors are not equal")]
    fn test_assert_equal_fails() {
        assert_equal(&sample(), &sample().int("retries", 4));
    }

    #[test]
    fn test_diff_marks_changed_field() {
        let exp = field_lines(&Error::new("m").int("a", 1).int("b", 2));
        let got = field_lines(&Error::new("m").int("a", 1).int("b", 3));
        let diff = format_diff(&exp, &got);
        assert_eq!(diff, "errors are not equal:\n m\n a=1\n-b=2\n+b=3\n");
    }
}
