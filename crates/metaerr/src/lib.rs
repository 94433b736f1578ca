//! # metaerr
//!
//! Errors carrying a classification code and typed metadata, usable with the
//! standard `std::error::Error` source chain.
//!
//! ## Design Philosophy
//!
//! - **Code**: A short string to branch on, independent of the message text
//! - **Metadata**: Typed key/value context (`str`, `int`, `int64`, `float64`,
//!   `bool`, `time`) queried back with typed getters
//! - **Immutable errors**: Process-wide sentinels which are never modified;
//!   decorating one yields a new error that still matches it with [`is`]
//! - **Deterministic rendering**: Fields are always printed in key order
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::LazyLock;
//! use metaerr::{Error, get_code, get_str};
//!
//! static NOT_FOUND: LazyLock<Error> =
//!     LazyLock::new(|| Error::imm_with_code("not found", "ENF"));
//!
//! fn lookup(id: &str) -> Result<(), Error> {
//!     Err(Error::wrap(NOT_FOUND.clone()).str("id", id))
//! }
//!
//! let err = lookup("42").unwrap_err();
//! assert!(err.is(&NOT_FOUND));
//! assert_eq!(get_code(&err), "ENF");
//! assert_eq!(get_str(&err, "id"), Some("42"));
//! assert_eq!(err.to_string(), "not found");
//! assert_eq!(format!("{err:#}"), r#"not found :: id="42""#);
//! ```
//!
//! ## Principles
//!
//! - `Display` shows the message only, `{:#}` and [`Error::canonical`] add
//!   the fields
//! - The code lives in its own slot, never among the metadata
//! - Getters never coerce: a float is not an int
//! - Only decoding can fail

#[macro_use]
mod log;

mod error;
mod fielder;
pub mod inspect;
mod iter;
pub mod json;
mod kind;
mod value;

pub use error::{APPEND_SEPARATOR, DynError, Error, SEPARATOR};
pub use fielder::{Fielder, HasMetadata};
pub use inspect::{
    chain, find, get, get_bool, get_code, get_float64, get_int, get_int64, get_str, get_time,
    has_code, has_key, is, is_immutable,
};
pub use iter::Fields;
pub use json::JsonError;
pub use kind::JsonErrorKind;
pub use value::{Metadata, Value, ValueKind};
