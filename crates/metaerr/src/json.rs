//! Structured encoding of errors.
//!
//! An error is written as
//! `{"error": "<message>", "code": "<code>", "meta": {"<key>": <value>}}`
//! where `meta` is left out when the error carries no metadata. Timestamps
//! are written as RFC 3339 strings.
//!
//! Decoding is lossy: JSON has a single number type, so every number comes
//! back as [`Value::Float64`], and timestamps come back as strings.

use std::fmt;

use serde::de::{self, Deserialize, Deserializer, MapAccess, Visitor};
use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::JsonErrorKind;
use crate::error::Error;
use crate::value::{Metadata, Value, format_time};

/// Result type alias for encoding and decoding
pub type Result<T> = std::result::Result<T, JsonError>;

/// Failure to encode or decode a structured error.
pub struct JsonError {
    kind: JsonErrorKind,
    message: String,
    source: Option<serde_json::Error>,
}

impl JsonError {
    pub fn new(kind: JsonErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn kind(&self) -> JsonErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    fn set_source(mut self, source: serde_json::Error) -> Self {
        self.source = Some(source);
        self
    }

    fn invalid_payload() -> Self {
        Self::new(JsonErrorKind::InvalidPayload, "missing `error` field")
    }

    fn malformed(source: serde_json::Error) -> Self {
        Self::new(JsonErrorKind::Malformed, source.to_string()).set_source(source)
    }

    fn encode_failed(source: serde_json::Error) -> Self {
        Self::new(JsonErrorKind::EncodeFailed, source.to_string()).set_source(source)
    }
}

impl fmt::Display for JsonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if !self.message.is_empty() {
            write!(f, " => {}", self.message)?;
        }
        Ok(())
    }
}

impl fmt::Debug for JsonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.kind)?;

        if !self.message.is_empty() {
            writeln!(f)?;
            writeln!(f, "    Message: {}", self.message)?;
        }

        if let Some(source) = &self.source {
            writeln!(f)?;
            writeln!(f, "    Source: {:?}", source)?;
        }

        Ok(())
    }
}

impl std::error::Error for JsonError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Str(v) => serializer.serialize_str(v),
            Value::Int(v) => serializer.serialize_i64(*v as i64),
            Value::Int64(v) => serializer.serialize_i64(*v),
            Value::Float64(v) => serializer.serialize_f64(*v),
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::Time(v) => serializer.serialize_str(&format_time(v)),
        }
    }
}

impl Serialize for Error {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let has_meta = !self.metadata().is_empty();
        let mut state = serializer.serialize_struct("Error", if has_meta { 3 } else { 2 })?;
        state.serialize_field("error", &self.message())?;
        state.serialize_field("code", self.code())?;
        if has_meta {
            state.serialize_field("meta", self.metadata())?;
        } else {
            state.skip_field("meta")?;
        }
        state.end()
    }
}

/// Decoded record before the `error` field is validated.
#[derive(Default)]
struct Payload {
    error: Option<String>,
    code: Option<String>,
    meta: Option<serde_json::Map<String, serde_json::Value>>,
}

impl Payload {
    fn into_error(self) -> Result<Error> {
        let Some(message) = self.error else {
            debug!(code = ?self.code, "rejecting error payload without message");
            return Err(JsonError::invalid_payload());
        };

        let metadata: Metadata = self
            .meta
            .unwrap_or_default()
            .into_iter()
            .map(|(key, value)| (key, decode_value(value)))
            .collect();

        Ok(Error::new(message)
            .with_code(self.code.unwrap_or_default())
            .set_metadata(&metadata))
    }
}

fn decode_value(value: serde_json::Value) -> Value {
    match value {
        serde_json::Value::String(v) => Value::Str(v),
        serde_json::Value::Bool(v) => Value::Bool(v),
        serde_json::Value::Number(v) => match v.as_f64() {
            Some(v) => Value::Float64(v),
            None => Value::Str(v.to_string()),
        },
        other => Value::Str(other.to_string()),
    }
}

struct PayloadVisitor;

impl<'de> Visitor<'de> for PayloadVisitor {
    type Value = Payload;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a structured error object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Payload, A::Error> {
        let mut payload = Payload::default();
        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "error" => payload.error = Some(map.next_value()?),
                "code" => payload.code = map.next_value()?,
                "meta" => payload.meta = map.next_value()?,
                _ => {
                    map.next_value::<de::IgnoredAny>()?;
                }
            }
        }
        Ok(payload)
    }
}

impl<'de> Deserialize<'de> for Payload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(PayloadVisitor)
    }
}

impl<'de> Deserialize<'de> for Error {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Payload::deserialize(deserializer)?
            .into_error()
            .map_err(de::Error::custom)
    }
}

impl Error {
    /// Encode the error as a JSON object.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(JsonError::encode_failed)
    }

    /// Decode an error from a JSON object.
    ///
    /// The returned error is mutable. A payload without an `error` field is
    /// rejected with [`JsonErrorKind::InvalidPayload`], anything that is not
    /// a well typed object with [`JsonErrorKind::Malformed`].
    pub fn from_json(json: &str) -> Result<Error> {
        serde_json::from_str::<Payload>(json)
            .map_err(JsonError::malformed)?
            .into_error()
    }

    /// Same as [`Error::from_json`] for raw bytes.
    pub fn from_json_slice(json: &[u8]) -> Result<Error> {
        serde_json::from_slice::<Payload>(json)
            .map_err(JsonError::malformed)?
            .into_error()
    }
}
