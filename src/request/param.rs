//! Parameter values and raw payloads.

use std::path::PathBuf;

use serde::Serialize;
use serde_json::Value;

use super::RequestError;

/// Value of a request parameter.
///
/// Scalars are kept as JSON values so that the JSON encoding preserves their
/// type (`1` stays a number, `"2"` stays a string). File references are
/// skipped by every text encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// A scalar value.
    Scalar(Value),
    /// A reference to a file on disk.
    File(PathBuf),
}

impl ParamValue {
    /// Returns true if this value references a file.
    #[must_use]
    pub const fn is_file(&self) -> bool {
        matches!(self, Self::File(_))
    }

    /// Returns the stringified scalar, or `None` for file references.
    ///
    /// Strings are written without quotes; every other JSON value uses its
    /// compact JSON text.
    #[must_use]
    pub fn to_text(&self) -> Option<String> {
        match self {
            Self::Scalar(Value::String(s)) => Some(s.clone()),
            Self::Scalar(other) => Some(other.to_string()),
            Self::File(_) => None,
        }
    }

    /// Returns the scalar as a JSON value, or `None` for file references.
    #[must_use]
    pub const fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Scalar(value) => Some(value),
            Self::File(_) => None,
        }
    }
}

impl From<Value> for ParamValue {
    fn from(value: Value) -> Self {
        Self::Scalar(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Scalar(Value::String(value.to_string()))
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Scalar(Value::String(value))
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Scalar(Value::Bool(value))
    }
}

impl From<PathBuf> for ParamValue {
    fn from(path: PathBuf) -> Self {
        Self::File(path)
    }
}

macro_rules! scalar_from_number {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ParamValue {
                fn from(value: $ty) -> Self {
                    Self::Scalar(Value::from(value))
                }
            }
        )*
    };
}

scalar_from_number!(i32, i64, u32, u64, f64);

/// The single raw payload object of a request.
///
/// Used as the JSON document for [`ContentType::Json`](super::ContentType::Json)
/// and as the verbatim body for
/// [`ContentType::OctetStream`](super::ContentType::OctetStream).
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// A JSON document (object, array or scalar).
    Json(Value),
    /// Raw bytes written with no framing.
    Bytes(Vec<u8>),
}

impl Payload {
    /// Serializes `value` into a JSON payload.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Encoding`] if `value` cannot be represented as JSON.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, RequestError> {
        serde_json::to_value(value)
            .map(Self::Json)
            .map_err(|e| RequestError::encoding(format!("payload is not JSON-serializable: {e}")))
    }

    /// Short name of the payload shape, for diagnostics.
    #[must_use]
    pub const fn describe(&self) -> &'static str {
        match self {
            Self::Json(Value::Array(_)) => "JSON array",
            Self::Json(Value::Object(_)) => "JSON object",
            Self::Json(_) => "JSON scalar",
            Self::Bytes(_) => "byte sequence",
        }
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<&[u8]> for Payload {
    fn from(bytes: &[u8]) -> Self {
        Self::Bytes(bytes.to_vec())
    }
}
