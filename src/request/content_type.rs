//! Declared body encodings and character sets.

use std::fmt;
use std::str::FromStr;

use super::RequestError;

/// The declared encoding strategy for a request body.
///
/// Each variant has exactly one encoder in [`BodyEncoder`](super::BodyEncoder).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ContentType {
    /// `key1=value1&key2=value2` built from the scalar parameters.
    #[default]
    Form,
    /// `application/json`
    Json,
    /// `application/octet-stream`
    OctetStream,
    /// `multipart/form-data` with a per-send boundary
    Multipart,
}

impl ContentType {
    /// Value written to the `Content-Type` request property when this
    /// content type is selected. Blank for [`ContentType::Form`].
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Form => "",
            Self::Json => "application/json",
            Self::OctetStream => "application/octet-stream",
            Self::Multipart => "multipart/form-data",
        }
    }

    /// Media type sent on the wire when no `Content-Type` was configured.
    #[must_use]
    pub const fn media_type(self) -> &'static str {
        match self {
            Self::Form => "application/x-www-form-urlencoded",
            other => other.code(),
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.media_type())
    }
}

impl FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "form" | "default" | "application/x-www-form-urlencoded" => Ok(Self::Form),
            "json" | "application/json" => Ok(Self::Json),
            "octet-stream" | "binary" | "application/octet-stream" => Ok(Self::OctetStream),
            "multipart" | "multipart/form-data" => Ok(Self::Multipart),
            _ => Err(s.to_string()),
        }
    }
}

/// Character set used to write text bodies and decode text responses.
///
/// Only the UTF-8 family is supported; the label is kept as configured so it
/// can be reported back unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Charset {
    label: String,
}

impl Charset {
    /// Default label, as accepted by [`Charset::new`].
    pub const DEFAULT_LABEL: &'static str = "utf8";

    /// Creates a charset from its label.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }

    /// Returns the label as configured.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns true if text in this charset is encoded as UTF-8.
    #[must_use]
    pub fn is_utf8(&self) -> bool {
        matches!(
            self.label.trim().to_ascii_lowercase().as_str(),
            "utf8" | "utf-8"
        )
    }

    /// Fails unless text in this charset can be written and decoded.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Usage`] for any label outside the UTF-8 family.
    pub fn ensure_supported(&self) -> Result<(), RequestError> {
        if self.is_utf8() {
            Ok(())
        } else {
            Err(RequestError::usage(format!(
                "unsupported charset '{}': only utf8 is supported",
                self.label
            )))
        }
    }
}

impl Default for Charset {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LABEL)
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}
