//! The `success`/`msg` result envelope many servers answer with.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A uniform success/failure result.
///
/// Two fields are always present; any other top-level fields are kept in
/// [`ResultEnvelope::extra`]. Decode a response into it with
/// [`ResponseReader::json`](super::ResponseReader::json).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEnvelope {
    /// Whether the server processed the request successfully
    pub success: bool,
    /// Human-readable outcome
    #[serde(default)]
    pub msg: String,
    /// Every other top-level field
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ResultEnvelope {
    /// Creates a successful envelope.
    #[must_use]
    pub fn ok(msg: impl Into<String>) -> Self {
        Self {
            success: true,
            msg: msg.into(),
            extra: Map::new(),
        }
    }

    /// Creates a failed envelope.
    #[must_use]
    pub fn fail(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            msg: msg.into(),
            extra: Map::new(),
        }
    }

    /// Adds an extra field, replacing an existing one with the same key.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Returns an extra field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Returns true if the outcome is a failure.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        !self.success
    }
}
