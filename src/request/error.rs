//! Error types for request building, sending and response reading.

use thiserror::Error;

/// Error type for request operations.
///
/// None of these are retried internally; every failure propagates to the
/// caller carrying its underlying cause. A non-2xx status is not an error:
/// it only selects which response stream is read.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The request was configured or used incorrectly.
    #[error("Usage error: {0}")]
    Usage(String),

    /// The target URL could not be parsed.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// The URL as it was about to be sent
        url: String,
        /// Reason for invalidity
        reason: String,
    },

    /// A header or request property name/value is not valid HTTP.
    #[error("Invalid header '{name}': {reason}")]
    InvalidHeader {
        /// The header name
        name: String,
        /// Reason for invalidity
        reason: String,
    },

    /// Network connection failed.
    ///
    /// This includes DNS resolution failures, connection refused,
    /// and other transport-level errors.
    #[error("Connection error: {0}")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The connect or read timeout elapsed.
    #[error("Request timed out")]
    Timeout,

    /// The TLS trust material could not be loaded.
    #[error("TLS configuration error: {0}")]
    Tls(String),

    /// The payload does not match the declared content type.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Streaming file or body bytes, or draining the response, failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of a [`RequestError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller misused the API or supplied invalid configuration.
    Usage,
    /// DNS, connect, TLS or timeout failure in the transport layer.
    Connection,
    /// Payload type mismatched against the declared content type.
    Encoding,
    /// Failure while streaming request or response bytes.
    Io,
}

impl RequestError {
    /// Returns the category this error belongs to.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Usage(_) | Self::InvalidUrl { .. } | Self::InvalidHeader { .. } => {
                ErrorKind::Usage
            }
            Self::Connection(_) | Self::Timeout | Self::Tls(_) => ErrorKind::Connection,
            Self::Encoding(_) => ErrorKind::Encoding,
            Self::Io(_) => ErrorKind::Io,
        }
    }

    pub(crate) fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }

    pub(crate) fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding(message.into())
    }
}
