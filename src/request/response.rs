//! Reading the response stream selected by the status code.

use std::fmt;
use std::io::{self, Read};

use serde::de::DeserializeOwned;

use super::{Charset, RequestError};

/// Which of the two response streams was selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    /// Status 200, 201 or 202.
    Success,
    /// Any other status.
    Error,
}

impl StreamKind {
    /// Classifies a status code.
    #[must_use]
    pub const fn for_status(status: http::StatusCode) -> Self {
        match status.as_u16() {
            200..=202 => Self::Success,
            _ => Self::Error,
        }
    }
}

/// An unread response body. Dropping it releases the connection.
pub struct ResponseStream {
    inner: Box<dyn Read + Send>,
}

impl ResponseStream {
    pub(crate) const fn new(inner: Box<dyn Read + Send>) -> Self {
        Self { inner }
    }

    fn empty() -> Self {
        Self::new(Box::new(io::empty()))
    }
}

impl Read for ResponseStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl fmt::Debug for ResponseStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseStream").finish_non_exhaustive()
    }
}

/// The response to a sent request, positioned on the selected stream.
///
/// Every terminal read consumes the reader, so the connection is released
/// when the read returns, whether it succeeded or failed.
#[derive(Debug)]
pub struct ResponseReader {
    status: http::StatusCode,
    headers: http::HeaderMap,
    stream: ResponseStream,
    charset: Charset,
}

impl ResponseReader {
    /// Wraps a response body. When `do_input` is false the body is released
    /// unread and every terminal read yields an empty result.
    pub(crate) fn new(
        status: http::StatusCode,
        headers: http::HeaderMap,
        body: Box<dyn Read + Send>,
        charset: Charset,
        do_input: bool,
    ) -> Self {
        let stream = if do_input {
            ResponseStream::new(body)
        } else {
            drop(body);
            ResponseStream::empty()
        };

        tracing::debug!(
            status = status.as_u16(),
            stream = ?StreamKind::for_status(status),
            "Response received"
        );

        Self {
            status,
            headers,
            stream,
            charset,
        }
    }

    /// Returns the status code.
    #[must_use]
    pub const fn status(&self) -> http::StatusCode {
        self.status
    }

    /// Returns the response headers.
    #[must_use]
    pub const fn headers(&self) -> &http::HeaderMap {
        &self.headers
    }

    /// Returns the character set used to decode text.
    #[must_use]
    pub const fn charset(&self) -> &Charset {
        &self.charset
    }

    /// Returns which stream was selected.
    #[must_use]
    pub const fn stream_kind(&self) -> StreamKind {
        StreamKind::for_status(self.status)
    }

    /// Returns true if the success stream was selected.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.stream_kind(), StreamKind::Success)
    }

    /// Drains the selected stream as raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Io`] if reading fails.
    pub fn bytes(mut self) -> Result<Vec<u8>, RequestError> {
        let mut bytes = Vec::new();
        self.stream.read_to_end(&mut bytes)?;
        Ok(bytes)
    }

    /// Decodes the selected stream and joins its lines, dropping line breaks.
    ///
    /// `\n`, `\r\n` and a lone `\r` all end a line.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Io`] if reading fails or the text is malformed.
    pub fn text(self) -> Result<String, RequestError> {
        let bytes = self.bytes()?;
        let text = String::from_utf8(bytes)
            .map_err(|e| RequestError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))?;

        Ok(text.replace(['\r', '\n'], ""))
    }

    /// Decodes the selected stream as JSON into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Io`] if reading fails or the body is not valid `T`.
    pub fn json<T: DeserializeOwned>(self) -> Result<T, RequestError> {
        let bytes = self.bytes()?;
        serde_json::from_slice(&bytes)
            .map_err(|e| RequestError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
    }

    /// Hands over the selected stream unread.
    #[must_use]
    pub fn into_stream(self) -> ResponseStream {
        self.stream
    }
}
