//! Capability-scoped role views over a [`RequestSpec`].
//!
//! A [`GetRequest`] can only accumulate parameters. A [`PostRequest`] can also
//! attach files and a raw payload and select the content type. Both share the
//! terminal operations of [`Dispatch`], which consume the view.

use std::collections::BTreeMap;
use std::path::PathBuf;

use super::{
    ContentType, FilenameSource, ParamValue, Payload, RequestError, RequestSpec,
    ReqwestTransport, ResponseReader, ResponseStream, Transport,
};

/// Terminal operations shared by both role views.
///
/// Each operation sends the request exactly once and consumes the view.
pub trait Dispatch: Sized {
    /// Gives up the role view and returns the underlying spec.
    fn into_spec(self) -> RequestSpec;

    /// Sends the request through `transport` and returns the selected response stream.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError`] if the request cannot be encoded or the
    /// transport fails. A non-2xx status is not an error.
    fn send_with<T: Transport + ?Sized>(self, transport: &T) -> Result<ResponseReader, RequestError> {
        super::transport::send(self.into_spec(), transport)
    }

    /// Sends the request over a fresh connection.
    ///
    /// # Errors
    ///
    /// See [`Dispatch::send_with`].
    fn send(self) -> Result<ResponseReader, RequestError> {
        self.send_with(&ReqwestTransport::new())
    }

    /// Sends the request and drains the selected stream as raw bytes.
    ///
    /// # Errors
    ///
    /// See [`Dispatch::send_with`]; also fails if draining the response fails.
    fn response_bytes(self) -> Result<Vec<u8>, RequestError> {
        self.send()?.bytes()
    }

    /// Sends the request and decodes the selected stream as text, with line
    /// breaks dropped.
    ///
    /// # Errors
    ///
    /// See [`Dispatch::send_with`]; also fails if the body is not valid text.
    fn response_text(self) -> Result<String, RequestError> {
        self.send()?.text()
    }

    /// Sends the request and hands over the selected stream unread.
    ///
    /// The connection is released when the returned stream is dropped.
    ///
    /// # Errors
    ///
    /// See [`Dispatch::send_with`].
    fn response_stream(self) -> Result<ResponseStream, RequestError> {
        Ok(self.send()?.into_stream())
    }
}

/// Role view for requests whose parameters travel in the query string.
#[derive(Debug, Clone)]
pub struct GetRequest {
    spec: RequestSpec,
}

impl GetRequest {
    pub(crate) const fn new(spec: RequestSpec) -> Self {
        Self { spec }
    }

    /// Adds a parameter. An existing parameter with the same key is replaced.
    #[must_use]
    pub fn add_param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.spec.insert_param(key.into(), value.into());
        self
    }

    /// Adds every entry of `params`, replacing existing keys.
    #[must_use]
    pub fn add_params<K, V>(mut self, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<ParamValue>,
    {
        for (key, value) in params {
            self.spec.insert_param(key.into(), value.into());
        }
        self
    }

    /// Returns the parameters accumulated so far.
    #[must_use]
    pub const fn params(&self) -> &BTreeMap<String, ParamValue> {
        self.spec.params()
    }
}

impl Dispatch for GetRequest {
    fn into_spec(self) -> RequestSpec {
        self.spec
    }
}

/// Role view for requests that write a body.
#[derive(Debug, Clone)]
pub struct PostRequest {
    spec: RequestSpec,
}

impl PostRequest {
    pub(crate) const fn new(spec: RequestSpec) -> Self {
        Self { spec }
    }

    /// Adds a parameter. An existing parameter with the same key is replaced.
    #[must_use]
    pub fn add_param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.spec.insert_param(key.into(), value.into());
        self
    }

    /// Adds every entry of `params`, replacing existing keys.
    #[must_use]
    pub fn add_params<K, V>(mut self, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<ParamValue>,
    {
        for (key, value) in params {
            self.spec.insert_param(key.into(), value.into());
        }
        self
    }

    /// Attaches a file part under form field `name`. An existing part with the
    /// same name is replaced. Only sent with [`ContentType::Multipart`].
    #[must_use]
    pub fn add_file_part(mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.spec.files.insert(name.into(), path.into());
        self
    }

    /// Chooses how multipart file parts are named.
    #[must_use]
    pub const fn filename_source(mut self, source: FilenameSource) -> Self {
        self.spec.filename_source = source;
        self
    }

    /// Sets the raw payload used by the JSON and octet-stream encodings.
    #[must_use]
    pub fn payload(mut self, payload: impl Into<Payload>) -> Self {
        self.spec.payload = Some(payload.into());
        self
    }

    /// Serializes `value` into the JSON payload.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Encoding`] if `value` cannot be represented as JSON.
    pub fn json_payload<T: serde::Serialize + ?Sized>(self, value: &T) -> Result<Self, RequestError> {
        Ok(self.payload(Payload::json(value)?))
    }

    /// Selects the body encoding. `None` leaves the current choice untouched,
    /// which keeps conditional chains simple.
    #[must_use]
    pub fn content_type(mut self, content_type: impl Into<Option<ContentType>>) -> Self {
        if let Some(content_type) = content_type.into() {
            self.spec.set_content_type(content_type);
        }
        self
    }

    /// Returns the spec configured so far.
    #[must_use]
    pub const fn spec(&self) -> &RequestSpec {
        &self.spec
    }
}

impl Dispatch for PostRequest {
    fn into_spec(self) -> RequestSpec {
        self.spec
    }
}
