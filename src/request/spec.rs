//! The mutable request builder shared by both role views.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use super::{
    Charset, ContentType, GetRequest, HttpMethod, ParamValue, Payload, PostRequest, Protocol,
    TrustPolicy,
};

/// Name of the request property holding the user agent.
pub const USER_AGENT: &str = "User-Agent";

/// Name of the request property holding the declared content type.
pub const CONTENT_TYPE: &str = "Content-Type";

/// How the `filename` of a multipart file part is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilenameSource {
    /// Reuse the form field name as the filename.
    #[default]
    FieldName,
    /// Use the final component of the file's path, falling back to the field name.
    Path,
}

/// Configuration of a single outbound request.
///
/// Setters consume and return the same value, so a spec is configured in one
/// chain and then turned into a role view with [`RequestSpec::as_get`] or
/// [`RequestSpec::as_post`]. The role view is consumed by its terminal send,
/// so a spec can never be sent twice.
///
/// # Example
///
/// ```no_run
/// use restkit::request::{ContentType, Dispatch, RequestSpec};
///
/// # fn example() -> Result<(), restkit::request::RequestError> {
/// let text = RequestSpec::new("http://localhost:8090/api/testapplicationjson")
///     .with_header("x-api-key", "secret")
///     .as_post()
///     .content_type(ContentType::Json)
///     .add_param("one", 1)
///     .add_param("two", "2")
///     .response_text()?;
/// println!("{text}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
#[allow(clippy::struct_excessive_bools)] // connection flags are naturally boolean
pub struct RequestSpec {
    pub(crate) url: String,
    pub(crate) method: HttpMethod,
    pub(crate) content_type: ContentType,
    pub(crate) charset: Charset,
    pub(crate) connect_timeout: Duration,
    pub(crate) read_timeout: Duration,
    pub(crate) headers: BTreeMap<String, String>,
    pub(crate) properties: BTreeMap<String, String>,
    pub(crate) params: BTreeMap<String, ParamValue>,
    pub(crate) files: BTreeMap<String, PathBuf>,
    pub(crate) filename_source: FilenameSource,
    pub(crate) payload: Option<Payload>,
    pub(crate) proxy: Option<String>,
    pub(crate) trust: TrustPolicy,
    pub(crate) do_input: bool,
    pub(crate) do_output: bool,
    pub(crate) use_cache: bool,
    pub(crate) follow_redirects: bool,
}

impl RequestSpec {
    /// Default connect timeout (70 seconds).
    pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(70);

    /// Default read timeout (70 seconds).
    pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(70);

    /// Default `User-Agent` request property.
    pub const DEFAULT_USER_AGENT: &'static str = concat!("restkit/", env!("CARGO_PKG_VERSION"));

    /// Creates a spec for `url`.
    ///
    /// A URL starting with `http` (case-insensitive) is kept as is; any other
    /// URL is prefixed with `https://`.
    #[must_use]
    pub fn new(url: &str) -> Self {
        Self::with_protocol(Protocol::Https, url)
    }

    /// Creates a spec for `url`, prefixing `protocol` when the URL has no scheme.
    #[must_use]
    pub fn with_protocol(protocol: Protocol, url: &str) -> Self {
        Self::with_charset(protocol, url, Charset::default())
    }

    /// Creates a spec with an explicit protocol and character set.
    #[must_use]
    pub fn with_charset(protocol: Protocol, url: &str, charset: Charset) -> Self {
        let mut properties = BTreeMap::new();
        properties.insert(USER_AGENT.to_string(), Self::DEFAULT_USER_AGENT.to_string());

        Self {
            url: protocol.apply(url),
            method: HttpMethod::Get,
            content_type: ContentType::Form,
            charset,
            connect_timeout: Self::DEFAULT_CONNECT_TIMEOUT,
            read_timeout: Self::DEFAULT_READ_TIMEOUT,
            headers: BTreeMap::new(),
            properties,
            params: BTreeMap::new(),
            files: BTreeMap::new(),
            filename_source: FilenameSource::default(),
            payload: None,
            proxy: None,
            trust: TrustPolicy::default(),
            do_input: true,
            do_output: true,
            use_cache: false,
            follow_redirects: false,
        }
    }

    /// Turns this spec into a GET role view.
    #[must_use]
    pub fn as_get(self) -> GetRequest {
        self.as_get_with(HttpMethod::Get)
    }

    /// Turns this spec into a GET-like role view sent with `method`.
    #[must_use]
    pub fn as_get_with(mut self, method: HttpMethod) -> GetRequest {
        self.method = method;
        GetRequest::new(self)
    }

    /// Turns this spec into a POST role view.
    #[must_use]
    pub fn as_post(self) -> PostRequest {
        self.as_post_with(HttpMethod::Post)
    }

    /// Turns this spec into a POST-like role view sent with `method`.
    #[must_use]
    pub fn as_post_with(mut self, method: HttpMethod) -> PostRequest {
        self.method = method;
        PostRequest::new(self)
    }

    /// Sets the character set used for text bodies and text responses.
    #[must_use]
    pub fn with_charset_label(mut self, label: impl Into<String>) -> Self {
        self.charset = Charset::new(label);
        self
    }

    /// Sets the connect timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the read timeout.
    #[must_use]
    pub const fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Replaces the `User-Agent` request property.
    #[must_use]
    pub fn with_user_agent(self, user_agent: impl Into<String>) -> Self {
        self.with_property(USER_AGENT, user_agent)
    }

    /// Adds a header field. An existing field with the same name is replaced.
    ///
    /// Header fields are applied after request properties, so they win on
    /// identical names. Blank values are skipped when sending.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Adds a request property. An existing property with the same name is replaced.
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Routes the request through a proxy, e.g. `http://proxy.internal:8080`.
    #[must_use]
    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Sets the trust policy used when the URL is `https`.
    #[must_use]
    pub fn with_trust_policy(mut self, trust: TrustPolicy) -> Self {
        self.trust = trust;
        self
    }

    /// Whether the response body is read. When false, terminal reads yield nothing.
    #[must_use]
    pub const fn with_do_input(mut self, do_input: bool) -> Self {
        self.do_input = do_input;
        self
    }

    /// Whether a request body is written for non-GET methods.
    #[must_use]
    pub const fn with_do_output(mut self, do_output: bool) -> Self {
        self.do_output = do_output;
        self
    }

    /// Whether caches may answer the request. When false, `Cache-Control: no-cache`
    /// is sent unless a header or property sets it.
    #[must_use]
    pub const fn with_use_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    /// Whether redirects are followed.
    #[must_use]
    pub const fn with_follow_redirects(mut self, follow: bool) -> Self {
        self.follow_redirects = follow;
        self
    }

    /// Returns the absolute target URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the HTTP method.
    #[must_use]
    pub const fn method(&self) -> HttpMethod {
        self.method
    }

    /// Returns the declared content type.
    #[must_use]
    pub const fn content_type(&self) -> ContentType {
        self.content_type
    }

    /// Returns the character set.
    #[must_use]
    pub const fn charset(&self) -> &Charset {
        &self.charset
    }

    /// Returns the connect timeout.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Returns the read timeout.
    #[must_use]
    pub const fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    /// Returns the header fields.
    #[must_use]
    pub const fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Returns the request properties.
    #[must_use]
    pub const fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    /// Returns the scalar parameters.
    #[must_use]
    pub const fn params(&self) -> &BTreeMap<String, ParamValue> {
        &self.params
    }

    /// Returns the file parts, keyed by form field name.
    #[must_use]
    pub const fn files(&self) -> &BTreeMap<String, PathBuf> {
        &self.files
    }

    /// Returns the raw payload, if any.
    #[must_use]
    pub const fn payload(&self) -> Option<&Payload> {
        self.payload.as_ref()
    }

    /// Returns the proxy URL, if any.
    #[must_use]
    pub fn proxy(&self) -> Option<&str> {
        self.proxy.as_deref()
    }

    /// Returns the trust policy.
    #[must_use]
    pub const fn trust_policy(&self) -> &TrustPolicy {
        &self.trust
    }

    pub(crate) fn insert_param(&mut self, key: String, value: ParamValue) {
        self.params.insert(key, value);
    }

    pub(crate) fn set_content_type(&mut self, content_type: ContentType) {
        self.content_type = content_type;
        self.properties
            .insert(CONTENT_TYPE.to_string(), content_type.code().to_string());
    }
}
