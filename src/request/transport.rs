//! Connection handling: preparing a request and exchanging it over the wire.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;
use std::time::Duration;

use http::header::{CACHE_CONTROL, CONTENT_TYPE, HeaderName, HeaderValue};
use http::{HeaderMap, StatusCode};
use reqwest::blocking::{Client, ClientBuilder};
use reqwest::redirect;
use url::Url;

use super::encoder::query_string;
use super::{BodyEncoder, ContentType, ParamValue, RequestError, RequestSpec, ResponseReader, TrustPolicy};

/// Connection-level settings for one send.
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    /// Maximum time to establish the connection
    pub connect_timeout: Duration,
    /// Maximum time to wait on reads and writes
    pub read_timeout: Duration,
    /// Whether redirects are followed
    pub follow_redirects: bool,
    /// Proxy URL, if any
    pub proxy: Option<String>,
    /// Trust material, applied only to `https` URLs
    pub trust: TrustPolicy,
}

/// A request with its effective URL, final headers and encoded body.
///
/// Built from a [`RequestSpec`] right before sending. For GET the parameters
/// are already in the URL and there is no body.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    /// HTTP method
    pub method: http::Method,
    /// Effective URL (including the query string for GET)
    pub url: Url,
    /// Headers to send
    pub headers: HeaderMap,
    /// Body bytes, if the method writes one
    pub body: Option<Vec<u8>>,
    /// Connection settings
    pub options: ConnectOptions,
}

impl PreparedRequest {
    /// Resolves the effective URL, headers and body of `spec`.
    ///
    /// Request properties are applied before header fields, so a header field
    /// wins over a property of the same name. Blank values are skipped. A
    /// multipart body always sets its own `Content-Type` carrying the boundary.
    ///
    /// # Errors
    ///
    /// Returns a usage error for an unsupported charset, an unparsable URL or
    /// an invalid header; otherwise any error of [`BodyEncoder::encode`].
    pub fn from_spec(spec: &RequestSpec) -> Result<Self, RequestError> {
        spec.charset.ensure_supported()?;

        let (target, body) = if spec.method.uses_query_string() {
            if spec.payload.is_some() || !spec.files.is_empty() {
                tracing::warn!(method = %spec.method, "Payload and file parts are not sent with this method");
            }
            (with_query(&spec.url, &spec.params), None)
        } else if spec.do_output {
            (spec.url.clone(), Some(BodyEncoder::new(spec).encode()?))
        } else {
            (spec.url.clone(), None)
        };

        let url = Url::parse(&target).map_err(|e| RequestError::InvalidUrl {
            url: target.clone(),
            reason: e.to_string(),
        })?;

        let mut headers = base_headers(spec)?;
        if let Some(encoded) = &body {
            let forced = spec.content_type == ContentType::Multipart;
            if forced || !headers.contains_key(CONTENT_TYPE) {
                headers.insert(CONTENT_TYPE, header_value("Content-Type", &encoded.content_type)?);
            }
        }

        Ok(Self {
            method: spec.method.into(),
            url,
            headers,
            body: body.map(|encoded| encoded.bytes),
            options: ConnectOptions {
                connect_timeout: spec.connect_timeout,
                read_timeout: spec.read_timeout,
                follow_redirects: spec.follow_redirects,
                proxy: spec.proxy.clone(),
                trust: spec.trust.clone(),
            },
        })
    }

    /// Returns true if the effective URL is secure.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.url.scheme() == "https"
    }
}

/// A response as delivered by a [`Transport`], body still unread.
pub struct RawResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// The body stream; dropping it releases the connection
    pub body: Box<dyn Read + Send>,
}

impl RawResponse {
    /// Creates a raw response.
    #[must_use]
    pub const fn new(status: StatusCode, headers: HeaderMap, body: Box<dyn Read + Send>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }
}

impl fmt::Debug for RawResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Trait for exchanging one prepared request over a connection.
///
/// # Design
///
/// This trait abstracts the HTTP library, enabling:
/// - Dependency injection for testing with recording transports
/// - Byte-exact inspection of what would go on the wire
///
/// Implementations open one connection per call and must not retry.
pub trait Transport {
    /// Sends `request` and returns the response with its body unread.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError`] when:
    /// - Network connection fails ([`RequestError::Connection`])
    /// - The connect or read timeout elapses ([`RequestError::Timeout`])
    /// - Trust material is invalid ([`RequestError::Tls`])
    fn execute(&self, request: PreparedRequest) -> Result<RawResponse, RequestError>;
}

/// Production transport using reqwest's blocking client.
///
/// A fresh client is built for every request, so its timeouts, proxy,
/// redirect policy and trust policy are scoped to that one connection.
/// Nothing is pooled or shared between sends.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReqwestTransport;

impl ReqwestTransport {
    /// Creates the transport.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn client_for(request: &PreparedRequest) -> Result<Client, RequestError> {
        let options = &request.options;
        let redirects = if options.follow_redirects {
            redirect::Policy::default()
        } else {
            redirect::Policy::none()
        };

        let mut builder: ClientBuilder = Client::builder()
            .connect_timeout(options.connect_timeout)
            .timeout(options.read_timeout)
            .redirect(redirects);

        builder = match &options.proxy {
            Some(proxy) => {
                let proxy = reqwest::Proxy::all(proxy.as_str())
                    .map_err(|e| RequestError::usage(format!("invalid proxy '{proxy}': {e}")))?;
                builder.proxy(proxy)
            }
            None => builder.no_proxy(),
        };

        if request.is_secure() {
            builder = options.trust.apply(builder)?;
        }

        builder
            .build()
            .map_err(|e| RequestError::Tls(format!("cannot initialize client: {e}")))
    }
}

impl Transport for ReqwestTransport {
    fn execute(&self, request: PreparedRequest) -> Result<RawResponse, RequestError> {
        let client = Self::client_for(&request)?;

        let mut builder = client
            .request(request.method, request.url)
            .headers(request.headers);

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().map_err(|e| {
            if e.is_timeout() {
                RequestError::Timeout
            } else if e.is_builder() {
                RequestError::InvalidUrl {
                    url: e.url().map(ToString::to_string).unwrap_or_default(),
                    reason: e.to_string(),
                }
            } else {
                RequestError::Connection(Box::new(e))
            }
        })?;

        let status = response.status();
        let headers = response.headers().clone();

        Ok(RawResponse::new(status, headers, Box::new(response)))
    }
}

/// Prepares `spec`, hands it to `transport` and wraps the selected response stream.
pub(crate) fn send<T: Transport + ?Sized>(
    spec: RequestSpec,
    transport: &T,
) -> Result<ResponseReader, RequestError> {
    let request = PreparedRequest::from_spec(&spec)?;

    tracing::debug!(
        method = %request.method,
        url = %request.url,
        content_type = %spec.content_type,
        body_len = request.body.as_ref().map_or(0, Vec::len),
        "Sending request"
    );

    let response = transport.execute(request)?;

    Ok(ResponseReader::new(
        response.status,
        response.headers,
        response.body,
        spec.charset,
        spec.do_input,
    ))
}

/// Appends the encoded parameters to `url`. No `?` is added when there are none.
fn with_query(url: &str, params: &BTreeMap<String, ParamValue>) -> String {
    let query = query_string(params);
    if query.is_empty() {
        return url.to_string();
    }

    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}{query}")
}

fn base_headers(spec: &RequestSpec) -> Result<HeaderMap, RequestError> {
    let mut headers = HeaderMap::new();

    if !spec.use_cache {
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    }

    for (name, value) in spec.properties.iter().chain(spec.headers.iter()) {
        if value.trim().is_empty() {
            continue;
        }
        let header_name = name
            .parse::<HeaderName>()
            .map_err(|e| RequestError::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        headers.insert(header_name, header_value(name, value)?);
    }

    Ok(headers)
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, RequestError> {
    HeaderValue::from_str(value).map_err(|e| RequestError::InvalidHeader {
        name: name.to_string(),
        reason: e.to_string(),
    })
}
