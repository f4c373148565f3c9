//! HTTP method and URL scheme types.

use std::fmt;
use std::str::FromStr;

/// The HTTP methods a request can be sent with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HttpMethod {
    /// Read
    #[default]
    Get,
    /// Create or replace
    Post,
    /// Update or replace
    Put,
    /// Delete
    Delete,
    /// Partial update
    Patch,
}

impl HttpMethod {
    /// Returns the method token as written on the request line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
        }
    }

    /// Returns true if parameters travel in the query string instead of a body.
    #[must_use]
    pub const fn uses_query_string(self) -> bool {
        matches!(self, Self::Get)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            "PATCH" => Ok(Self::Patch),
            _ => Err(s.to_string()),
        }
    }
}

impl From<HttpMethod> for http::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Self::GET,
            HttpMethod::Post => Self::POST,
            HttpMethod::Put => Self::PUT,
            HttpMethod::Delete => Self::DELETE,
            HttpMethod::Patch => Self::PATCH,
        }
    }
}

/// URL scheme used when the target URL does not carry one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Protocol {
    /// Plain HTTP
    Http,
    /// HTTP over TLS
    #[default]
    Https,
}

impl Protocol {
    /// Returns the scheme name.
    #[must_use]
    pub const fn scheme(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }

    /// Prefixes `url` with this scheme unless it already starts with `http`
    /// (case-insensitive). Surrounding whitespace is trimmed.
    #[must_use]
    pub fn apply(self, url: &str) -> String {
        let trimmed = url.trim();
        if has_http_prefix(trimmed) {
            trimmed.to_string()
        } else {
            format!("{}://{trimmed}", self.scheme())
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.scheme())
    }
}

impl FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "https" => Ok(Self::Https),
            _ => Err(s.to_string()),
        }
    }
}

fn has_http_prefix(url: &str) -> bool {
    url.get(..4)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("http"))
}
