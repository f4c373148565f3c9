//! TOML configuration file parsing.
//!
//! Defines the structure of the configuration file with serde.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use super::ConfigError;

/// Root configuration structure from TOML file.
///
/// All fields are optional to allow partial configuration
/// that can be merged with CLI arguments.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Request target and content
    #[serde(default)]
    pub request: RequestSection,

    /// Connect and read timeouts
    #[serde(default)]
    pub timeouts: TimeoutsSection,

    /// Trust policy for https targets
    #[serde(default)]
    pub tls: TlsSection,

    /// Connection behavior
    #[serde(default)]
    pub transport: TransportSection,
}

/// Request configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestSection {
    /// Target URL
    pub url: Option<String>,

    /// Scheme prefixed to a URL without one: "http" or "https"
    pub protocol: Option<String>,

    /// HTTP method (default: GET)
    pub method: Option<String>,

    /// Body encoding: "form", "json", "octet-stream" or "multipart"
    pub content_type: Option<String>,

    /// Character set label (default: utf8)
    pub charset: Option<String>,

    /// User-Agent request property
    pub user_agent: Option<String>,

    /// JSON payload text
    pub json: Option<String>,

    /// File whose bytes are the octet-stream payload
    pub body_file: Option<String>,

    /// Request parameters; values keep their TOML type
    #[serde(default)]
    pub params: BTreeMap<String, serde_json::Value>,

    /// Multipart file parts as field = path
    #[serde(default)]
    pub files: BTreeMap<String, String>,

    /// HTTP header fields
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Request properties, applied before header fields
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

/// Timeout configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimeoutsSection {
    /// Connect timeout in milliseconds
    pub connect_ms: Option<u64>,

    /// Read timeout in milliseconds
    pub read_ms: Option<u64>,
}

/// TLS configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TlsSection {
    /// Validate certificate chains
    pub verify_certificates: Option<bool>,

    /// Check the hostname against the certificate
    pub verify_hostnames: Option<bool>,

    /// Extra PEM root certificates
    #[serde(default)]
    pub ca_certs: Vec<String>,

    /// PEM bundle with client key and certificate chain
    pub identity: Option<String>,

    /// Minimum TLS version: "1.2" or "1.3"
    pub min_version: Option<String>,
}

/// Transport configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransportSection {
    /// Proxy URL
    pub proxy: Option<String>,

    /// Follow redirects
    pub follow_redirects: Option<bool>,

    /// Allow caches to answer
    pub use_cache: Option<bool>,

    /// Read the response body
    pub do_input: Option<bool>,

    /// Write a request body
    pub do_output: Option<bool>,
}

impl TomlConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }
}

/// Generates a default configuration file with comments.
#[must_use]
pub fn default_config_template() -> String {
    r#"# restkit configuration file

[request]
# Target URL (required); a URL without scheme gets the protocol prefix
# url = "localhost:8090/api/test"

# Scheme for URLs without one: "http" or "https" (default: https)
# protocol = "http"

# HTTP method (default: GET). GET sends params in the query string,
# every other method writes a body.
# method = "POST"

# Body encoding: "form", "json", "octet-stream" or "multipart" (default: form)
# content_type = "json"

# Character set (default: utf8, the only supported family)
# charset = "utf8"

# user_agent = "restkit"

# JSON payload; params are merged into an object payload
# json = '{"one": 1}'

# Octet-stream payload read from a file
# body_file = "~/payload.bin"

# Parameters keep their TOML type in JSON bodies
# [request.params]
# one = 1
# two = "2"

# Multipart file parts, field = path
# [request.files]
# filea = "~/a.txt"

# Header fields win over properties with the same name
# [request.headers]
# X-Api-Key = "secret"

# [request.properties]
# Accept = "application/json"

[timeouts]
# Milliseconds (default: 70000)
# connect_ms = 70000
# read_ms = 70000

[tls]
# Certificates and hostnames are NOT verified by default
# verify_certificates = true
# verify_hostnames = true
# ca_certs = ["~/certs/root.pem"]
# identity = "~/certs/client.pem"
# min_version = "1.2"

[transport]
# proxy = "http://proxy.internal:3128"
# follow_redirects = false
# use_cache = false
# do_input = true
# do_output = true
"#
    .to_string()
}
