//! Validated configuration after merging CLI and TOML sources.
//!
//! This module contains the final, validated configuration that is used
//! by the application. All validation is performed during construction.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use http::header::{HeaderName, HeaderValue};
use url::Url;

use crate::request::{
    Charset, ContentType, HttpMethod, ParamValue, Payload, Protocol, RequestSpec, TlsVersion,
    TrustPolicy,
};

use super::cli::Cli;
use super::defaults;
use super::error::{ConfigError, field};
use super::toml::TomlConfig;

/// Fully validated configuration ready for use by the application.
///
/// This struct represents a complete, validated configuration where all
/// required fields are present, every referenced file has been read and all
/// values have been validated.
///
/// # Construction
///
/// Use [`ValidatedConfig::from_raw`] to create from CLI args and optional TOML config.
/// The function validates all inputs and returns errors for invalid configurations.
#[derive(Debug)]
#[allow(clippy::struct_excessive_bools)] // connection flags are naturally boolean
pub struct ValidatedConfig {
    /// Absolute target URL
    pub url: String,

    /// Scheme used for the target URL
    pub protocol: Protocol,

    /// HTTP method
    pub method: HttpMethod,

    /// Body encoding for non-GET methods
    pub content_type: ContentType,

    /// Character set
    pub charset: Charset,

    /// User-Agent override
    pub user_agent: Option<String>,

    /// Request parameters
    pub params: BTreeMap<String, ParamValue>,

    /// Multipart file parts
    pub files: BTreeMap<String, PathBuf>,

    /// Header fields
    pub headers: BTreeMap<String, String>,

    /// Request properties
    pub properties: BTreeMap<String, String>,

    /// Raw payload for json and octet-stream bodies
    pub payload: Option<Payload>,

    /// Connect timeout
    pub connect_timeout: Duration,

    /// Read timeout
    pub read_timeout: Duration,

    /// Proxy URL
    pub proxy: Option<String>,

    /// Trust policy for https targets
    pub trust: TrustPolicy,

    /// Whether redirects are followed
    pub follow_redirects: bool,

    /// Whether caches may answer
    pub use_cache: bool,

    /// Whether the response body is read
    pub do_input: bool,

    /// Whether a request body is written
    pub do_output: bool,

    /// Where the response body goes; stdout if `None`
    pub output: Option<PathBuf>,

    /// Verbose logging enabled
    pub verbose: bool,
}

impl fmt::Display for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let proxy_str = self.proxy.as_deref().unwrap_or("none");

        write!(
            f,
            "Config {{ {} {}, content_type: {}, params: {}, files: {}, headers: {}, \
             timeouts: {}ms/{}ms, verify_certificates: {}, proxy: {} }}",
            self.method,
            self.url,
            self.content_type,
            self.params.len(),
            self.files.len(),
            self.headers.len() + self.properties.len(),
            self.connect_timeout.as_millis(),
            self.read_timeout.as_millis(),
            self.trust.verifies_certificates(),
            proxy_str,
        )
    }
}

impl ValidatedConfig {
    /// Creates a validated configuration from CLI arguments and optional TOML config.
    ///
    /// CLI arguments take precedence over TOML config values.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The URL is missing or invalid
    /// - The method, protocol, content type, charset or TLS version is unknown
    /// - A timeout is zero
    /// - A header, parameter or file entry is malformed
    /// - The JSON payload does not parse
    /// - A referenced file cannot be read
    pub fn from_raw(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Self, ConfigError> {
        let protocol = Self::resolve_protocol(cli, toml)?;
        let url = Self::resolve_url(cli, toml, protocol)?;
        let method = Self::resolve_method(cli, toml)?;
        let content_type = Self::resolve_content_type(cli, toml)?;
        let charset = Self::resolve_charset(cli, toml)?;

        let user_agent = cli
            .user_agent
            .clone()
            .or_else(|| toml.and_then(|t| t.request.user_agent.clone()));

        let params = Self::resolve_params(cli, toml)?;
        let files = Self::resolve_files(cli, toml)?;
        let headers = Self::resolve_fields(&cli.headers, toml.map(|t| &t.request.headers))?;
        let properties =
            Self::resolve_fields(&cli.properties, toml.map(|t| &t.request.properties))?;
        let payload = Self::resolve_payload(cli, toml)?;

        let (connect_timeout, read_timeout) = Self::resolve_timeouts(cli, toml)?;
        let trust = Self::build_trust_policy(cli, toml)?;

        let transport = toml.map(|t| &t.transport);
        let proxy = cli
            .proxy
            .clone()
            .or_else(|| transport.and_then(|t| t.proxy.clone()));

        // Flags only enable; a TOML `true` cannot be turned off from the CLI
        let follow_redirects = cli.follow_redirects
            || transport
                .and_then(|t| t.follow_redirects)
                .unwrap_or(defaults::FOLLOW_REDIRECTS);
        let use_cache =
            cli.use_cache || transport.and_then(|t| t.use_cache).unwrap_or(defaults::USE_CACHE);
        let do_input =
            !cli.no_input && transport.and_then(|t| t.do_input).unwrap_or(defaults::DO_INPUT);
        let do_output =
            !cli.no_output && transport.and_then(|t| t.do_output).unwrap_or(defaults::DO_OUTPUT);

        Ok(Self {
            url,
            protocol,
            method,
            content_type,
            charset,
            user_agent,
            params,
            files,
            headers,
            properties,
            payload,
            connect_timeout,
            read_timeout,
            proxy,
            trust,
            follow_redirects,
            use_cache,
            do_input,
            do_output,
            output: cli.output.as_deref().map(expand_home),
            verbose: cli.verbose,
        })
    }

    /// Loads and merges configuration from CLI and optional config file.
    ///
    /// If `cli.config` is set, loads the TOML file from that path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file cannot be read or parsed
    /// - The merged configuration is invalid
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let toml = cli
            .config
            .as_deref()
            .map(|path| TomlConfig::load(&expand_home(path)))
            .transpose()?;

        Self::from_raw(cli, toml.as_ref())
    }

    /// Builds the request spec carrying every connection-level setting.
    ///
    /// Parameters, file parts, payload and content type belong to the role
    /// view and are applied by the caller after choosing it.
    #[must_use]
    pub fn to_spec(&self) -> RequestSpec {
        let mut spec = RequestSpec::with_charset(self.protocol, &self.url, self.charset.clone())
            .with_connect_timeout(self.connect_timeout)
            .with_read_timeout(self.read_timeout)
            .with_trust_policy(self.trust.clone())
            .with_follow_redirects(self.follow_redirects)
            .with_use_cache(self.use_cache)
            .with_do_input(self.do_input)
            .with_do_output(self.do_output);

        if let Some(ref user_agent) = self.user_agent {
            spec = spec.with_user_agent(user_agent.clone());
        }
        if let Some(ref proxy) = self.proxy {
            spec = spec.with_proxy(proxy.clone());
        }
        for (name, value) in &self.properties {
            spec = spec.with_property(name.clone(), value.clone());
        }
        for (name, value) in &self.headers {
            spec = spec.with_header(name.clone(), value.clone());
        }

        spec
    }

    fn resolve_protocol(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Protocol, ConfigError> {
        if let Some(protocol) = cli.protocol {
            return Ok(protocol.into());
        }

        toml.and_then(|t| t.request.protocol.as_deref())
            .map_or(Ok(Protocol::default()), |s| {
                s.parse::<Protocol>().map_err(ConfigError::InvalidProtocol)
            })
    }

    fn resolve_url(
        cli: &Cli,
        toml: Option<&TomlConfig>,
        protocol: Protocol,
    ) -> Result<String, ConfigError> {
        // CLI takes precedence
        let url_str = cli
            .url
            .as_deref()
            .or_else(|| toml.and_then(|t| t.request.url.as_deref()))
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::missing(
                field::URL,
                "Use --url or set request.url in config file",
            ))?;

        let url = protocol.apply(url_str);
        Url::parse(&url).map_err(|e| ConfigError::InvalidUrl {
            url: url.clone(),
            reason: e.to_string(),
        })?;

        Ok(url)
    }

    fn resolve_method(cli: &Cli, toml: Option<&TomlConfig>) -> Result<HttpMethod, ConfigError> {
        // Priority: CLI explicit > TOML > default
        let method_str = cli
            .method
            .as_deref()
            .or_else(|| toml.and_then(|t| t.request.method.as_deref()))
            .unwrap_or(defaults::METHOD);

        method_str
            .parse::<HttpMethod>()
            .map_err(ConfigError::InvalidMethod)
    }

    fn resolve_content_type(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<ContentType, ConfigError> {
        if let Some(content_type) = cli.content_type {
            return Ok(content_type.into());
        }

        toml.and_then(|t| t.request.content_type.as_deref())
            .unwrap_or(defaults::CONTENT_TYPE)
            .parse::<ContentType>()
            .map_err(ConfigError::InvalidContentType)
    }

    fn resolve_charset(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Charset, ConfigError> {
        let label = cli
            .charset
            .as_deref()
            .or_else(|| toml.and_then(|t| t.request.charset.as_deref()))
            .unwrap_or(defaults::CHARSET);

        let charset = Charset::new(label);
        if charset.is_utf8() {
            Ok(charset)
        } else {
            Err(ConfigError::InvalidCharset(label.to_string()))
        }
    }

    fn resolve_params(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<BTreeMap<String, ParamValue>, ConfigError> {
        let mut params = BTreeMap::new();

        // Add TOML params first (CLI can override)
        if let Some(toml) = toml {
            for (key, value) in &toml.request.params {
                if value.is_null() || value.is_array() || value.is_object() {
                    return Err(ConfigError::InvalidEntry {
                        kind: "param",
                        value: key.clone(),
                        reason: "value must be a string, number or boolean",
                    });
                }
                params.insert(key.clone(), ParamValue::from(value.clone()));
            }
        }

        for entry in &cli.params {
            let (key, value) = parse_entry("param", entry)?;
            params.insert(key, ParamValue::from(value));
        }

        Ok(params)
    }

    fn resolve_files(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<BTreeMap<String, PathBuf>, ConfigError> {
        let mut files = BTreeMap::new();

        if let Some(toml) = toml {
            for (field, path) in &toml.request.files {
                files.insert(field.clone(), expand_home(Path::new(path)));
            }
        }

        for entry in &cli.files {
            let (field, path) = parse_entry("file", entry)?;
            files.insert(field, expand_home(Path::new(&path)));
        }

        Ok(files)
    }

    fn resolve_fields(
        cli_entries: &[String],
        toml_entries: Option<&BTreeMap<String, String>>,
    ) -> Result<BTreeMap<String, String>, ConfigError> {
        let mut fields = BTreeMap::new();

        // Add TOML entries first (CLI can override)
        for (name, value) in toml_entries.into_iter().flatten() {
            validate_header(name, value)?;
            fields.insert(name.clone(), value.clone());
        }

        for entry in cli_entries {
            let (name, value) = parse_header_string(entry)?;
            validate_header(&name, &value)?;
            fields.insert(name, value);
        }

        Ok(fields)
    }

    fn resolve_payload(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<Option<Payload>, ConfigError> {
        let request = toml.map(|t| &t.request);

        // A CLI payload of either kind replaces any TOML payload
        if let Some(ref text) = cli.json {
            return parse_json(text).map(Some);
        }
        if let Some(ref path) = cli.body_file {
            return read_file(&expand_home(path)).map(|bytes| Some(Payload::Bytes(bytes)));
        }

        if let Some(text) = request.and_then(|r| r.json.as_deref()) {
            return parse_json(text).map(Some);
        }
        request
            .and_then(|r| r.body_file.as_deref())
            .map(|path| read_file(&expand_home(Path::new(path))).map(Payload::Bytes))
            .transpose()
    }

    fn resolve_timeouts(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<(Duration, Duration), ConfigError> {
        let timeouts = toml.map(|t| &t.timeouts);

        // Priority: CLI explicit > TOML > default
        let connect_ms = cli
            .connect_timeout
            .or_else(|| timeouts.and_then(|t| t.connect_ms))
            .unwrap_or(defaults::CONNECT_TIMEOUT_MS);
        let read_ms = cli
            .read_timeout
            .or_else(|| timeouts.and_then(|t| t.read_ms))
            .unwrap_or(defaults::READ_TIMEOUT_MS);

        Ok((
            positive_millis("connect_timeout", connect_ms)?,
            positive_millis("read_timeout", read_ms)?,
        ))
    }

    fn build_trust_policy(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<TrustPolicy, ConfigError> {
        let tls = toml.map(|t| &t.tls);

        let mut policy = if cli.strict_tls {
            TrustPolicy::strict()
        } else if cli.insecure {
            TrustPolicy::trust_all()
        } else {
            TrustPolicy::trust_all()
                .with_verify_certificates(tls.and_then(|t| t.verify_certificates).unwrap_or(false))
                .with_verify_hostnames(tls.and_then(|t| t.verify_hostnames).unwrap_or(false))
        };

        // CLI certificates replace TOML certificates entirely
        let ca_certs: Vec<PathBuf> = if cli.ca_certs.is_empty() {
            tls.map(|t| t.ca_certs.iter().map(PathBuf::from).collect())
                .unwrap_or_default()
        } else {
            cli.ca_certs.clone()
        };
        for path in &ca_certs {
            policy = policy.with_root_certificate(read_file(&expand_home(path))?);
        }

        let identity = cli
            .identity
            .clone()
            .or_else(|| tls.and_then(|t| t.identity.as_deref()).map(PathBuf::from));
        if let Some(path) = identity {
            policy = policy.with_identity(read_file(&expand_home(&path))?);
        }

        let min_version = cli
            .tls_min_version
            .as_deref()
            .or_else(|| tls.and_then(|t| t.min_version.as_deref()));
        if let Some(version) = min_version {
            let version = version
                .parse::<TlsVersion>()
                .map_err(ConfigError::InvalidTlsVersion)?;
            policy = policy.with_min_version(version);
        }

        Ok(policy)
    }
}

/// Writes the default configuration template to a file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let template = super::toml::default_config_template();
    std::fs::write(path, template).map_err(|e| ConfigError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Expands a leading `~` component to the home directory.
///
/// Paths without it, or with no known home directory, are returned unchanged.
#[must_use]
pub fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

// Helper functions

fn read_file(path: &Path) -> Result<Vec<u8>, ConfigError> {
    std::fs::read(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })
}

fn parse_json(text: &str) -> Result<Payload, ConfigError> {
    serde_json::from_str(text)
        .map(Payload::Json)
        .map_err(ConfigError::InvalidJson)
}

fn positive_millis(field: &'static str, millis: u64) -> Result<Duration, ConfigError> {
    if millis == 0 {
        return Err(ConfigError::InvalidDuration {
            field,
            reason: "must be greater than 0".to_string(),
        });
    }
    Ok(Duration::from_millis(millis))
}

fn parse_entry(kind: &'static str, s: &str) -> Result<(String, String), ConfigError> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(ConfigError::InvalidEntry {
            kind,
            value: s.to_string(),
            reason: "expected 'Key=Value' with a non-empty key",
        }),
    }
}

fn parse_header_string(s: &str) -> Result<(String, String), ConfigError> {
    // Try "Key=Value" format first
    if let Some((name, value)) = s.split_once('=') {
        return Ok((name.trim().to_string(), value.trim().to_string()));
    }

    // Try "Key: Value" format
    if let Some((name, value)) = s.split_once(':') {
        return Ok((name.trim().to_string(), value.trim().to_string()));
    }

    Err(ConfigError::InvalidHeader {
        value: s.to_string(),
    })
}

fn validate_header(name: &str, value: &str) -> Result<(), ConfigError> {
    name.parse::<HeaderName>()
        .map_err(|e| ConfigError::InvalidHeaderName {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
    HeaderValue::from_str(value).map_err(|e| ConfigError::InvalidHeaderValue {
        name: name.to_string(),
        reason: e.to_string(),
    })?;
    Ok(())
}
