//! CLI argument parsing using clap.
//!
//! Defines the command-line interface with all options and subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::request::{ContentType, Protocol};

/// restkit: send one configurable HTTP request
///
/// Builds a GET or body-carrying request from flags and an optional config
/// file, sends it over a fresh connection and writes the selected response
/// stream to stdout.
#[derive(Debug, Parser)]
#[command(name = "restkit")]
#[command(version, about, long_about = None)]
#[allow(clippy::struct_excessive_bools)] // CLI flags are naturally boolean
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Target URL; a URL without scheme gets the --protocol prefix
    #[arg(long)]
    pub url: Option<String>,

    /// Scheme prefixed to a URL that has none
    #[arg(long, value_enum)]
    pub protocol: Option<ProtocolArg>,

    /// HTTP method (GET puts parameters in the query string)
    #[arg(long)]
    pub method: Option<String>,

    /// Body encoding for non-GET methods
    #[arg(long = "content-type", value_enum)]
    pub content_type: Option<ContentTypeArg>,

    /// Request parameter in 'Key=Value' format (can be specified multiple times)
    #[arg(long = "param", value_name = "K=V")]
    pub params: Vec<String>,

    /// Multipart file part in 'Field=Path' format (can be specified multiple times)
    #[arg(long = "file", value_name = "FIELD=PATH")]
    pub files: Vec<String>,

    /// HTTP headers in 'Key=Value' or 'Key: Value' format (can be specified multiple times)
    #[arg(long = "header", value_name = "K=V")]
    pub headers: Vec<String>,

    /// Request property in 'Key=Value' or 'Key: Value' format; headers win on the same name
    #[arg(long = "property", value_name = "K=V")]
    pub properties: Vec<String>,

    /// JSON payload for the json content type
    #[arg(long, conflicts_with = "body_file")]
    pub json: Option<String>,

    /// File whose bytes are the octet-stream payload
    #[arg(long = "body-file", value_name = "PATH")]
    pub body_file: Option<PathBuf>,

    /// Character set label (only utf8 is supported)
    #[arg(long)]
    pub charset: Option<String>,

    /// User-Agent request property
    #[arg(long = "user-agent")]
    pub user_agent: Option<String>,

    /// Connect timeout in milliseconds
    #[arg(long = "connect-timeout", value_name = "MS")]
    pub connect_timeout: Option<u64>,

    /// Read timeout in milliseconds
    #[arg(long = "read-timeout", value_name = "MS")]
    pub read_timeout: Option<u64>,

    /// Proxy URL for the connection
    #[arg(long)]
    pub proxy: Option<String>,

    /// Accept any certificate and hostname on https (the default)
    #[arg(long, conflicts_with = "strict_tls")]
    pub insecure: bool,

    /// Verify certificates and hostnames on https
    #[arg(long = "strict-tls")]
    pub strict_tls: bool,

    /// Extra PEM root certificate to trust (can be specified multiple times)
    #[arg(long = "ca-cert", value_name = "PATH")]
    pub ca_certs: Vec<PathBuf>,

    /// PEM bundle holding the client key and certificate chain
    #[arg(long, value_name = "PATH")]
    pub identity: Option<PathBuf>,

    /// Minimum TLS version: 1.2 or 1.3
    #[arg(long = "tls-min-version", value_name = "VERSION")]
    pub tls_min_version: Option<String>,

    /// Follow redirects
    #[arg(long = "follow-redirects")]
    pub follow_redirects: bool,

    /// Allow caches to answer (omits Cache-Control: no-cache)
    #[arg(long = "use-cache")]
    pub use_cache: bool,

    /// Do not read the response body
    #[arg(long = "no-input")]
    pub no_input: bool,

    /// Do not write a request body
    #[arg(long = "no-output")]
    pub no_output: bool,

    /// Write the response body to this file instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, short)]
    pub verbose: bool,
}

/// Subcommands for restkit
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a default configuration file
    Init {
        /// Output path for the configuration file
        #[arg(long, short, default_value = "restkit.toml")]
        output: PathBuf,
    },
}

/// Scheme argument for CLI parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProtocolArg {
    /// Plain HTTP
    Http,
    /// HTTP over TLS
    Https,
}

impl From<ProtocolArg> for Protocol {
    fn from(arg: ProtocolArg) -> Self {
        match arg {
            ProtocolArg::Http => Self::Http,
            ProtocolArg::Https => Self::Https,
        }
    }
}

/// Content type argument for CLI parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ContentTypeArg {
    /// key=value pairs joined with '&'
    Form,
    /// JSON document
    Json,
    /// Raw bytes from --body-file
    #[value(name = "octet-stream")]
    OctetStream,
    /// multipart/form-data with file parts
    Multipart,
}

impl From<ContentTypeArg> for ContentType {
    fn from(arg: ContentTypeArg) -> Self {
        match arg {
            ContentTypeArg::Form => Self::Form,
            ContentTypeArg::Json => Self::Json,
            ContentTypeArg::OctetStream => Self::OctetStream,
            ContentTypeArg::Multipart => Self::Multipart,
        }
    }
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    #[must_use]
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }

    /// Parses CLI arguments from an iterator, returning clap's error instead of exiting.
    ///
    /// # Errors
    ///
    /// Returns the clap error for unknown flags, conflicts or invalid values.
    pub fn try_parse_from_iter<I, T>(iter: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::try_parse_from(iter)
    }

    /// Returns true if this is the init command.
    #[must_use]
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Some(Command::Init { .. }))
    }
}
