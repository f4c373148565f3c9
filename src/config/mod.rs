//! Configuration layer for the restkit command-line tool.
//!
//! This module provides:
//! - CLI argument parsing ([`Cli`], [`Command`])
//! - TOML configuration file parsing ([`TomlConfig`])
//! - Validated configuration ([`ValidatedConfig`])
//! - Configuration file generation ([`write_default_config`])
//! - Default values ([`defaults`])
//!
//! # Priority
//!
//! Configuration values are resolved with the following priority (highest to lowest):
//!
//! 1. **Explicit CLI arguments** - Values explicitly passed via command line
//! 2. **TOML config file** - Values from the configuration file
//! 3. **Built-in defaults** - Hardcoded default values
//!
//! Keyed entries (`params`, `files`, `headers`, `properties`) are merged: TOML
//! entries are loaded first and a CLI entry with the same key replaces them.
//!
//! List values (`ca_certs`) use replace semantics: any `--ca-cert` on the CLI
//! discards the TOML list.
//!
//! A payload given on the CLI (`--json` or `--body-file`) replaces any TOML payload.
//!
//! # Boolean Flag Semantics
//!
//! Enabling flags (`--follow-redirects`, `--use-cache`) use OR semantics with TOML.
//! Disabling flags (`--no-input`, `--no-output`) use AND semantics: once turned
//! off on either side, the behavior stays off.
//!
//! # File Paths
//!
//! A leading `~` in any configured path is expanded to the home directory.

mod cli;
pub mod defaults;
mod error;
mod toml;
mod validated;


pub use cli::{Cli, Command, ContentTypeArg, ProtocolArg};
pub use error::{ConfigError, field};
pub use toml::{
    RequestSection, TimeoutsSection, TlsSection, TomlConfig, TransportSection,
    default_config_template,
};
pub use validated::{ValidatedConfig, expand_home, write_default_config};
