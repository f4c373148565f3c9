//! Default values for configuration options.
//!
//! Centralized constants to avoid magic numbers scattered across the codebase.

/// Default HTTP method.
pub const METHOD: &str = "GET";

/// Default body encoding.
pub const CONTENT_TYPE: &str = "form";

/// Default character set label.
pub const CHARSET: &str = "utf8";

/// Default connect timeout in milliseconds.
pub const CONNECT_TIMEOUT_MS: u64 = 70_000;

/// Default read timeout in milliseconds.
pub const READ_TIMEOUT_MS: u64 = 70_000;

/// Default for following redirects.
pub const FOLLOW_REDIRECTS: bool = false;

/// Default for letting caches answer.
pub const USE_CACHE: bool = false;

/// Default for reading the response body.
pub const DO_INPUT: bool = true;

/// Default for writing a request body.
pub const DO_OUTPUT: bool = true;
