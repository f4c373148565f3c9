//! restkit: a configurable outbound HTTP request builder.
//!
//! A library for building one HTTP request at a time, encoding its body as
//! urlencoded, JSON, raw bytes or multipart, and reading back whichever
//! response stream the status code selects.

pub mod config;
pub mod request;
