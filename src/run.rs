//! Application execution logic.
//!
//! This module turns a validated configuration into one request, sends it
//! and writes the selected response stream to stdout or the output file.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use restkit::config::ValidatedConfig;
use restkit::request::{Dispatch, RequestError, ResponseReader, StreamKind, Transport};

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Error type for runtime execution failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// Building, sending or reading the request failed.
    #[error("Request failed: {0}")]
    Request(#[from] RequestError),

    /// Failed to write the response body to the output file.
    #[error("Failed to write response to '{}': {source}", path.display())]
    OutputWrite {
        /// Path to the output file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Failed to write the response body to stdout.
    #[error("Failed to write response to stdout: {0}")]
    Stdout(#[source] io::Error),
}

/// What came back from a completed exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    /// Response status
    pub status: http::StatusCode,
    /// Which response stream was read
    pub stream: StreamKind,
    /// Number of body bytes written out
    pub bytes: usize,
}

/// Sends the configured request and writes the selected stream.
///
/// An error-stream response is not a failure here: its body is written like
/// any other, and the caller decides from [`Outcome::stream`].
///
/// # Errors
///
/// Returns an error if the request fails or the body cannot be written.
pub fn execute<T: Transport + ?Sized>(
    config: &ValidatedConfig,
    transport: &T,
) -> Result<Outcome, RunError> {
    let reader = send(config, transport)?;
    let status = reader.status();
    let stream = reader.stream_kind();

    if stream == StreamKind::Error {
        tracing::warn!(status = status.as_u16(), "Server answered on the error stream");
    }

    let body = reader.bytes()?;
    match &config.output {
        Some(path) => write_file(path, &body)?,
        None => write_stdout(&body)?,
    }

    tracing::info!(status = status.as_u16(), bytes = body.len(), "Request completed");

    Ok(Outcome {
        status,
        stream,
        bytes: body.len(),
    })
}

/// Chooses the role view for the configured method and sends it.
///
/// A GET method only carries parameters; file parts and payload are
/// dropped with a warning. Every other method writes a body.
///
/// # Errors
///
/// Returns [`RequestError`] if encoding or the transport fails.
pub fn send<T: Transport + ?Sized>(
    config: &ValidatedConfig,
    transport: &T,
) -> Result<ResponseReader, RequestError> {
    let spec = config.to_spec();

    if config.method.uses_query_string() {
        if !config.files.is_empty() || config.payload.is_some() {
            tracing::warn!(method = %config.method, "File parts and payload are ignored");
        }
        return spec
            .as_get_with(config.method)
            .add_params(config.params.clone())
            .send_with(transport);
    }

    let mut post = spec
        .as_post_with(config.method)
        .content_type(config.content_type)
        .add_params(config.params.clone());

    for (field, path) in &config.files {
        post = post.add_file_part(field.clone(), path.clone());
    }
    if let Some(ref payload) = config.payload {
        post = post.payload(payload.clone());
    }

    post.send_with(transport)
}

fn write_file(path: &Path, body: &[u8]) -> Result<(), RunError> {
    std::fs::write(path, body).map_err(|e| RunError::OutputWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

fn write_stdout(body: &[u8]) -> Result<(), RunError> {
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(body)
        .and_then(|()| stdout.flush())
        .map_err(RunError::Stdout)
}
