//! Request body encoding, one encoder per [`ContentType`] variant.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::{Map, Value};

use super::{ContentType, FilenameSource, ParamValue, Payload, RequestError, RequestSpec};

const CRLF: &str = "\r\n";
const DASHES: &str = "--";
const BOUNDARY_MARKER: &str = "*****";

/// Largest chunk read from a file part at once (1 MiB).
pub const MAX_CHUNK_SIZE: usize = 1024 * 1024;

/// An encoded request body together with the `Content-Type` it must be sent with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBody {
    /// Value of the `Content-Type` header
    pub content_type: String,
    /// Bytes written to the connection
    pub bytes: Vec<u8>,
}

/// Produces the exact bytes written for a [`RequestSpec`].
///
/// Dispatch is a pure function of the declared content type. The payload is
/// never inspected to guess an encoding; a payload whose shape does not fit
/// the declared content type is an [`RequestError::Encoding`].
#[derive(Debug, Clone)]
pub struct BodyEncoder<'a> {
    spec: &'a RequestSpec,
}

impl<'a> BodyEncoder<'a> {
    /// Creates an encoder reading from `spec`.
    #[must_use]
    pub const fn new(spec: &'a RequestSpec) -> Self {
        Self { spec }
    }

    /// Encodes the body for the declared content type.
    ///
    /// Multipart bodies get a fresh boundary from [`new_boundary`].
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Encoding`] if the payload does not fit the
    /// content type, or [`RequestError::Io`] if a file part cannot be read.
    pub fn encode(&self) -> Result<EncodedBody, RequestError> {
        match self.spec.content_type {
            ContentType::Form => Ok(self.form()),
            ContentType::Json => self.json(),
            ContentType::OctetStream => self.octet_stream(),
            ContentType::Multipart => self.multipart(&new_boundary()),
        }
    }

    /// Encodes the scalar parameters as `key1=value1&key2=value2`.
    #[must_use]
    pub fn form(&self) -> EncodedBody {
        self.ignore_payload();
        self.ignore_files();

        EncodedBody {
            content_type: ContentType::Form.media_type().to_string(),
            bytes: query_string(&self.spec.params).into_bytes(),
        }
    }

    /// Encodes the payload as JSON, merging the scalar parameters into it.
    ///
    /// An array payload is written as is. An object payload (or an empty
    /// object when there is none, or the payload is `null`) receives every
    /// scalar parameter as a top-level field, parameters replacing payload
    /// fields on collision.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Encoding`] for a binary or scalar JSON payload.
    pub fn json(&self) -> Result<EncodedBody, RequestError> {
        self.ignore_files();

        let document = match &self.spec.payload {
            Some(Payload::Json(Value::Array(items))) => {
                if !self.spec.params.is_empty() {
                    tracing::warn!(
                        count = self.spec.params.len(),
                        "Parameters are not merged into a JSON array payload"
                    );
                }
                Value::Array(items.clone())
            }
            Some(Payload::Json(Value::Object(fields))) => {
                Value::Object(merge_params(fields.clone(), &self.spec.params))
            }
            None | Some(Payload::Json(Value::Null)) => {
                Value::Object(merge_params(Map::new(), &self.spec.params))
            }
            Some(other) => {
                return Err(RequestError::encoding(format!(
                    "{} content type cannot carry a {} payload",
                    ContentType::Json,
                    other.describe()
                )));
            }
        };

        let bytes = serde_json::to_vec(&document)
            .map_err(|e| RequestError::encoding(format!("JSON serialization failed: {e}")))?;

        Ok(EncodedBody {
            content_type: ContentType::Json.media_type().to_string(),
            bytes,
        })
    }

    /// Writes the binary payload verbatim, with no framing or length prefix.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Encoding`] unless the payload is a byte sequence.
    pub fn octet_stream(&self) -> Result<EncodedBody, RequestError> {
        self.ignore_files();

        match &self.spec.payload {
            Some(Payload::Bytes(bytes)) => Ok(EncodedBody {
                content_type: ContentType::OctetStream.media_type().to_string(),
                bytes: bytes.clone(),
            }),
            Some(other) => Err(RequestError::encoding(format!(
                "{} content type requires a byte sequence payload, got a {}",
                ContentType::OctetStream,
                other.describe()
            ))),
            None => Err(RequestError::encoding(format!(
                "{} content type requires a byte sequence payload, none was set",
                ContentType::OctetStream
            ))),
        }
    }

    /// Encodes every file part, then every scalar parameter, as
    /// `multipart/form-data` delimited by `boundary`.
    ///
    /// Field names and filenames are written with `"`, CR and LF escaped as
    /// `%22`, `%0D` and `%0A`, so a name can never end its header line.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Io`] if a file part cannot be opened or read.
    pub fn multipart(&self, boundary: &str) -> Result<EncodedBody, RequestError> {
        self.ignore_payload();

        let mut bytes = Vec::new();
        self.write_multipart(&mut bytes, boundary)?;

        Ok(EncodedBody {
            content_type: format!("{}; boundary={boundary}", ContentType::Multipart.media_type()),
            bytes,
        })
    }

    fn write_multipart<W: Write>(&self, out: &mut W, boundary: &str) -> Result<(), RequestError> {
        for (field, path) in &self.spec.files {
            let name = escape_quoted(field);
            let filename = escape_quoted(self.filename_for(field, path));
            write!(out, "{DASHES}{boundary}{CRLF}")?;
            write!(
                out,
                "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"{CRLF}"
            )?;
            write!(out, "Content-Transfer-Encoding: binary{CRLF}")?;
            write!(out, "{CRLF}")?;
            copy_file(path, out)?;
            write!(out, "{CRLF}")?;
        }

        for (field, value) in &self.spec.params {
            let Some(text) = value.to_text() else {
                tracing::warn!(field = %field, "File-valued parameter skipped; use a file part");
                continue;
            };
            let name = escape_quoted(field);
            write!(out, "{DASHES}{boundary}{CRLF}")?;
            write!(out, "Content-Disposition: form-data; name=\"{name}\"{CRLF}")?;
            write!(out, "Content-Type: text/plain{CRLF}")?;
            write!(out, "{CRLF}")?;
            write!(out, "{text}{CRLF}")?;
        }

        write!(out, "{DASHES}{boundary}{DASHES}{CRLF}")?;
        Ok(())
    }

    fn filename_for<'p>(&self, field: &'p str, path: &'p Path) -> &'p str {
        match self.spec.filename_source {
            FilenameSource::FieldName => field,
            FilenameSource::Path => path
                .file_name()
                .and_then(std::ffi::OsStr::to_str)
                .unwrap_or(field),
        }
    }

    fn ignore_payload(&self) {
        if let Some(payload) = &self.spec.payload {
            tracing::warn!(
                content_type = %self.spec.content_type,
                payload = payload.describe(),
                "Payload ignored by this content type"
            );
        }
    }

    fn ignore_files(&self) {
        if !self.spec.files.is_empty() {
            tracing::warn!(
                content_type = %self.spec.content_type,
                count = self.spec.files.len(),
                "File parts are only sent with multipart/form-data"
            );
        }
    }
}

/// Builds `key1=value1&key2=value2` from `params`.
///
/// File-valued parameters are skipped. Keys and values are written as given,
/// without percent-encoding, and there is no trailing separator.
#[must_use]
pub fn query_string(params: &BTreeMap<String, ParamValue>) -> String {
    params
        .iter()
        .filter_map(|(key, value)| value.to_text().map(|text| format!("{key}={text}")))
        .collect::<Vec<_>>()
        .join("&")
}

/// Generates a multipart boundary that is unique per call.
///
/// The boundary embeds a nanosecond timestamp and a process-wide sequence
/// number between fixed markers, e.g. `*****1718000000123456789-0*****`.
#[must_use]
pub fn new_boundary() -> String {
    static SEQUENCE: AtomicU32 = AtomicU32::new(0);

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos());
    let sequence = SEQUENCE.fetch_add(1, Ordering::Relaxed);

    format!("{BOUNDARY_MARKER}{nanos}-{sequence}{BOUNDARY_MARKER}")
}

fn merge_params(mut fields: Map<String, Value>, params: &BTreeMap<String, ParamValue>) -> Map<String, Value> {
    for (key, value) in params {
        let Some(json) = value.as_json() else {
            tracing::warn!(field = %key, "File-valued parameter skipped in JSON body");
            continue;
        };
        fields.insert(key.clone(), json.clone());
    }
    fields
}

/// Escapes the characters that would end a quoted header parameter.
fn escape_quoted(value: &str) -> Cow<'_, str> {
    if !value.contains(['"', '\r', '\n']) {
        return Cow::Borrowed(value);
    }

    let mut escaped = String::with_capacity(value.len() + 4);
    for c in value.chars() {
        match c {
            '"' => escaped.push_str("%22"),
            '\r' => escaped.push_str("%0D"),
            '\n' => escaped.push_str("%0A"),
            other => escaped.push(other),
        }
    }
    Cow::Owned(escaped)
}

/// Copies a file into `out` in chunks of at most [`MAX_CHUNK_SIZE`] bytes.
fn copy_file<W: Write>(path: &Path, out: &mut W) -> Result<(), RequestError> {
    let mut file = File::open(path).map_err(|e| {
        std::io::Error::new(e.kind(), format!("cannot open file part '{}': {e}", path.display()))
    })?;

    let capacity = file
        .metadata()
        .ok()
        .and_then(|meta| usize::try_from(meta.len()).ok())
        .map_or(MAX_CHUNK_SIZE, |len| len.clamp(1, MAX_CHUNK_SIZE));
    let mut buffer = vec![0u8; capacity];

    loop {
        let read = match file.read(&mut buffer) {
            Ok(read) => read,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        if read == 0 {
            break;
        }
        out.write_all(&buffer[..read])?;
    }

    Ok(())
}
