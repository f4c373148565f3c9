//! Outbound request building, body encoding and response reading.
//!
//! This module provides:
//! - A mutable request builder ([`RequestSpec`])
//! - Role views restricting what may be configured ([`GetRequest`], [`PostRequest`])
//! - Terminal send/read operations ([`Dispatch`])
//! - Body encoding per content type ([`BodyEncoder`], [`ContentType`])
//! - Per-connection TLS trust ([`TrustPolicy`])
//! - A transport abstraction and its reqwest implementation ([`Transport`], [`ReqwestTransport`])
//! - Response stream selection ([`ResponseReader`], [`StreamKind`])
//!
//! Each spec issues exactly one request. Nothing is pooled, retried or cached.

mod content_type;
mod encoder;
mod envelope;
mod error;
mod method;
mod param;
mod response;
mod role;
mod spec;
mod transport;
mod trust;

#[cfg(test)]
mod test_support;

#[cfg(test)]
mod method_tests;
#[cfg(test)]
mod role_tests;
#[cfg(test)]
mod transport_tests;

pub use content_type::{Charset, ContentType};
pub use encoder::{BodyEncoder, EncodedBody, MAX_CHUNK_SIZE, new_boundary, query_string};
pub use envelope::ResultEnvelope;
pub use error::{ErrorKind, RequestError};
pub use method::{HttpMethod, Protocol};
pub use param::{ParamValue, Payload};
pub use response::{ResponseReader, ResponseStream, StreamKind};
pub use role::{Dispatch, GetRequest, PostRequest};
pub use spec::{CONTENT_TYPE, FilenameSource, RequestSpec, USER_AGENT};
pub use transport::{ConnectOptions, PreparedRequest, RawResponse, ReqwestTransport, Transport};
pub use trust::{TlsVersion, TrustPolicy};
