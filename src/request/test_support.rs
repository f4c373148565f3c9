//! Recording transport shared by the request tests.

use std::io::{self, Cursor, Read};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{PreparedRequest, RawResponse, RequestError, Transport};

/// What the mock answers with.
pub enum Reply {
    /// A response with the given status and body.
    Body(u16, Vec<u8>),
    /// A response whose body fails on the first read.
    BrokenBody(u16),
    /// A transport failure.
    Fail(RequestError),
}

/// Body reader that records when it is dropped.
struct TrackedBody {
    inner: Cursor<Vec<u8>>,
    broken: bool,
    released: Arc<AtomicUsize>,
}

impl Read for TrackedBody {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.broken {
            return Err(io::Error::new(io::ErrorKind::ConnectionReset, "connection reset"));
        }
        self.inner.read(buf)
    }
}

impl Drop for TrackedBody {
    fn drop(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// Mock transport that captures every prepared request and replies from a script.
pub struct MockTransport {
    replies: Mutex<Vec<Reply>>,
    requests: Mutex<Vec<PreparedRequest>>,
    released: Arc<AtomicUsize>,
}

impl MockTransport {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies),
            requests: Mutex::new(Vec::new()),
            released: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn replying(status: u16, body: &[u8]) -> Self {
        Self::new(vec![Reply::Body(status, body.to_vec())])
    }

    pub fn ok() -> Self {
        Self::replying(200, b"")
    }

    pub fn requests(&self) -> Vec<PreparedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> PreparedRequest {
        self.requests().pop().expect("no request was sent")
    }

    pub fn last_body(&self) -> Vec<u8> {
        self.last_request().body.unwrap_or_default()
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

impl Transport for MockTransport {
    fn execute(&self, request: PreparedRequest) -> Result<RawResponse, RequestError> {
        self.requests.lock().unwrap().push(request);

        let reply = self.replies.lock().unwrap().remove(0);
        let (status, body, broken) = match reply {
            Reply::Body(status, body) => (status, body, false),
            Reply::BrokenBody(status) => (status, Vec::new(), true),
            Reply::Fail(e) => return Err(e),
        };

        let body = TrackedBody {
            inner: Cursor::new(body),
            broken,
            released: Arc::clone(&self.released),
        };

        Ok(RawResponse::new(
            http::StatusCode::from_u16(status).unwrap(),
            http::HeaderMap::new(),
            Box::new(body),
        ))
    }
}
