//! Tests for request preparation and the reqwest transport.

use std::time::Duration;

use http::header::{CACHE_CONTROL, CONTENT_TYPE, USER_AGENT};

use super::test_support::MockTransport;
use super::{
    ContentType, Dispatch, ErrorKind, PreparedRequest, RequestError, RequestSpec, TrustPolicy,
};

fn header<'a>(request: &'a PreparedRequest, name: &http::HeaderName) -> Option<&'a str> {
    request.headers.get(name).and_then(|v| v.to_str().ok())
}

mod prepare {
    use super::*;

    #[test]
    fn header_field_wins_over_property() {
        let spec = RequestSpec::new("http://localhost/api")
            .with_property("X-Source", "property")
            .with_header("X-Source", "header");
        let request = PreparedRequest::from_spec(&spec).unwrap();

        assert_eq!(request.headers.get_all("x-source").iter().count(), 1);
        assert_eq!(request.headers.get("x-source").unwrap(), "header");
    }

    #[test]
    fn blank_values_are_skipped() {
        let spec = RequestSpec::new("http://localhost/api")
            .with_header("X-Empty", "   ")
            .with_property("X-Also-Empty", "");
        let request = PreparedRequest::from_spec(&spec).unwrap();

        assert!(request.headers.get("x-empty").is_none());
        assert!(request.headers.get("x-also-empty").is_none());
    }

    #[test]
    fn blank_header_does_not_erase_property() {
        let spec = RequestSpec::new("http://localhost/api")
            .with_property("X-Mode", "fast")
            .with_header("X-Mode", "");
        let request = PreparedRequest::from_spec(&spec).unwrap();

        assert_eq!(request.headers.get("x-mode").unwrap(), "fast");
    }

    #[test]
    fn default_user_agent_is_sent() {
        let request = PreparedRequest::from_spec(&RequestSpec::new("http://localhost/api")).unwrap();
        assert_eq!(header(&request, &USER_AGENT), Some(RequestSpec::DEFAULT_USER_AGENT));
    }

    #[test]
    fn cache_control_follows_use_cache() {
        let uncached = PreparedRequest::from_spec(&RequestSpec::new("http://localhost/api")).unwrap();
        let cached = PreparedRequest::from_spec(
            &RequestSpec::new("http://localhost/api").with_use_cache(true),
        )
        .unwrap();

        assert_eq!(header(&uncached, &CACHE_CONTROL), Some("no-cache"));
        assert!(cached.headers.get(CACHE_CONTROL).is_none());
    }

    #[test]
    fn explicit_content_type_header_is_kept_for_json() {
        let spec = RequestSpec::new("http://localhost/api")
            .with_header("Content-Type", "application/vnd.api+json")
            .as_post()
            .content_type(ContentType::Json)
            .into_spec();
        let request = PreparedRequest::from_spec(&spec).unwrap();

        assert_eq!(header(&request, &CONTENT_TYPE), Some("application/vnd.api+json"));
    }

    #[test]
    fn multipart_always_sends_its_boundary() {
        let spec = RequestSpec::new("http://localhost/api")
            .with_header("Content-Type", "text/plain")
            .as_post()
            .content_type(ContentType::Multipart)
            .add_param("one", 1)
            .into_spec();
        let request = PreparedRequest::from_spec(&spec).unwrap();

        let boundary = header(&request, &CONTENT_TYPE)
            .and_then(|v| v.strip_prefix("multipart/form-data; boundary="))
            .unwrap()
            .to_string();
        let body = String::from_utf8(request.body.unwrap()).unwrap();
        assert!(body.ends_with(&format!("--{boundary}--\r\n")));
    }

    #[test]
    fn get_has_no_content_type() {
        let spec = RequestSpec::new("http://localhost/api").as_get().add_param("q", "x").into_spec();
        let request = PreparedRequest::from_spec(&spec).unwrap();

        assert!(request.headers.get(CONTENT_TYPE).is_none());
    }

    #[test]
    fn carries_connection_options() {
        let spec = RequestSpec::new("https://localhost/api")
            .with_connect_timeout(Duration::from_millis(1500))
            .with_read_timeout(Duration::from_secs(9))
            .with_follow_redirects(true)
            .with_proxy("http://proxy.internal:3128")
            .with_trust_policy(TrustPolicy::strict());
        let request = PreparedRequest::from_spec(&spec).unwrap();

        assert!(request.is_secure());
        assert_eq!(request.options.connect_timeout, Duration::from_millis(1500));
        assert_eq!(request.options.read_timeout, Duration::from_secs(9));
        assert!(request.options.follow_redirects);
        assert_eq!(request.options.proxy.as_deref(), Some("http://proxy.internal:3128"));
        assert_eq!(request.options.trust, TrustPolicy::strict());
    }

    #[test]
    fn unsupported_charset_is_a_usage_error() {
        let transport = MockTransport::ok();
        let err = RequestSpec::new("http://localhost/api")
            .with_charset_label("iso-8859-1")
            .as_get()
            .send_with(&transport)
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Usage);
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn unparsable_url_is_a_usage_error() {
        let err = PreparedRequest::from_spec(&RequestSpec::new("http://")).unwrap_err();

        assert!(matches!(err, RequestError::InvalidUrl { .. }));
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn invalid_header_name_is_a_usage_error() {
        let spec = RequestSpec::new("http://localhost/api").with_header("bad header", "x");
        let err = PreparedRequest::from_spec(&spec).unwrap_err();

        assert!(matches!(err, RequestError::InvalidHeader { ref name, .. } if name == "bad header"));
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn invalid_header_value_is_a_usage_error() {
        let spec = RequestSpec::new("http://localhost/api").with_header("X-Line", "a\nb");
        let err = PreparedRequest::from_spec(&spec).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Usage);
    }
}

mod loopback {
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    use super::*;
    use crate::request::{Protocol, ReqwestTransport, StreamKind};

    /// Serves one canned response and returns the raw request it received.
    fn serve_once(response: &'static str) -> (u16, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let request = read_request(&mut stream);
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();
            request
        });

        (port, handle)
    }

    fn read_request(stream: &mut std::net::TcpStream) -> String {
        let mut raw = Vec::new();
        let mut buf = [0u8; 4096];

        let header_end = loop {
            let n = stream.read(&mut buf).unwrap();
            assert!(n > 0, "client closed before sending headers");
            raw.extend_from_slice(&buf[..n]);
            if let Some(pos) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let head = String::from_utf8_lossy(&raw[..header_end]).to_ascii_lowercase();
        let content_length = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);

        while raw.len() < header_end + content_length {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&buf[..n]);
        }

        String::from_utf8_lossy(&raw).into_owned()
    }

    fn local(port: u16, path: &str) -> RequestSpec {
        RequestSpec::with_protocol(Protocol::Http, &format!("127.0.0.1:{port}{path}"))
            .with_connect_timeout(Duration::from_secs(5))
            .with_read_timeout(Duration::from_secs(5))
    }

    #[test]
    fn posts_json_and_reads_success_stream() {
        let (port, server) = serve_once(
            "HTTP/1.1 201 Created\r\nContent-Length: 11\r\nConnection: close\r\n\r\nhello\nworld",
        );

        let reader = local(port, "/api/testapplicationjson")
            .as_post()
            .content_type(ContentType::Json)
            .add_param("one", 1)
            .add_param("two", "2")
            .send_with(&ReqwestTransport::new())
            .unwrap();

        assert_eq!(reader.stream_kind(), StreamKind::Success);
        assert_eq!(reader.text().unwrap(), "helloworld");

        let request = server.join().unwrap();
        let lowered = request.to_ascii_lowercase();
        assert!(request.starts_with("POST /api/testapplicationjson HTTP/1.1\r\n"));
        assert!(lowered.contains("content-type: application/json\r\n"));
        assert!(lowered.contains("cache-control: no-cache\r\n"));
        assert!(request.ends_with(r#"{"one":1,"two":"2"}"#));
    }

    #[test]
    fn get_sends_query_and_reads_error_stream() {
        let (port, server) = serve_once(
            "HTTP/1.1 404 Not Found\r\nContent-Length: 7\r\nConnection: close\r\n\r\nmissing",
        );

        let text = local(port, "/api/test")
            .as_get()
            .add_param("one", 1)
            .send_with(&ReqwestTransport::new())
            .unwrap()
            .text()
            .unwrap();

        assert_eq!(text, "missing");
        let request = server.join().unwrap();
        assert!(request.starts_with("GET /api/test?one=1 HTTP/1.1\r\n"));
    }

    #[test]
    fn trust_policy_is_not_applied_to_plain_http() {
        let (port, server) =
            serve_once("HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok");

        let broken = TrustPolicy::strict().with_identity(b"not a pem bundle".to_vec());
        let bytes = local(port, "/")
            .with_trust_policy(broken)
            .as_get()
            .send_with(&ReqwestTransport::new())
            .unwrap()
            .bytes()
            .unwrap();

        assert_eq!(bytes, b"ok");
        server.join().unwrap();
    }

    #[test]
    fn redirects_are_not_followed_by_default() {
        let (port, server) = serve_once(
            "HTTP/1.1 302 Found\r\nLocation: /elsewhere\r\nContent-Length: 5\r\nConnection: close\r\n\r\nmoved",
        );

        let reader = local(port, "/old")
            .as_get()
            .send_with(&ReqwestTransport::new())
            .unwrap();

        assert_eq!(reader.status(), http::StatusCode::FOUND);
        assert_eq!(reader.stream_kind(), StreamKind::Error);
        assert_eq!(reader.text().unwrap(), "moved");
        server.join().unwrap();
    }

    #[test]
    fn refused_connection_is_a_connection_error() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let err = local(port, "/")
            .as_get()
            .send_with(&ReqwestTransport::new())
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Connection);
    }

    #[test]
    fn invalid_proxy_is_a_usage_error() {
        let err = local(1, "/")
            .with_proxy("::not a proxy::")
            .as_get()
            .send_with(&ReqwestTransport::new())
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Usage);
    }
}
