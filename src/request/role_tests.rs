//! Tests for the builder and its role views.

use std::time::Duration;

use serde_json::json;

use super::test_support::MockTransport;
use super::{
    CONTENT_TYPE, ContentType, Dispatch, HttpMethod, ParamValue, Payload, Protocol, RequestSpec,
    USER_AGENT,
};

mod builder {
    use super::*;

    #[test]
    fn new_applies_defaults() {
        let spec = RequestSpec::new("http://localhost:8090/api");

        assert_eq!(spec.url(), "http://localhost:8090/api");
        assert_eq!(spec.method(), HttpMethod::Get);
        assert_eq!(spec.content_type(), ContentType::Form);
        assert_eq!(spec.charset().label(), "utf8");
        assert_eq!(spec.connect_timeout(), Duration::from_secs(70));
        assert_eq!(spec.read_timeout(), Duration::from_secs(70));
        assert!(spec.params().is_empty());
        assert!(spec.files().is_empty());
        assert!(spec.payload().is_none());
        assert!(spec.proxy().is_none());
        assert!(!spec.trust_policy().verifies_certificates());
    }

    #[test]
    fn default_user_agent_is_a_property() {
        let spec = RequestSpec::new("http://localhost/api");

        assert_eq!(
            spec.properties().get(USER_AGENT).map(String::as_str),
            Some(RequestSpec::DEFAULT_USER_AGENT)
        );
        assert!(RequestSpec::DEFAULT_USER_AGENT.starts_with("restkit/"));
    }

    #[test]
    fn bare_url_gets_https_by_default() {
        assert_eq!(RequestSpec::new("example.com/x").url(), "https://example.com/x");
    }

    #[test]
    fn protocol_applies_only_without_scheme() {
        let bare = RequestSpec::with_protocol(Protocol::Http, "localhost:8090/api");
        let full = RequestSpec::with_protocol(Protocol::Http, "https://localhost:8090/api");

        assert_eq!(bare.url(), "http://localhost:8090/api");
        assert_eq!(full.url(), "https://localhost:8090/api");
    }

    #[test]
    fn setters_replace_previous_values() {
        let spec = RequestSpec::new("http://localhost/api")
            .with_connect_timeout(Duration::from_secs(1))
            .with_connect_timeout(Duration::from_secs(2))
            .with_header("X-Token", "a")
            .with_header("X-Token", "b")
            .with_user_agent("checker/1.0")
            .with_proxy("http://proxy.internal:3128");

        assert_eq!(spec.connect_timeout(), Duration::from_secs(2));
        assert_eq!(spec.headers().get("X-Token").map(String::as_str), Some("b"));
        assert_eq!(spec.properties().get(USER_AGENT).map(String::as_str), Some("checker/1.0"));
        assert_eq!(spec.proxy(), Some("http://proxy.internal:3128"));
    }

    #[test]
    fn role_conversion_sets_method() {
        let get = RequestSpec::new("http://localhost/api").as_get();
        let post = RequestSpec::new("http://localhost/api").as_post();
        let put = RequestSpec::new("http://localhost/api").as_post_with(HttpMethod::Put);
        let delete = RequestSpec::new("http://localhost/api").as_get_with(HttpMethod::Delete);

        assert_eq!(get.into_spec().method(), HttpMethod::Get);
        assert_eq!(post.spec().method(), HttpMethod::Post);
        assert_eq!(put.spec().method(), HttpMethod::Put);
        assert_eq!(delete.into_spec().method(), HttpMethod::Delete);
    }
}

mod get_request {
    use super::*;

    #[test]
    fn no_params_leaves_url_untouched() {
        let transport = MockTransport::ok();
        RequestSpec::new("http://localhost:8090/api/test")
            .as_get()
            .send_with(&transport)
            .unwrap();

        let request = transport.last_request();
        assert_eq!(request.url.as_str(), "http://localhost:8090/api/test");
        assert!(request.url.query().is_none());
        assert!(request.body.is_none());
    }

    #[test]
    fn params_are_appended_as_query_string() {
        let transport = MockTransport::ok();
        RequestSpec::new("http://localhost:8090/api/test")
            .as_get()
            .add_param("one", 1)
            .add_param("two", "2")
            .send_with(&transport)
            .unwrap();

        let request = transport.last_request();
        assert_eq!(request.method, http::Method::GET);
        assert_eq!(request.url.query(), Some("one=1&two=2"));
    }

    #[test]
    fn existing_query_is_extended() {
        let transport = MockTransport::ok();
        RequestSpec::new("http://localhost/api?page=1")
            .as_get()
            .add_param("size", 20)
            .send_with(&transport)
            .unwrap();

        assert_eq!(transport.last_request().url.query(), Some("page=1&size=20"));
    }

    #[test]
    fn later_value_wins_for_same_key() {
        let get = RequestSpec::new("http://localhost/api")
            .as_get()
            .add_param("a", 1)
            .add_param("a", 2);

        assert_eq!(get.params().len(), 1);
        assert_eq!(get.params().get("a"), Some(&ParamValue::from(2)));
    }

    #[test]
    fn add_params_merges_a_map() {
        let get = RequestSpec::new("http://localhost/api")
            .as_get()
            .add_param("a", "old")
            .add_params([("a", "new"), ("b", "x")]);

        assert_eq!(get.params().get("a"), Some(&ParamValue::from("new")));
        assert_eq!(get.params().get("b"), Some(&ParamValue::from("x")));
    }

    #[test]
    fn delete_writes_params_as_body() {
        let transport = MockTransport::ok();
        RequestSpec::new("http://localhost/api/items")
            .as_get_with(HttpMethod::Delete)
            .add_param("id", 9)
            .send_with(&transport)
            .unwrap();

        let request = transport.last_request();
        assert_eq!(request.method, http::Method::DELETE);
        assert_eq!(request.url.query(), None);
        assert_eq!(request.body.as_deref(), Some(&b"id=9"[..]));
    }

    #[test]
    fn only_get_method_uses_query_string() {
        for method in [HttpMethod::Post, HttpMethod::Put, HttpMethod::Delete, HttpMethod::Patch] {
            let transport = MockTransport::ok();
            RequestSpec::new("http://localhost/api")
                .as_get_with(method)
                .add_param("id", 9)
                .send_with(&transport)
                .unwrap();

            let request = transport.last_request();
            assert_eq!(request.url.query(), None, "{method}");
            assert_eq!(request.body.as_deref(), Some(&b"id=9"[..]), "{method}");
        }

        let transport = MockTransport::ok();
        RequestSpec::new("http://localhost/api")
            .as_post_with(HttpMethod::Get)
            .add_param("id", 9)
            .send_with(&transport)
            .unwrap();

        let request = transport.last_request();
        assert_eq!(request.url.query(), Some("id=9"));
        assert!(request.body.is_none());
    }
}

mod post_request {
    use super::*;

    #[test]
    fn form_body_by_default() {
        let transport = MockTransport::ok();
        RequestSpec::new("http://localhost:8090/api/testdefault")
            .as_post()
            .add_param("one", 1)
            .add_param("two", "2")
            .send_with(&transport)
            .unwrap();

        let request = transport.last_request();
        assert_eq!(request.method, http::Method::POST);
        assert_eq!(request.url.query(), None);
        assert_eq!(request.body.as_deref(), Some(&b"one=1&two=2"[..]));
        assert_eq!(
            request.headers.get(http::header::CONTENT_TYPE).unwrap(),
            "application/x-www-form-urlencoded"
        );
    }

    #[test]
    fn json_content_type_sets_property_and_body() {
        let transport = MockTransport::ok();
        let post = RequestSpec::new("http://localhost:8090/api/testapplicationjson")
            .as_post()
            .content_type(ContentType::Json)
            .payload(json!({"one": 1}))
            .add_param("two", 2);

        assert_eq!(
            post.spec().properties().get(CONTENT_TYPE).map(String::as_str),
            Some("application/json")
        );
        post.send_with(&transport).unwrap();

        let request = transport.last_request();
        assert_eq!(transport.last_body(), br#"{"one":1,"two":2}"#);
        assert_eq!(request.headers.get(http::header::CONTENT_TYPE).unwrap(), "application/json");
    }

    #[test]
    fn none_content_type_keeps_current_choice() {
        let none: Option<ContentType> = None;
        let post = RequestSpec::new("http://localhost/api")
            .as_post()
            .content_type(ContentType::Json)
            .content_type(none);

        assert_eq!(post.spec().content_type(), ContentType::Json);
    }

    #[test]
    fn octet_stream_body_is_exact() {
        let transport = MockTransport::ok();
        RequestSpec::new("http://localhost:8090/api/testoctetstream")
            .as_post()
            .content_type(ContentType::OctetStream)
            .payload(vec![0x01u8, 0x02, 0x03])
            .send_with(&transport)
            .unwrap();

        assert_eq!(transport.last_body(), vec![0x01, 0x02, 0x03]);
    }

    #[test]
    fn put_writes_body() {
        let transport = MockTransport::ok();
        RequestSpec::new("http://localhost/api/items/1")
            .as_post_with(HttpMethod::Put)
            .content_type(ContentType::Json)
            .add_param("name", "renamed")
            .send_with(&transport)
            .unwrap();

        let request = transport.last_request();
        assert_eq!(request.method, http::Method::PUT);
        assert_eq!(transport.last_body(), br#"{"name":"renamed"}"#);
    }

    #[test]
    fn payload_replaces_previous_payload() {
        let post = RequestSpec::new("http://localhost/api")
            .as_post()
            .payload(json!([1]))
            .payload(vec![9u8]);

        assert_eq!(post.spec().payload(), Some(&Payload::Bytes(vec![9])));
    }

    #[test]
    fn file_part_with_same_name_is_replaced() {
        let post = RequestSpec::new("http://localhost/api")
            .as_post()
            .add_file_part("doc", "/tmp/a.txt")
            .add_file_part("doc", "/tmp/b.txt");

        assert_eq!(post.spec().files().len(), 1);
        assert_eq!(
            post.spec().files().get("doc"),
            Some(&std::path::PathBuf::from("/tmp/b.txt"))
        );
    }

    #[test]
    fn without_output_no_body_is_written() {
        let transport = MockTransport::ok();
        RequestSpec::new("http://localhost/api")
            .with_do_output(false)
            .as_post()
            .content_type(ContentType::OctetStream)
            .send_with(&transport)
            .unwrap();

        assert!(transport.last_request().body.is_none());
    }

    #[test]
    fn encoding_error_sends_nothing() {
        let transport = MockTransport::ok();
        let result = RequestSpec::new("http://localhost/api")
            .as_post()
            .content_type(ContentType::OctetStream)
            .payload(json!({"not": "bytes"}))
            .send_with(&transport);

        assert!(result.is_err());
        assert!(transport.requests().is_empty());
    }
}
