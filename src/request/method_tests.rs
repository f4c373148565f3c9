//! Tests for methods, protocols, content types and charsets.

use super::{Charset, ContentType, ErrorKind, HttpMethod, Protocol};

mod http_method {
    use super::*;

    #[test]
    fn only_get_uses_query_string() {
        assert!(HttpMethod::Get.uses_query_string());
        for method in [HttpMethod::Post, HttpMethod::Put, HttpMethod::Delete, HttpMethod::Patch] {
            assert!(!method.uses_query_string(), "{method} should write a body");
        }
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("get".parse::<HttpMethod>(), Ok(HttpMethod::Get));
        assert_eq!(" Post ".parse::<HttpMethod>(), Ok(HttpMethod::Post));
        assert_eq!("PATCH".parse::<HttpMethod>(), Ok(HttpMethod::Patch));
    }

    #[test]
    fn rejects_unknown_method() {
        assert_eq!("TRACE".parse::<HttpMethod>(), Err("TRACE".to_string()));
    }

    #[test]
    fn converts_to_http_method() {
        assert_eq!(http::Method::from(HttpMethod::Delete), http::Method::DELETE);
        assert_eq!(http::Method::from(HttpMethod::Put), http::Method::PUT);
    }

    #[test]
    fn defaults_to_get() {
        assert_eq!(HttpMethod::default(), HttpMethod::Get);
    }
}

mod protocol {
    use super::*;

    #[test]
    fn prefixes_bare_host() {
        assert_eq!(Protocol::Http.apply("localhost:8090/api"), "http://localhost:8090/api");
        assert_eq!(Protocol::Https.apply("example.com"), "https://example.com");
    }

    #[test]
    fn keeps_existing_scheme() {
        assert_eq!(Protocol::Https.apply("http://localhost/x"), "http://localhost/x");
        assert_eq!(Protocol::Http.apply("HTTPS://example.com"), "HTTPS://example.com");
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(Protocol::Http.apply("  example.com/a \n"), "http://example.com/a");
    }

    #[test]
    fn parses_scheme_name() {
        assert_eq!("HTTP".parse::<Protocol>(), Ok(Protocol::Http));
        assert_eq!("https".parse::<Protocol>(), Ok(Protocol::Https));
        assert!("ftp".parse::<Protocol>().is_err());
    }
}

mod content_type {
    use super::*;

    #[test]
    fn form_code_is_blank_but_media_type_is_urlencoded() {
        assert_eq!(ContentType::Form.code(), "");
        assert_eq!(ContentType::Form.media_type(), "application/x-www-form-urlencoded");
    }

    #[test]
    fn other_codes_match_media_types() {
        for content_type in [ContentType::Json, ContentType::OctetStream, ContentType::Multipart] {
            assert_eq!(content_type.code(), content_type.media_type());
        }
    }

    #[test]
    fn parses_short_names_and_mime_types() {
        assert_eq!("json".parse::<ContentType>(), Ok(ContentType::Json));
        assert_eq!("application/json".parse::<ContentType>(), Ok(ContentType::Json));
        assert_eq!("binary".parse::<ContentType>(), Ok(ContentType::OctetStream));
        assert_eq!("Multipart".parse::<ContentType>(), Ok(ContentType::Multipart));
        assert_eq!("form".parse::<ContentType>(), Ok(ContentType::Form));
        assert!("text/html".parse::<ContentType>().is_err());
    }
}

mod charset {
    use super::*;

    #[test]
    fn default_is_utf8() {
        let charset = Charset::default();
        assert_eq!(charset.label(), "utf8");
        assert!(charset.is_utf8());
    }

    #[test]
    fn accepts_both_utf8_spellings() {
        assert!(Charset::new("UTF-8").ensure_supported().is_ok());
        assert!(Charset::new("utf8").ensure_supported().is_ok());
    }

    #[test]
    fn other_charsets_are_usage_errors() {
        let err = Charset::new("latin1").ensure_supported().unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Usage);
        assert!(err.to_string().contains("latin1"));
    }
}
