//! Integration tests for request assembly.

use framework_rest::http::{
    AcceptMode, BOUNDARY, BodyMode, Cookie, Credentials, FileParameter, Method, RequestBuilder,
    SelfSerialize,
};
use framework_rest::{RestError, Result};
use serde::Serialize;

fn post(mode: BodyMode) -> RequestBuilder {
    RequestBuilder::with_modes("http://api.test/items", mode, AcceptMode::None)
        .expect("valid uri")
        .method(Method::Post)
}

#[test]
fn test_content_type_per_body_mode() {
    let cases = [
        (BodyMode::UrlEncoded, Some("application/x-www-form-urlencoded; charset=utf-8".to_string())),
        (BodyMode::Json, Some("application/json; charset=utf-8".to_string())),
        (BodyMode::Xml, Some("text/xml; charset=utf-8".to_string())),
        (BodyMode::Raw, Some("application/octet-stream".to_string())),
        (BodyMode::Multipart, Some(format!("multipart/form-data; boundary={BOUNDARY}"))),
        (BodyMode::None, None),
    ];

    for (mode, expected) in cases {
        let request = post(mode).build();
        assert_eq!(
            request.header("content-type").map(str::to_string),
            expected,
            "content type for {mode:?}"
        );
    }
}

#[test]
fn test_content_type_override() {
    let request = post(BodyMode::Json)
        .header("Content-Type", "application/vnd.api+json")
        .unwrap()
        .build();
    assert_eq!(request.header("content-type"), Some("application/vnd.api+json"));
}

#[test]
fn test_accept_mode_and_override() {
    let request = RequestBuilder::with_modes("http://api.test/", BodyMode::None, AcceptMode::Xml)
        .unwrap()
        .build();
    assert_eq!(request.header("accept"), Some("text/xml"));

    let request = RequestBuilder::with_modes("http://api.test/", BodyMode::None, AcceptMode::Json)
        .unwrap()
        .header("Accept", "text/csv")
        .unwrap()
        .build();
    assert_eq!(request.header("accept"), Some("text/csv"));
}

#[test]
fn test_url_encoded_pairs_are_joined() {
    let request = post(BodyMode::UrlEncoded)
        .add_body("name", "Ada Lovelace")
        .unwrap()
        .add_body("expr", "a&b=c")
        .unwrap()
        .build();

    assert_eq!(request.body.as_ref(), b"name=Ada+Lovelace&expr=a%26b%3Dc");
    assert_eq!(request.content_length(), request.body.len() as u64);
}

#[test]
fn test_url_encoded_uses_builder_encoding() {
    let request = post(BodyMode::UrlEncoded)
        .encoding(encoding_rs::WINDOWS_1252)
        .add_body("name", "caf\u{e9}")
        .unwrap()
        .build();

    assert_eq!(request.body.as_ref(), b"name=caf%E9");
    assert_eq!(
        request.header("content-type"),
        Some("application/x-www-form-urlencoded; charset=windows-1252")
    );
}

#[test]
fn test_multipart_framing() {
    let request = post(BodyMode::Multipart)
        .multipart_boundary("XYZ")
        .unwrap()
        .add_body("title", "hi")
        .unwrap()
        .add_file(FileParameter::new("f", "a.txt", &b"abc"[..]).with_content_type("text/plain"))
        .build();

    let expected = "--XYZ\r\n\
        Content-Disposition: form-data; name=\"title\"\r\n\r\n\
        hi\r\n\
        --XYZ\r\n\
        Content-Disposition: form-data; name=\"f\"; filename=\"a.txt\"\r\n\
        Content-Type: text/plain\r\n\r\n\
        abc\r\n\
        --XYZ--\r\n";
    assert_eq!(String::from_utf8_lossy(&request.body), expected);
    assert_eq!(request.header("content-type"), Some("multipart/form-data; boundary=XYZ"));
}

#[test]
fn test_multipart_without_parts_has_footer_only() {
    let request = post(BodyMode::Multipart).build();
    assert_eq!(
        String::from_utf8_lossy(&request.body),
        format!("\r\n--{BOUNDARY}--\r\n")
    );
}

#[test]
fn test_invalid_multipart_boundary() {
    assert_eq!(
        post(BodyMode::Multipart).multipart_boundary("").unwrap_err(),
        RestError::MissingArgument("boundary")
    );
    assert!(post(BodyMode::Multipart).multipart_boundary("has space").is_err());
}

#[test]
fn test_query_string_round_trip() {
    let builder = RequestBuilder::new("http://api.test/search?a=1&b=2&a=3#frag")
        .unwrap()
        .query("c", "x y");

    let all_a: Vec<&str> = builder.parameters().get_all("a").collect();
    assert_eq!(all_a, ["1", "3"]);

    let request = builder.build();
    assert_eq!(request.url.as_str(), "http://api.test/search?a=1&b=2&a=3&c=x+y");
}

#[test]
fn test_get_never_carries_a_body() {
    let request = RequestBuilder::new("http://api.test/")
        .unwrap()
        .add_body("ignored", "value")
        .unwrap()
        .build();

    assert_eq!(request.method, Method::Get);
    assert!(request.body.is_empty());
    assert_eq!(request.content_length(), 0);
    assert!(request.header("content-type").is_none());

    let head = RequestBuilder::with_modes("http://api.test/", BodyMode::Json, AcceptMode::Json)
        .unwrap()
        .method(Method::Head)
        .add_body_serialized(&serde_json::json!({"a": 1}))
        .unwrap()
        .build();
    assert!(head.body.is_empty());
}

#[test]
fn test_empty_json_body_becomes_empty_object() {
    let request = post(BodyMode::Json).build();
    assert_eq!(request.body.as_ref(), b"{}");

    let put = post(BodyMode::Json).method(Method::Put).build();
    assert_eq!(put.body.as_ref(), b"{}");
}

#[test]
fn test_first_payload_wins() {
    let request = post(BodyMode::Json)
        .add_body_serialized(&serde_json::json!({"first": true}))
        .unwrap()
        .add_body_serialized(&serde_json::json!({"second": true}))
        .unwrap()
        .build();
    assert_eq!(request.body.as_ref(), br#"{"first":true}"#);
}

#[test]
fn test_xml_payload() {
    #[derive(Serialize)]
    struct Widget {
        name: String,
    }

    let request = post(BodyMode::Xml)
        .add_body_serialized(&Widget {
            name: "gear".into(),
        })
        .unwrap()
        .build();
    assert_eq!(request.body.as_ref(), b"<Widget><name>gear</name></Widget>");
}

#[test]
fn test_self_serialized_payload() {
    struct Csv(Vec<&'static str>);

    impl SelfSerialize for Csv {
        fn serialize_self(&self) -> Result<String> {
            Ok(self.0.join(","))
        }
    }

    let request = post(BodyMode::Raw)
        .add_self_serialized(&Csv(vec!["a", "b", "c"]))
        .unwrap()
        .build();
    assert_eq!(request.body.as_ref(), b"a,b,c");
}

#[test]
fn test_unsupported_header_rejected() {
    for name in ["Range", "Content-Length", "Referer", "Transfer-Encoding"] {
        let err = post(BodyMode::Raw).header(name, "x").unwrap_err();
        assert_eq!(err, RestError::UnsupportedHeader(name.to_ascii_lowercase()));
    }
}

#[test]
fn test_custom_headers_append() {
    let request = post(BodyMode::Raw)
        .header("X-Tag", "one")
        .unwrap()
        .header("X-Tag", "two")
        .unwrap()
        .header("User-Agent", "tests/1.0")
        .unwrap()
        .build();

    let tags: Vec<_> = request.headers.get_all("x-tag").iter().collect();
    assert_eq!(tags.len(), 2);
    assert_eq!(request.header("user-agent"), Some("tests/1.0"));
}

#[test]
fn test_keyed_write_requires_key() {
    let err = post(BodyMode::UrlEncoded).add_body("", "value").unwrap_err();
    assert_eq!(err, RestError::MissingArgument("key"));

    let err = post(BodyMode::Multipart).add_body("", "value").unwrap_err();
    assert_eq!(err, RestError::MissingArgument("key"));

    let raw = post(BodyMode::Raw).add_body("", "value").unwrap().build();
    assert_eq!(raw.body.as_ref(), b"value");
}

#[test]
fn test_content_md5() {
    let request = post(BodyMode::Raw)
        .content_md5(true)
        .add_body_bytes("", b"hello")
        .unwrap()
        .build();
    assert_eq!(request.header("content-md5"), Some("XUFAKrxLKna5cZ2REBfFkg=="));

    let without = post(BodyMode::Raw).add_body_bytes("", b"hello").unwrap().build();
    assert!(without.header("content-md5").is_none());
}

#[test]
fn test_cookies_and_credentials() {
    let request = RequestBuilder::new("http://api.test/")
        .unwrap()
        .cookie(Cookie::new("a", "1"))
        .unwrap()
        .cookie(Cookie::new("b", "2"))
        .unwrap()
        .credentials(Credentials::bearer("tok"))
        .unwrap()
        .build();

    assert_eq!(request.header("cookie"), Some("a=1; b=2"));
    assert_eq!(request.header("authorization"), Some("Bearer tok"));
    assert!(!request.log.contains("tok"));

    assert!(
        RequestBuilder::new("http://api.test/")
            .unwrap()
            .cookie(Cookie::new("bad name", "1"))
            .is_err()
    );
}

#[test]
fn test_files_by_body_mode() {
    let file = FileParameter::new("f", "data.bin", &b"\x00\x01"[..]);

    let raw = post(BodyMode::Raw).add_file(file.clone()).build();
    assert_eq!(raw.body.as_ref(), b"\x00\x01");

    let json = post(BodyMode::Json).add_file(file).build();
    assert_eq!(json.body.as_ref(), b"{}");
}

#[test]
fn test_invalid_resource() {
    assert!(matches!(
        RequestBuilder::new(""),
        Err(RestError::InvalidUrl { .. })
    ));
    assert!(RequestBuilder::new("not a url").is_err());
}
