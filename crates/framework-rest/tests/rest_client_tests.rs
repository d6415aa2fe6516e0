//! Integration tests for the REST client against a mock server.

use std::sync::Arc;
use std::time::Duration;

use framework_rest::RestError;
use framework_rest::http::{
    AcceptMode, BodyMode, Credentials, Method, RequestBuilder, ResponseMode, ResponseStatus,
    RestClient, TransferDirection,
};
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Deserialize, PartialEq)]
struct User {
    id: u32,
    name: String,
}

fn request(server: &MockServer, route: &str) -> RequestBuilder {
    RequestBuilder::new(&format!("{}{}", server.uri(), route)).expect("valid uri")
}

#[tokio::test]
async fn test_get_typed_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/1"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1, "name": "Ada"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = RestClient::new();
    let builder = request(&server, "/users/1").accept_mode(AcceptMode::Json);
    let typed = client.get_as_async::<User>(builder).await;

    assert_eq!(typed.status, ResponseStatus::Completed);
    assert_eq!(typed.status_code, 200);
    assert_eq!(typed.response_mode, ResponseMode::Json);
    assert_eq!(
        typed.data(),
        Some(&User {
            id: 1,
            name: "Ada".into()
        })
    );
}

#[tokio::test]
async fn test_get_typed_xml() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<User><id>2</id><name>Grace</name></User>", "text/xml"),
        )
        .mount(&server)
        .await;

    let client = RestClient::new();
    let typed = client.get_as_async::<User>(request(&server, "/users/2")).await;

    assert_eq!(typed.response_mode, ResponseMode::Xml);
    assert_eq!(typed.data().map(|u| u.name.as_str()), Some("Grace"));
}

#[tokio::test]
async fn test_http_error_keeps_response_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "missing"})))
        .mount(&server)
        .await;

    let client = RestClient::new();
    let typed = client
        .execute_as_async::<serde_json::Value>(request(&server, "/missing"))
        .await;

    assert_eq!(typed.status, ResponseStatus::Error);
    assert_eq!(typed.status_code, 404);
    assert_eq!(typed.status_description, "Not Found");
    assert_eq!(
        typed.error,
        Some(RestError::HttpStatus {
            status: 404,
            message: "Not Found".into()
        })
    );
    assert_eq!(typed.content(), r#"{"error":"missing"}"#);
    assert_eq!(typed.data().map(|v| v["error"].clone()), Some(json!("missing")));
}

#[tokio::test]
async fn test_unparseable_payload_marks_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("{not json", "application/json"))
        .mount(&server)
        .await;

    let client = RestClient::new();
    let typed = client.get_as_async::<User>(request(&server, "/")).await;

    assert_eq!(typed.status, ResponseStatus::Error);
    assert_eq!(typed.status_code, 200);
    assert!(matches!(typed.error, Some(RestError::Deserialization(_))));
    assert_eq!(typed.content(), "{not json");
    assert!(typed.data().is_none());
}

#[tokio::test]
async fn test_get_sends_no_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = RestClient::new();
    let builder = request(&server, "/items?page=2")
        .body_mode(BodyMode::Json)
        .add_body_serialized(&json!({"ignored": true}))
        .unwrap();
    let response = client.get_async(builder).await;
    assert!(response.is_success());

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    assert!(received[0].body.is_empty());
    assert!(received[0].headers.get("content-type").is_none());
    assert_eq!(received[0].url.query(), Some("page=2"));
    assert!(
        received[0]
            .headers
            .get("user-agent")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ua| ua.starts_with("Framework/"))
    );
}

#[tokio::test]
async fn test_post_empty_json_sends_object() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/items"))
        .and(header("content-type", "application/json; charset=utf-8"))
        .and(header("content-length", "2"))
        .and(body_string("{}"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let client = RestClient::new();
    let builder = request(&server, "/items").body_mode(BodyMode::Json);
    let response = client.post_async(builder).await;

    assert_eq!(response.status_code, 201);
    assert!(response.is_success());
}

#[tokio::test]
async fn test_post_form_with_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(header("authorization", "Basic dXNlcjpwYXNz"))
        .and(header("content-type", "application/x-www-form-urlencoded; charset=utf-8"))
        .and(body_string("user=ada&note=two+words"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = RestClient::new();
    let builder = request(&server, "/login")
        .credentials(Credentials::basic("user", Some("pass")))
        .unwrap()
        .add_body("user", "ada")
        .unwrap()
        .add_body("note", "two words")
        .unwrap();
    let response = client.post_async(builder).await;

    assert!(response.is_success());
    let sent = response.request.as_ref().unwrap();
    assert_eq!(sent.method, Method::Post);
    assert!(!sent.log.contains("dXNlcjpwYXNz"));
}

#[tokio::test]
async fn test_put_and_delete() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/items/1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/items/1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = RestClient::new();
    assert!(client.put_async(request(&server, "/items/1")).await.is_success());
    assert_eq!(client.delete_async(request(&server, "/items/1")).await.status_code, 204);
}

#[tokio::test]
async fn test_progress_events() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string("0123456789"))
        .respond_with(ResponseTemplate::new(200).set_body_string("abcdefghij"))
        .mount(&server)
        .await;

    let client = RestClient::builder().chunk_size(4).build().unwrap();
    let events = Arc::new(Mutex::new(Vec::new()));
    let events_clone = events.clone();
    client
        .progress_changed()
        .connect(move |p| events_clone.lock().push(p.clone()));

    let builder = request(&server, "/upload")
        .body_mode(BodyMode::Raw)
        .add_body_bytes("", b"0123456789")
        .unwrap();
    let response = client.post_async(builder).await;
    assert!(response.is_success());
    assert_eq!(response.content(), "abcdefghij");

    let events = events.lock();
    let id = response.request.as_ref().map(|r| r.id).unwrap();
    assert!(events.iter().all(|p| p.request_id == id));
    assert!(events.iter().all(|p| p.url.path() == "/upload"));
    let uploads: Vec<u64> = events
        .iter()
        .filter(|p| p.direction == TransferDirection::Upload)
        .map(|p| p.bytes_transferred)
        .collect();
    assert_eq!(uploads, [4, 8, 10]);

    let downloads: Vec<u64> = events
        .iter()
        .filter(|p| p.direction == TransferDirection::Download)
        .map(|p| p.bytes_transferred)
        .collect();
    assert!(downloads.windows(2).all(|w| w[0] < w[1]));
    assert!(downloads.iter().all(|&n| n <= 10));
    assert_eq!(downloads.last(), Some(&10));
}

#[tokio::test]
async fn test_response_cookies_and_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "sid=abc; Path=/; HttpOnly")
                .insert_header("x-request-id", "42"),
        )
        .mount(&server)
        .await;

    let client = RestClient::new();
    let response = client.get_async(request(&server, "/")).await;

    assert_eq!(response.header("x-request-id"), Some("42"));
    assert_eq!(response.cookies.len(), 1);
    assert_eq!(response.cookies[0].name, "sid");
    assert_eq!(response.cookies[0].value, "abc");
    assert!(response.cookies[0].http_only);
}

#[tokio::test]
async fn test_redirect_sets_response_uri() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("location", format!("{}/new", server.uri())),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = RestClient::new();
    let response = client.get_async(request(&server, "/old")).await;

    assert!(response.is_success());
    assert_eq!(response.response_uri.as_ref().map(|u| u.path()), Some("/new"));
}

#[tokio::test]
async fn test_post_body_follows_temporary_redirect() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(307).insert_header("location", format!("{}/new", server.uri())),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/new"))
        .and(body_string(r#"{"name":"gear"}"#))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 3, "name": "gear"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = RestClient::new();
    let builder = request(&server, "/old")
        .body_mode(BodyMode::Json)
        .add_body_serialized(&json!({"name": "gear"}))
        .unwrap();
    let typed = client.post_as_async::<User>(builder).await;

    assert_eq!(typed.status, ResponseStatus::Completed);
    assert_eq!(typed.status_code, 201);
    assert_eq!(typed.response_uri.as_ref().map(|u| u.path()), Some("/new"));
    assert_eq!(typed.data().map(|u| u.id), Some(3));
}

#[tokio::test]
async fn test_redirect_to_other_origin_drops_credentials() {
    let target = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/landing"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&target)
        .await;

    let origin = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(
            ResponseTemplate::new(308).insert_header("location", format!("{}/landing", target.uri())),
        )
        .mount(&origin)
        .await;

    let client = RestClient::new();
    let builder = request(&origin, "/start")
        .credentials(Credentials::bearer("secret"))
        .unwrap()
        .add_body("k", "v")
        .unwrap();
    let response = client.put_async(builder).await;
    assert!(response.is_success());

    let received = target.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    assert!(received[0].headers.get("authorization").is_none());
    assert_eq!(received[0].body, b"k=v");
}

#[tokio::test]
async fn test_redirect_not_followed_when_disabled() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(307).insert_header("location", "/new"))
        .mount(&server)
        .await;

    let client = RestClient::builder().no_redirects().build().unwrap();
    let builder = request(&server, "/old").add_body("a", "1").unwrap();
    let response = client.post_async(builder).await;

    assert_eq!(response.status, ResponseStatus::Error);
    assert_eq!(response.status_code, 307);
    assert_eq!(response.response_uri.as_ref().map(|u| u.path()), Some("/old"));
}

/// Serve one response whose body stops short of its declared length.
async fn truncated_body_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                return;
            }
            request.extend_from_slice(&buf[..n]);
        }
        socket
            .write_all(
                b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 100\r\n\r\n{\"id\": 1, ",
            )
            .await
            .unwrap();
        socket.flush().await.unwrap();
        socket.shutdown().await.unwrap();
    });
    format!("http://{addr}/partial")
}

#[tokio::test]
async fn test_truncated_body_keeps_partial_bytes() {
    let url = truncated_body_server().await;
    let client = RestClient::new();
    let typed = client
        .get_as_async::<User>(RequestBuilder::new(&url).unwrap())
        .await;

    assert_eq!(typed.status, ResponseStatus::Error);
    assert_eq!(typed.status_code, 200);
    assert_eq!(typed.raw_bytes.as_ref(), b"{\"id\": 1, ");
    // The failed parse of the partial body does not replace the read error.
    assert!(matches!(
        typed.error,
        Some(RestError::Transport { status: 200, .. })
    ));
    assert!(typed.data().is_none());
}

#[tokio::test]
async fn test_connection_failure() {
    let client = RestClient::new();
    let builder = RequestBuilder::new("http://127.0.0.1:1/").unwrap();
    let response = client.get_async(builder).await;

    assert_eq!(response.status, ResponseStatus::Error);
    assert_eq!(response.status_code, 0);
    assert_eq!(response.error.as_ref().and_then(RestError::status), Some(500));
    assert!(matches!(response.error, Some(RestError::Transport { .. })));
    assert!(response.error_message.is_some());
}

#[tokio::test]
async fn test_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let client = RestClient::new();
    let builder = request(&server, "/slow").timeout(Duration::from_millis(100));
    let response = client.get_async(builder).await;

    assert_eq!(response.status, ResponseStatus::TimedOut);
    assert!(matches!(response.error, Some(RestError::Transport { .. })));
    assert!(!response.is_success());
}

#[test]
fn test_blocking_api() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let server = rt.block_on(MockServer::start());
    rt.block_on(
        Mock::given(method("GET"))
            .and(path("/users/7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 7, "name": "Linus"})))
            .mount(&server),
    );

    let client = RestClient::new();
    let raw = client.get(request(&server, "/users/7"));
    assert!(raw.is_success());
    assert_eq!(raw.response_mode, ResponseMode::Json);

    let typed = client.get_as::<User>(request(&server, "/users/7"));
    assert_eq!(typed.data().map(|u| u.id), Some(7));

    let head = client.head(request(&server, "/users/7"));
    assert_eq!(head.request.as_ref().map(|r| r.method), Some(Method::Head));
}
