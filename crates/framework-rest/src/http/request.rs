//! Request assembly.
//!
//! A [`RequestBuilder`] collects URL, query parameters, headers, cookies and
//! body writes, then [`build`](RequestBuilder::build)s an immutable
//! [`RestRequest`] that the client sends.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use encoding_rs::Encoding;
use framework_core::logging::targets;
use framework_core::{PerfSpan, QueryString, split_resource};
use http::header::{self, HeaderMap, HeaderName, HeaderValue};
use md5::{Digest, Md5};
use serde::Serialize;
use url::Url;
use url::form_urlencoded;

use super::cookie::{self, Cookie};
use super::modes::{AcceptMode, BOUNDARY, BodyMode, Method};
use super::multipart::{self, FileParameter, Part};
use super::serializer::{JsonSerializer, SelfSerialize, Serializer, XmlSerializer};
use crate::error::{RestError, Result};
use crate::tls::Identity;

static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// Number of body bytes shown in the request log.
const LOG_BODY_PREVIEW: usize = 2048;

/// Authentication credentials for HTTP requests.
#[derive(Clone)]
pub enum Credentials {
    /// HTTP Basic authentication.
    Basic {
        /// Username.
        username: String,
        /// Password (optional).
        password: Option<String>,
    },
    /// Bearer token authentication.
    Bearer(String),
}

impl Credentials {
    /// Basic credentials.
    pub fn basic(username: impl Into<String>, password: Option<impl Into<String>>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.map(Into::into),
        }
    }

    /// Bearer token.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer(token.into())
    }

    /// The `Authorization` header value.
    fn header_value(&self) -> Result<HeaderValue> {
        let raw = match self {
            Self::Basic { username, password } => {
                let pair = format!("{}:{}", username, password.as_deref().unwrap_or_default());
                format!("Basic {}", STANDARD.encode(pair))
            }
            Self::Bearer(token) => format!("Bearer {token}"),
        };
        let mut value = HeaderValue::from_str(&raw)?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .finish_non_exhaustive(),
            Self::Bearer(_) => f.write_str("Bearer(..)"),
        }
    }
}

/// Proxy to route a request through.
#[derive(Clone, PartialEq, Eq)]
pub struct ProxySettings {
    /// Proxy URL, e.g. `http://proxy:8080`.
    pub url: String,
    /// Proxy username.
    pub username: Option<String>,
    /// Proxy password.
    pub password: Option<String>,
}

impl ProxySettings {
    /// Proxy without credentials.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            username: None,
            password: None,
        }
    }

    /// Builder: authenticate against the proxy with basic credentials.
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub(crate) fn to_reqwest(&self) -> Result<reqwest::Proxy> {
        let proxy = reqwest::Proxy::all(&self.url).map_err(|e| RestError::InvalidUrl {
            url: self.url.clone(),
            message: e.to_string(),
        })?;
        Ok(match (&self.username, &self.password) {
            (Some(username), password) => {
                proxy.basic_auth(username, password.as_deref().unwrap_or_default())
            }
            _ => proxy,
        })
    }
}

impl fmt::Debug for ProxySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxySettings")
            .field("url", &self.url)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Headers the transport only accepts through dedicated setters.
#[derive(Clone, Debug, Default)]
struct DedicatedHeaders {
    accept: Option<HeaderValue>,
    connection: Option<HeaderValue>,
    content_type: Option<HeaderValue>,
    expect: Option<HeaderValue>,
    user_agent: Option<HeaderValue>,
    date: Option<HeaderValue>,
    host: Option<HeaderValue>,
}

/// A finalized request, ready to send.
///
/// Shared through an `Arc` with the [`Response`](super::Response) it produced.
#[derive(Clone, Debug)]
pub struct RestRequest {
    /// Process-unique id, carried by progress events for this request.
    pub id: u64,
    /// The HTTP method.
    pub method: Method,
    /// Full URL including the query string.
    pub url: Url,
    /// All request headers.
    pub headers: HeaderMap,
    /// Finalized body bytes. Always empty for GET and HEAD.
    pub body: Bytes,
    /// Per-request timeout.
    pub timeout: Option<Duration>,
    /// Per-request proxy.
    pub proxy: Option<ProxySettings>,
    /// Client certificate for mutual TLS.
    pub identity: Option<Identity>,
    /// Human-readable rendering of the request, credentials redacted.
    pub log: String,
}

impl RestRequest {
    /// Number of body bytes that will be sent.
    pub fn content_length(&self) -> u64 {
        self.body.len() as u64
    }

    /// Get a header value as text.
    pub fn header(&self, name: impl AsRef<str>) -> Option<&str> {
        self.headers
            .get(name.as_ref())
            .and_then(|v| v.to_str().ok())
    }
}

/// Builder for constructing REST requests.
///
/// # Example
///
/// ```
/// use framework_rest::http::{AcceptMode, BodyMode, Method, RequestBuilder};
///
/// let request = RequestBuilder::with_modes("http://api.test/items?page=2", BodyMode::Json, AcceptMode::Json)?
///     .method(Method::Post)
///     .query("sort", "name")
///     .header("X-Trace", "abc")?
///     .add_body_serialized(&serde_json::json!({"name": "widget"}))?
///     .build();
///
/// assert_eq!(request.url.as_str(), "http://api.test/items?page=2&sort=name");
/// assert_eq!(request.header("content-type"), Some("application/json; charset=utf-8"));
/// assert_eq!(request.body.as_ref(), br#"{"name":"widget"}"#);
/// # Ok::<(), framework_rest::RestError>(())
/// ```
#[derive(Clone, Debug)]
pub struct RequestBuilder {
    base_url: Url,
    query: QueryString,
    method: Option<Method>,
    body_mode: BodyMode,
    accept_mode: AcceptMode,
    encoding: &'static Encoding,
    headers: HeaderMap,
    dedicated: DedicatedHeaders,
    authorization: Option<HeaderValue>,
    cookies: Vec<Cookie>,
    identity: Option<Identity>,
    proxy: Option<ProxySettings>,
    timeout: Option<Duration>,
    content_md5: bool,
    boundary: String,
    body: Vec<u8>,
    parts: Vec<Part>,
}

impl RequestBuilder {
    /// Create a builder for `uri` with URL-encoded body mode and no accept mode.
    ///
    /// Any query string in `uri` is moved into the parameter list.
    pub fn new(uri: &str) -> Result<Self> {
        Self::with_modes(uri, BodyMode::default(), AcceptMode::default())
    }

    /// Create a builder with explicit body and accept modes.
    pub fn with_modes(uri: &str, body_mode: BodyMode, accept_mode: AcceptMode) -> Result<Self> {
        let (base_url, query) = split_resource(uri)?;
        Ok(Self {
            base_url,
            query,
            method: None,
            body_mode,
            accept_mode,
            encoding: encoding_rs::UTF_8,
            headers: HeaderMap::new(),
            dedicated: DedicatedHeaders::default(),
            authorization: None,
            cookies: Vec::new(),
            identity: None,
            proxy: None,
            timeout: None,
            content_md5: false,
            boundary: BOUNDARY.to_string(),
            body: Vec::new(),
            parts: Vec::new(),
        })
    }

    /// Set the HTTP method (GET when never set).
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Set the body mode.
    pub fn body_mode(mut self, mode: BodyMode) -> Self {
        self.body_mode = mode;
        self
    }

    /// Set the accept mode.
    pub fn accept_mode(mut self, mode: AcceptMode) -> Self {
        self.accept_mode = mode;
        self
    }

    /// Set the character encoding for text body writes and the charset
    /// parameter of the Content-Type.
    ///
    /// Encoders exist only for ASCII-compatible encodings; UTF-16 labels
    /// fall back to UTF-8 bytes.
    pub fn encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding.output_encoding();
        self
    }

    /// Append a query parameter after any taken from the URI.
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.append(name, value);
        self
    }

    /// Set a header.
    ///
    /// Accept, Connection, Content-Type, Expect, User-Agent, Date and Host
    /// replace the builder's value for that header. Content-Length,
    /// Transfer-Encoding, If-Modified-Since, Range, Referer and
    /// Proxy-Connection are rejected. Other headers are appended.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let name = HeaderName::from_bytes(name.as_ref().trim().as_bytes())?;
        let value = HeaderValue::from_str(value.as_ref())?;

        let slot = match name.as_str() {
            "accept" => &mut self.dedicated.accept,
            "connection" => &mut self.dedicated.connection,
            "content-type" => &mut self.dedicated.content_type,
            "expect" => &mut self.dedicated.expect,
            "user-agent" => &mut self.dedicated.user_agent,
            "date" => &mut self.dedicated.date,
            "host" => &mut self.dedicated.host,
            "content-length" | "transfer-encoding" | "if-modified-since" | "range" | "referer"
            | "proxy-connection" => {
                return Err(RestError::UnsupportedHeader(name.to_string()));
            }
            _ => {
                self.headers.append(name, value);
                return Ok(self);
            }
        };
        *slot = Some(value);
        Ok(self)
    }

    /// Add a cookie, sent in the `Cookie` header.
    pub fn cookie(mut self, cookie: Cookie) -> Result<Self> {
        cookie.validate()?;
        self.cookies.push(cookie);
        Ok(self)
    }

    /// Set credentials, sent in the `Authorization` header.
    pub fn credentials(mut self, credentials: Credentials) -> Result<Self> {
        self.authorization = Some(credentials.header_value()?);
        Ok(self)
    }

    /// Set a client certificate for mutual TLS.
    pub fn certificate(mut self, identity: Identity) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Route this request through a proxy.
    pub fn proxy(mut self, proxy: ProxySettings) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Set a timeout for this specific request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Send a `Content-MD5` header computed over the final body.
    pub fn content_md5(mut self, enabled: bool) -> Self {
        self.content_md5 = enabled;
        self
    }

    /// Replace the multipart boundary.
    pub fn multipart_boundary(mut self, boundary: impl Into<String>) -> Result<Self> {
        let boundary = boundary.into();
        if boundary.is_empty() {
            return Err(RestError::MissingArgument("boundary"));
        }
        if boundary.len() > 70 || !boundary.bytes().all(|b| b.is_ascii_graphic()) {
            return Err(RestError::InvalidHeader(format!("invalid multipart boundary '{boundary}'")));
        }
        self.boundary = boundary;
        Ok(self)
    }

    /// Write a keyed text value to the body, encoded with the builder's
    /// encoding. See [`add_body_bytes`](Self::add_body_bytes).
    pub fn add_body(self, key: &str, value: &str) -> Result<Self> {
        let encoded = self.encode_text(value);
        self.add_body_bytes(key, encoded)
    }

    /// Write a keyed value to the body.
    ///
    /// URL-encoded mode appends `key=value&`, multipart mode adds a
    /// form-data part named `key`; both require a non-empty key. Other modes
    /// append the value as-is and ignore the key. Does nothing for GET/HEAD.
    pub fn add_body_bytes(mut self, key: &str, value: impl AsRef<[u8]>) -> Result<Self> {
        if !self.body_writes_allowed() {
            return Ok(self);
        }
        let value = value.as_ref();

        match self.body_mode {
            BodyMode::UrlEncoded => {
                require_key(key)?;
                let key = self.encode_text(key);
                push_form_encoded(&mut self.body, &key);
                self.body.push(b'=');
                push_form_encoded(&mut self.body, value);
                self.body.push(b'&');
            }
            BodyMode::Multipart => {
                require_key(key)?;
                self.parts.push(Part::Field {
                    name: key.to_string(),
                    value: Bytes::copy_from_slice(value),
                });
            }
            BodyMode::None | BodyMode::Json | BodyMode::Xml | BodyMode::Raw => {
                self.body.extend_from_slice(value);
            }
        }
        Ok(self)
    }

    /// Serialize `value` as the body with an explicit serializer.
    ///
    /// Only the first body write counts: if anything has been written
    /// already, the payload is ignored.
    pub fn add_body_object<T, S>(mut self, value: &T, serializer: &S) -> Result<Self>
    where
        T: Serialize + ?Sized,
        S: Serializer,
    {
        if !self.accepts_payload() {
            return Ok(self);
        }
        let text = serializer.serialize(value)?;
        self.body = self.encode_text(&text);
        Ok(self)
    }

    /// Serialize `value` with the serializer matching the body mode (JSON or
    /// XML). Other modes log a warning and write nothing.
    pub fn add_body_serialized<T: Serialize + ?Sized>(self, value: &T) -> Result<Self> {
        match self.body_mode {
            BodyMode::Json => self.add_body_object(value, &JsonSerializer),
            BodyMode::Xml => self.add_body_object(value, &XmlSerializer::new()),
            mode => {
                tracing::warn!(
                    target: targets::REST_REQUEST,
                    ?mode,
                    "no serializer for body mode, payload skipped"
                );
                Ok(self)
            }
        }
    }

    /// Write a payload that serializes itself. Same first-write-wins rule
    /// as [`add_body_object`](Self::add_body_object).
    pub fn add_self_serialized<T: SelfSerialize + ?Sized>(mut self, value: &T) -> Result<Self> {
        if !self.accepts_payload() {
            return Ok(self);
        }
        let text = value.serialize_self()?;
        self.body = self.encode_text(&text);
        Ok(self)
    }

    /// Add a file. Multipart mode adds a file part, raw mode appends the
    /// bytes; other modes ignore the file with a warning. Does nothing for
    /// GET/HEAD.
    pub fn add_file(mut self, file: FileParameter) -> Self {
        if !self.body_writes_allowed() {
            return self;
        }
        match self.body_mode {
            BodyMode::Multipart => self.parts.push(Part::File(file)),
            BodyMode::Raw => self.body.extend_from_slice(&file.data),
            mode => {
                tracing::warn!(
                    target: targets::REST_REQUEST,
                    ?mode,
                    file = %file.file_name,
                    "files need multipart or raw body mode, file skipped"
                );
            }
        }
        self
    }

    /// Base URL plus the form-urlencoded parameter list, in insertion order.
    pub fn request_url(&self) -> Url {
        self.query.apply_to(&self.base_url)
    }

    /// The query parameters (URI ones first).
    pub fn parameters(&self) -> &QueryString {
        &self.query
    }

    /// Whether anything has been written to the body.
    pub fn has_body(&self) -> bool {
        !self.body.is_empty() || !self.parts.is_empty()
    }

    /// Finalize the request.
    ///
    /// GET and HEAD requests never carry a body. URL-encoded bodies lose
    /// their trailing `&`, multipart bodies get their closing boundary, and
    /// an empty JSON body becomes `{}`.
    pub fn build(mut self) -> RestRequest {
        let _span = PerfSpan::new("build_request");
        let method = self.method.unwrap_or_default();
        let url = self.request_url();

        let body = if method.allows_body() {
            self.finalize_body()
        } else {
            Bytes::new()
        };

        let mut headers = std::mem::take(&mut self.headers);
        let dedicated = std::mem::take(&mut self.dedicated);

        if method.allows_body() {
            let content_type = dedicated.content_type.or_else(|| {
                let charset = self.encoding.name().to_ascii_lowercase();
                self.body_mode
                    .content_type(&charset, &self.boundary)
                    .and_then(|ct| HeaderValue::from_str(&ct).ok())
            });
            if let Some(value) = content_type {
                headers.insert(header::CONTENT_TYPE, value);
            }
        }

        let accept = dedicated.accept.or_else(|| {
            self.accept_mode
                .accept_header()
                .map(HeaderValue::from_static)
        });
        for (name, value) in [
            (header::ACCEPT, accept),
            (header::CONNECTION, dedicated.connection),
            (header::EXPECT, dedicated.expect),
            (header::USER_AGENT, dedicated.user_agent),
            (header::DATE, dedicated.date),
            (header::HOST, dedicated.host),
        ] {
            if let Some(value) = value {
                headers.insert(name, value);
            }
        }

        if let Some(authorization) = self.authorization.take() {
            headers.insert(header::AUTHORIZATION, authorization);
        }
        if !self.cookies.is_empty() {
            if let Ok(value) = HeaderValue::from_str(&cookie::cookie_header(&self.cookies)) {
                headers.append(header::COOKIE, value);
            }
        }
        if self.content_md5 && !body.is_empty() {
            let digest = STANDARD.encode(Md5::digest(&body));
            if let Ok(value) = HeaderValue::from_str(&digest) {
                headers.insert(HeaderName::from_static("content-md5"), value);
            }
        }

        let log = render_log(method, &url, &headers, &body);
        tracing::debug!(
            target: targets::REST_REQUEST,
            %method,
            %url,
            body_len = body.len(),
            "request built"
        );
        tracing::trace!(target: targets::REST_REQUEST, "{log}");

        RestRequest {
            id: NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed),
            method,
            url,
            headers,
            body,
            timeout: self.timeout,
            proxy: self.proxy,
            identity: self.identity,
            log,
        }
    }

    fn body_writes_allowed(&self) -> bool {
        let allowed = self.method.is_none_or(Method::allows_body);
        if !allowed {
            tracing::trace!(target: targets::REST_REQUEST, "body write ignored for bodiless method");
        }
        allowed
    }

    /// Whether a serialized payload may be written: body-carrying method,
    /// nothing written yet, and a mode that takes a whole-document body.
    fn accepts_payload(&self) -> bool {
        if !self.body_writes_allowed() {
            return false;
        }
        if self.has_body() {
            tracing::debug!(target: targets::REST_REQUEST, "body already written, payload ignored");
            return false;
        }
        if self.body_mode == BodyMode::Multipart {
            tracing::warn!(target: targets::REST_REQUEST, "serialized payloads are not written in multipart mode");
            return false;
        }
        true
    }

    fn encode_text(&self, text: &str) -> Vec<u8> {
        let (bytes, _, _) = self.encoding.encode(text);
        bytes.into_owned()
    }

    fn finalize_body(&mut self) -> Bytes {
        match self.body_mode {
            BodyMode::UrlEncoded => {
                if self.body.last() == Some(&b'&') {
                    self.body.pop();
                }
                Bytes::from(std::mem::take(&mut self.body))
            }
            BodyMode::Multipart => multipart::render(&self.parts, &self.boundary),
            BodyMode::Json if self.body.is_empty() => Bytes::from_static(b"{}"),
            BodyMode::None | BodyMode::Json | BodyMode::Xml | BodyMode::Raw => {
                Bytes::from(std::mem::take(&mut self.body))
            }
        }
    }
}

fn require_key(key: &str) -> Result<()> {
    if key.is_empty() {
        Err(RestError::MissingArgument("key"))
    } else {
        Ok(())
    }
}

fn push_form_encoded(buf: &mut Vec<u8>, bytes: &[u8]) {
    for piece in form_urlencoded::byte_serialize(bytes) {
        buf.extend_from_slice(piece.as_bytes());
    }
}

fn render_log(method: Method, url: &Url, headers: &HeaderMap, body: &Bytes) -> String {
    let mut log = format!("{method} {url}\n");
    for (name, value) in headers {
        let shown = if name == header::AUTHORIZATION || name == header::PROXY_AUTHORIZATION {
            "<redacted>".into()
        } else {
            String::from_utf8_lossy(value.as_bytes())
        };
        log.push_str(&format!("{name}: {shown}\n"));
    }
    if !body.is_empty() {
        log.push('\n');
        let preview = &body[..body.len().min(LOG_BODY_PREVIEW)];
        log.push_str(&String::from_utf8_lossy(preview));
        if body.len() > LOG_BODY_PREVIEW {
            log.push_str(&format!("\n[{} bytes total]", body.len()));
        }
    }
    log
}
