//! REST client implementation.

use std::sync::Arc;
use std::time::Duration;

use framework_core::Signal;
use framework_core::logging::targets;
use reqwest::redirect::Policy;
use serde::de::DeserializeOwned;

use super::modes::{Method, ResponseStatus};
use super::parser::ResponseParser;
use super::progress::TransferProgress;
use super::request::{ProxySettings, RequestBuilder, RestRequest};
use super::response::{Response, TypedResponse};
use super::serializer::SelfDeserialize;
use super::transport::{self, TransferSettings, runtime};
use crate::error::Result;
use crate::tls::{Certificate, Identity};

/// Default size of body chunks for streaming and progress reporting.
pub const DEFAULT_CHUNK_SIZE: usize = 16 * 1024;

/// Configuration for the REST client.
#[derive(Clone, Debug)]
pub struct RestClientConfig {
    /// Request timeout.
    pub timeout: Option<Duration>,
    /// Connect timeout.
    pub connect_timeout: Option<Duration>,
    /// Whether to follow redirects.
    pub follow_redirects: bool,
    /// Maximum number of redirects to follow.
    pub max_redirects: usize,
    /// Whether to keep a cookie store shared by all requests of this client.
    pub cookies_enabled: bool,
    /// Default user agent.
    pub user_agent: Option<String>,
    /// Default proxy.
    pub proxy: Option<ProxySettings>,
    /// Extra trusted root certificates.
    pub root_certificates: Vec<Certificate>,
    /// Size of body chunks for streaming and progress reporting.
    pub chunk_size: usize,
    /// Pause between request body chunks.
    pub chunk_delay: Duration,
}

impl Default for RestClientConfig {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(30)),
            connect_timeout: Some(Duration::from_secs(10)),
            follow_redirects: true,
            max_redirects: 10,
            cookies_enabled: false,
            user_agent: Some(format!("Framework/{} (Rust)", env!("CARGO_PKG_VERSION"))),
            proxy: None,
            root_certificates: Vec::new(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_delay: Duration::ZERO,
        }
    }
}

impl RestClientConfig {
    fn transfer_settings(&self) -> TransferSettings {
        TransferSettings {
            chunk_size: self.chunk_size,
            chunk_delay: self.chunk_delay,
            follow_redirects: self.follow_redirects,
            max_redirects: self.max_redirects,
        }
    }

    /// Build a reqwest client from this configuration, with optional
    /// per-request proxy and client identity overrides.
    fn http_client(
        &self,
        proxy: Option<&ProxySettings>,
        identity: Option<&Identity>,
    ) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder();

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(connect_timeout) = self.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }

        builder = if self.follow_redirects {
            builder.redirect(Policy::limited(self.max_redirects))
        } else {
            builder.redirect(Policy::none())
        };

        if self.cookies_enabled {
            builder = builder.cookie_store(true);
        }
        if let Some(ref ua) = self.user_agent {
            builder = builder.user_agent(ua);
        }
        if let Some(proxy) = proxy.or(self.proxy.as_ref()) {
            builder = builder.proxy(proxy.to_reqwest()?);
        }
        for cert in &self.root_certificates {
            for reqwest_cert in cert.to_reqwest_certificates() {
                builder = builder.add_root_certificate(reqwest_cert);
            }
        }
        if let Some(identity) = identity {
            builder = builder.identity(identity.to_reqwest_identity()?);
        }

        Ok(builder.build()?)
    }
}

/// Builder for creating a REST client with custom configuration.
#[derive(Default)]
pub struct RestClientBuilder {
    config: RestClientConfig,
}

impl RestClientBuilder {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Disable request timeout.
    pub fn no_timeout(mut self) -> Self {
        self.config.timeout = None;
        self
    }

    /// Set the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = Some(timeout);
        self
    }

    /// Disable redirect following.
    pub fn no_redirects(mut self) -> Self {
        self.config.follow_redirects = false;
        self
    }

    /// Set the maximum number of redirects to follow.
    pub fn max_redirects(mut self, max: usize) -> Self {
        self.config.max_redirects = max;
        self
    }

    /// Keep cookies set by responses and send them on later requests.
    pub fn cookie_store(mut self, enabled: bool) -> Self {
        self.config.cookies_enabled = enabled;
        self
    }

    /// Set the user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = Some(user_agent.into());
        self
    }

    /// Route all requests through a proxy.
    pub fn proxy(mut self, proxy: ProxySettings) -> Self {
        self.config.proxy = Some(proxy);
        self
    }

    /// Add a custom root certificate to trust.
    pub fn add_root_certificate(mut self, cert: Certificate) -> Self {
        self.config.root_certificates.push(cert);
        self
    }

    /// Set the body chunk size used for streaming and progress events.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size.max(1);
        self
    }

    /// Pause between request body chunks.
    pub fn chunk_delay(mut self, delay: Duration) -> Self {
        self.config.chunk_delay = delay;
        self
    }

    /// Build the REST client.
    pub fn build(self) -> Result<RestClient> {
        let http = self.config.http_client(None, None)?;
        Ok(RestClient {
            inner: Arc::new(RestClientInner {
                http,
                config: self.config,
                parser: ResponseParser::new(),
                progress: Arc::new(Signal::new()),
            }),
        })
    }
}

/// Internal state for the REST client.
struct RestClientInner {
    http: reqwest::Client,
    config: RestClientConfig,
    parser: ResponseParser,
    progress: Arc<Signal<TransferProgress>>,
}

/// A REST client executing [`RequestBuilder`]s.
///
/// Every call returns a [`Response`]; network failures and non-success
/// statuses are reported through its status fields, never as a panic or
/// `Err`. Blocking methods run on the shared [`runtime`] and must not be
/// called from async code; use the `_async` variants there.
///
/// The client is cheaply cloneable and thread-safe. Clones share the same
/// connection pool, configuration and progress signal.
///
/// # Example
///
/// ```ignore
/// use framework_rest::http::{BodyMode, RequestBuilder, RestClient};
///
/// let client = RestClient::new();
/// client.progress_changed().connect(|p| println!("{:?}: {}", p.direction, p.bytes_transferred));
///
/// let request = RequestBuilder::new("https://api.example.com/login")?
///     .add_body("user", "ada")?
///     .add_body("password", "secret")?;
/// let response = client.post(request);
/// if !response.is_success() {
///     eprintln!("login failed: {:?}", response.error_message);
/// }
/// ```
#[derive(Clone)]
pub struct RestClient {
    inner: Arc<RestClientInner>,
}

impl Default for RestClient {
    fn default() -> Self {
        Self::new()
    }
}

impl RestClient {
    /// Create a new REST client with default configuration.
    pub fn new() -> Self {
        RestClientBuilder::new()
            .build()
            .expect("Failed to create REST client with default configuration")
    }

    /// Create a builder for configuring a new REST client.
    pub fn builder() -> RestClientBuilder {
        RestClientBuilder::new()
    }

    /// Get the client's configuration.
    pub fn config(&self) -> &RestClientConfig {
        &self.inner.config
    }

    /// Signal emitted with cumulative progress while bodies are transferred.
    pub fn progress_changed(&self) -> &Arc<Signal<TransferProgress>> {
        &self.inner.progress
    }

    /// Build and send a request, blocking until the response is read.
    pub fn execute(&self, request: RequestBuilder) -> Response {
        runtime::block_on(self.execute_async(request))
    }

    /// Build and send a request.
    pub async fn execute_async(&self, request: RequestBuilder) -> Response {
        self.send(Arc::new(request.build())).await
    }

    /// Send an already built request.
    pub async fn send(&self, request: Arc<RestRequest>) -> Response {
        let settings = self.inner.config.transfer_settings();
        let progress = self.inner.progress.clone();

        if request.proxy.is_none() && request.identity.is_none() {
            return transport::exchange(&self.inner.http, request, settings, progress).await;
        }

        match self
            .inner
            .config
            .http_client(request.proxy.as_ref(), request.identity.as_ref())
        {
            Ok(http) => transport::exchange(&http, request, settings, progress).await,
            Err(err) => {
                tracing::warn!(
                    target: targets::REST_TRANSPORT,
                    error = %err,
                    "failed to configure client for request"
                );
                let mut response = Response {
                    request: Some(request),
                    ..Default::default()
                };
                response.fail(ResponseStatus::Error, err);
                response
            }
        }
    }

    /// Send a GET request (blocking).
    pub fn get(&self, request: RequestBuilder) -> Response {
        self.execute(request.method(Method::Get))
    }

    /// Send a POST request (blocking).
    pub fn post(&self, request: RequestBuilder) -> Response {
        self.execute(request.method(Method::Post))
    }

    /// Send a PUT request (blocking).
    pub fn put(&self, request: RequestBuilder) -> Response {
        self.execute(request.method(Method::Put))
    }

    /// Send a DELETE request (blocking).
    pub fn delete(&self, request: RequestBuilder) -> Response {
        self.execute(request.method(Method::Delete))
    }

    /// Send a HEAD request (blocking).
    pub fn head(&self, request: RequestBuilder) -> Response {
        self.execute(request.method(Method::Head))
    }

    /// Send a GET request.
    pub async fn get_async(&self, request: RequestBuilder) -> Response {
        self.execute_async(request.method(Method::Get)).await
    }

    /// Send a POST request.
    pub async fn post_async(&self, request: RequestBuilder) -> Response {
        self.execute_async(request.method(Method::Post)).await
    }

    /// Send a PUT request.
    pub async fn put_async(&self, request: RequestBuilder) -> Response {
        self.execute_async(request.method(Method::Put)).await
    }

    /// Send a DELETE request.
    pub async fn delete_async(&self, request: RequestBuilder) -> Response {
        self.execute_async(request.method(Method::Delete)).await
    }

    /// Send a HEAD request.
    pub async fn head_async(&self, request: RequestBuilder) -> Response {
        self.execute_async(request.method(Method::Head)).await
    }

    /// Send a request and deserialize the payload (blocking).
    pub fn execute_as<T: DeserializeOwned>(&self, request: RequestBuilder) -> TypedResponse<T> {
        self.inner.parser.parse(self.execute(request))
    }

    /// Send a request and deserialize the payload.
    pub async fn execute_as_async<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> TypedResponse<T> {
        let response = self.execute_async(request).await;
        self.inner.parser.parse(response)
    }

    /// Send a request and let the payload type decode itself (blocking).
    pub fn execute_self_as<T: SelfDeserialize + Default>(
        &self,
        request: RequestBuilder,
    ) -> TypedResponse<T> {
        self.inner.parser.parse_self(self.execute(request))
    }

    /// Send a request and let the payload type decode itself.
    pub async fn execute_self_as_async<T: SelfDeserialize + Default>(
        &self,
        request: RequestBuilder,
    ) -> TypedResponse<T> {
        let response = self.execute_async(request).await;
        self.inner.parser.parse_self(response)
    }

    /// GET and deserialize (blocking).
    pub fn get_as<T: DeserializeOwned>(&self, request: RequestBuilder) -> TypedResponse<T> {
        self.execute_as(request.method(Method::Get))
    }

    /// POST and deserialize (blocking).
    pub fn post_as<T: DeserializeOwned>(&self, request: RequestBuilder) -> TypedResponse<T> {
        self.execute_as(request.method(Method::Post))
    }

    /// GET and deserialize.
    pub async fn get_as_async<T: DeserializeOwned>(&self, request: RequestBuilder) -> TypedResponse<T> {
        self.execute_as_async(request.method(Method::Get)).await
    }

    /// POST and deserialize.
    pub async fn post_as_async<T: DeserializeOwned>(&self, request: RequestBuilder) -> TypedResponse<T> {
        self.execute_as_async(request.method(Method::Post)).await
    }
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("config", &self.inner.config)
            .field("progress", &self.inner.progress)
            .finish()
    }
}
