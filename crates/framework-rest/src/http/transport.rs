//! The HTTP exchange.
//!
//! [`exchange`] is the single routine that sends a [`RestRequest`] and
//! collects a [`Response`]. The async client API awaits it directly and the
//! blocking API drives it on the shared [`runtime`].
//!
//! Request bodies are streamed in `chunk_size` pieces with an optional delay
//! between pieces; response bodies are read fully into memory. Both report
//! cumulative byte counts through the client's progress signal. No error
//! escapes: failures are recorded on the returned response.

use std::sync::Arc;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use framework_core::Signal;
use framework_core::logging::targets;
use futures_util::{Stream, stream};
use http::StatusCode;
use http::header::{self, HeaderMap};
use url::Url;

use super::cookie;
use super::modes::{ResponseMode, ResponseStatus};
use super::progress::TransferProgress;
use super::request::RestRequest;
use super::response::Response;
use crate::error::RestError;

/// Chunking and redirect parameters for one exchange.
#[derive(Clone, Copy, Debug)]
pub(crate) struct TransferSettings {
    pub chunk_size: usize,
    pub chunk_delay: Duration,
    pub follow_redirects: bool,
    pub max_redirects: usize,
}

/// Send `request` and collect the response.
pub(crate) async fn exchange(
    http: &reqwest::Client,
    request: Arc<RestRequest>,
    settings: TransferSettings,
    progress: Arc<Signal<TransferProgress>>,
) -> Response {
    let mut response = Response {
        request: Some(request.clone()),
        ..Default::default()
    };

    tracing::debug!(
        target: targets::REST_TRANSPORT,
        id = request.id,
        method = %request.method,
        url = %request.url,
        "sending request"
    );

    // reqwest cannot replay a streamed body, so 307/308 are followed here.
    let mut url = request.url.clone();
    let mut headers = request.headers.clone();
    let mut redirects = 0;
    let reply = loop {
        let reply = match send(http, &request, &url, &headers, settings, &progress).await {
            Ok(reply) => reply,
            Err(err) => {
                record_transport_error(&mut response, &err);
                return response;
            }
        };
        match replay_target(&request, &reply, settings) {
            Some(next) if redirects < settings.max_redirects => {
                redirects += 1;
                if next.origin() != url.origin() {
                    strip_credentials(&mut headers);
                }
                tracing::debug!(
                    target: targets::REST_TRANSPORT,
                    id = request.id,
                    status = reply.status().as_u16(),
                    to = %next,
                    "re-sending body to redirect target"
                );
                url = next;
            }
            _ => break reply,
        }
    };

    let status = reply.status();
    response.status_code = status.as_u16();
    response.status_description = status.canonical_reason().unwrap_or_default().to_string();
    response.response_uri = Some(reply.url().clone());
    response.cookies = cookie::from_headers(reply.headers());
    response.content_type = reply
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    response.response_mode = ResponseMode::from_content_type(response.content_type.as_deref());
    response.headers = reply.headers().clone();

    let (body, read_error) = read_body(reply, request.id, settings.chunk_size, &progress).await;
    response.raw_bytes = body;

    if let Some(err) = read_error {
        record_transport_error(&mut response, &err);
    } else if status.is_success() {
        response.status = ResponseStatus::Completed;
    } else {
        tracing::warn!(
            target: targets::REST_TRANSPORT,
            status = response.status_code,
            url = %request.url,
            "request failed with HTTP status"
        );
        let message = response.status_description.clone();
        response.fail(
            ResponseStatus::Error,
            RestError::HttpStatus {
                status: response.status_code,
                message,
            },
        );
    }

    tracing::debug!(
        target: targets::REST_TRANSPORT,
        id = request.id,
        status = response.status_code,
        bytes = response.raw_bytes.len(),
        outcome = ?response.status,
        "response received"
    );
    response
}

/// Send the request once to `url`, streaming the body when there is one.
async fn send(
    http: &reqwest::Client,
    request: &RestRequest,
    url: &Url,
    headers: &HeaderMap,
    settings: TransferSettings,
    progress: &Arc<Signal<TransferProgress>>,
) -> Result<reqwest::Response, reqwest::Error> {
    let mut builder = http
        .request(request.method.to_reqwest(), url.clone())
        .headers(headers.clone());
    if let Some(timeout) = request.timeout {
        builder = builder.timeout(timeout);
    }
    if request.method.allows_body() {
        let length = request.body.len();
        builder = builder.header(header::CONTENT_LENGTH, length);
        builder = if length == 0 {
            builder.body(Bytes::new())
        } else {
            let chunks = upload_chunks(
                request.body.clone(),
                request.id,
                url.clone(),
                settings,
                progress.clone(),
            );
            builder.body(reqwest::Body::wrap_stream(chunks))
        };
    }
    builder.send().await
}

/// Where to re-send a streamed body after a 307 or 308 that reqwest handed
/// back unfollowed.
fn replay_target(
    request: &RestRequest,
    reply: &reqwest::Response,
    settings: TransferSettings,
) -> Option<Url> {
    let replays = matches!(
        reply.status(),
        StatusCode::TEMPORARY_REDIRECT | StatusCode::PERMANENT_REDIRECT
    );
    if !settings.follow_redirects || !replays || request.body.is_empty() {
        return None;
    }
    let location = reply.headers().get(header::LOCATION)?.to_str().ok()?;
    reply.url().join(location).ok()
}

/// Drop headers that must not follow a redirect to another origin.
fn strip_credentials(headers: &mut HeaderMap) {
    for name in [
        header::AUTHORIZATION,
        header::COOKIE,
        header::PROXY_AUTHORIZATION,
        header::HOST,
    ] {
        headers.remove(name);
    }
}

fn upload_chunks(
    body: Bytes,
    request_id: u64,
    url: Url,
    settings: TransferSettings,
    progress: Arc<Signal<TransferProgress>>,
) -> impl Stream<Item = std::io::Result<Bytes>> + Send + Sync + 'static {
    let total = body.len() as u64;
    let chunk_size = settings.chunk_size.max(1);
    let delay = settings.chunk_delay;

    stream::unfold(0usize, move |offset| {
        let body = body.clone();
        let url = url.clone();
        let progress = progress.clone();
        async move {
            if offset >= body.len() {
                return None;
            }
            if offset > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let end = (offset + chunk_size).min(body.len());
            let chunk = body.slice(offset..end);
            progress.emit(TransferProgress::upload(request_id, url, end as u64, total));
            Some((Ok(chunk), end))
        }
    })
}

/// Read the whole response body. On a read failure the bytes received so
/// far are returned together with the error.
async fn read_body(
    mut reply: reqwest::Response,
    request_id: u64,
    chunk_size: usize,
    progress: &Signal<TransferProgress>,
) -> (Bytes, Option<reqwest::Error>) {
    let total = reply.content_length();
    let url = reply.url().clone();
    let chunk_size = chunk_size.max(1);
    let mut buffer = BytesMut::new();

    loop {
        match reply.chunk().await {
            Ok(Some(chunk)) => {
                for piece in chunk.chunks(chunk_size) {
                    buffer.extend_from_slice(piece);
                    progress.emit(TransferProgress::download(
                        request_id,
                        url.clone(),
                        buffer.len() as u64,
                        total,
                    ));
                }
            }
            Ok(None) => return (buffer.freeze(), None),
            Err(err) => return (buffer.freeze(), Some(err)),
        }
    }
}

fn record_transport_error(response: &mut Response, err: &reqwest::Error) {
    let status = if err.is_timeout() {
        ResponseStatus::TimedOut
    } else {
        ResponseStatus::Error
    };
    let known_status = err
        .status()
        .map(|s| s.as_u16())
        .or((response.status_code != 0).then_some(response.status_code));

    tracing::warn!(
        target: targets::REST_TRANSPORT,
        error = %err,
        timed_out = err.is_timeout(),
        "transport failure"
    );
    response.fail(
        status,
        RestError::Transport {
            status: known_status.unwrap_or(500),
            message: err.to_string(),
        },
    );
}

/// Global async runtime backing the blocking API.
pub mod runtime {
    use std::sync::OnceLock;
    use tokio::runtime::Runtime;

    static RUNTIME: OnceLock<Runtime> = OnceLock::new();

    /// Initialize the async runtime.
    ///
    /// If not called explicitly, a runtime will be created on first use.
    pub fn init() -> &'static Runtime {
        RUNTIME.get_or_init(|| {
            tokio::runtime::Builder::new_multi_thread()
                .worker_threads(2)
                .thread_name("framework-rest")
                .enable_all()
                .build()
                .expect("Failed to create tokio runtime")
        })
    }

    /// Get a reference to the async runtime.
    pub fn get() -> &'static Runtime {
        init()
    }

    /// Block on a future using the global runtime.
    ///
    /// # Panics
    ///
    /// Panics when called from inside an async context. Use the `_async`
    /// client methods there instead.
    pub fn block_on<F: std::future::Future>(future: F) -> F::Output {
        get().block_on(future)
    }

    /// Spawn a future on the global runtime.
    pub fn spawn<F>(future: F) -> tokio::task::JoinHandle<F::Output>
    where
        F: std::future::Future + Send + 'static,
        F::Output: Send + 'static,
    {
        get().spawn(future)
    }
}
