//! Response types.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use bytes::Bytes;
use encoding_rs::Encoding;
use url::Url;

use super::cookie::Cookie;
use super::modes::{ResponseMode, ResponseStatus};
use super::request::RestRequest;
use crate::error::RestError;

/// The result of a request.
///
/// A response is returned for every call, including failed ones: inspect
/// [`status`](Self::status) and [`error`](Self::error) rather than expecting
/// an `Err`. For non-success HTTP statuses all fields are still populated
/// from what the server sent.
#[derive(Clone, Debug, Default)]
pub struct Response {
    /// HTTP status code, 0 when no response was received.
    pub status_code: u16,
    /// Reason phrase for the status code.
    pub status_description: String,
    /// Response headers.
    pub headers: http::HeaderMap,
    /// Cookies from `Set-Cookie` headers.
    pub cookies: Vec<Cookie>,
    /// Raw body bytes (possibly partial on error).
    pub raw_bytes: Bytes,
    /// Declared Content-Type.
    pub content_type: Option<String>,
    /// Payload encoding inferred from the Content-Type.
    pub response_mode: ResponseMode,
    /// Final URL after redirects.
    pub response_uri: Option<Url>,
    /// Outcome of the call.
    pub status: ResponseStatus,
    /// Human-readable error description.
    pub error_message: Option<String>,
    /// The error, when `status` is `Error` or `TimedOut`.
    pub error: Option<RestError>,
    /// The request that produced this response.
    pub request: Option<Arc<RestRequest>>,
}

impl Response {
    /// Check if the call completed with a 2xx status.
    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Completed
    }

    /// Get a specific header value.
    pub fn header(&self, name: impl AsRef<str>) -> Option<&str> {
        self.headers
            .get(name.as_ref())
            .and_then(|v| v.to_str().ok())
    }

    /// Number of body bytes received.
    pub fn content_length(&self) -> u64 {
        self.raw_bytes.len() as u64
    }

    /// Body decoded as text.
    ///
    /// Uses the `charset` parameter of the Content-Type when it names a known
    /// encoding, UTF-8 otherwise. Invalid sequences become U+FFFD.
    pub fn content(&self) -> String {
        let (text, _, _) = self.encoding().decode(&self.raw_bytes);
        text.into_owned()
    }

    /// Encoding named by the Content-Type charset, defaulting to UTF-8.
    pub fn encoding(&self) -> &'static Encoding {
        self.content_type
            .as_deref()
            .and_then(charset)
            .and_then(|label| Encoding::for_label(label.as_bytes()))
            .unwrap_or(encoding_rs::UTF_8)
    }

    /// Record a failure. The first recorded error is kept.
    pub(crate) fn fail(&mut self, status: ResponseStatus, error: RestError) {
        self.status = status;
        if self.error.is_none() {
            self.error_message = Some(error.to_string());
            self.error = Some(error);
        }
    }
}

/// Extract the `charset` parameter of a Content-Type value.
fn charset(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"'))
    })
}

/// A response with a deserialized payload.
///
/// Dereferences to the underlying [`Response`].
#[derive(Clone, Debug)]
pub struct TypedResponse<T> {
    /// The raw response.
    pub response: Response,
    /// The payload, if the content could be deserialized.
    pub data: Option<T>,
}

impl<T> TypedResponse<T> {
    /// Borrow the payload.
    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    /// Take the payload, dropping the response.
    pub fn into_data(self) -> Option<T> {
        self.data
    }

    /// Split into the raw response and the payload.
    pub fn into_parts(self) -> (Response, Option<T>) {
        (self.response, self.data)
    }
}

impl<T> Deref for TypedResponse<T> {
    type Target = Response;

    fn deref(&self) -> &Response {
        &self.response
    }
}

impl<T> DerefMut for TypedResponse<T> {
    fn deref_mut(&mut self) -> &mut Response {
        &mut self.response
    }
}
