//! Request methods, body/accept modes and response-mode inference.

use std::fmt;

/// Default multipart boundary, shared by every request unless overridden
/// with [`RequestBuilder::multipart_boundary`](super::RequestBuilder::multipart_boundary).
pub const BOUNDARY: &str = "-----------------------------28947758029299";

/// Content types recognized as JSON responses.
const JSON_CONTENT_TYPES: &[&str] = &[
    "application/json",
    "text/json",
    "text/javascript",
    "text/x-json",
];

/// Content type recognized as an XML response.
const XML_CONTENT_TYPE: &str = "text/xml";

/// HTTP request methods.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Method {
    /// HTTP GET method.
    #[default]
    Get,
    /// HTTP POST method.
    Post,
    /// HTTP PUT method.
    Put,
    /// HTTP DELETE method.
    Delete,
    /// HTTP HEAD method.
    Head,
}

impl Method {
    /// Whether requests with this method carry a body. GET and HEAD never do.
    pub fn allows_body(self) -> bool {
        !matches!(self, Self::Get | Self::Head)
    }

    pub(crate) fn to_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Delete => reqwest::Method::DELETE,
            Self::Head => reqwest::Method::HEAD,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Put => write!(f, "PUT"),
            Self::Delete => write!(f, "DELETE"),
            Self::Head => write!(f, "HEAD"),
        }
    }
}

/// Wire encoding of the request body.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BodyMode {
    /// No body encoding; writes are appended raw and no Content-Type is sent.
    None,
    /// `application/x-www-form-urlencoded` key/value pairs.
    #[default]
    UrlEncoded,
    /// JSON document.
    Json,
    /// XML document.
    Xml,
    /// `multipart/form-data` parts.
    Multipart,
    /// Opaque bytes (`application/octet-stream`).
    Raw,
}

impl BodyMode {
    /// The Content-Type sent for this mode.
    ///
    /// `charset` is the lowercase encoding label; `boundary` is only used by
    /// multipart. Returns `None` for [`BodyMode::None`].
    pub fn content_type(self, charset: &str, boundary: &str) -> Option<String> {
        match self {
            Self::None => None,
            Self::UrlEncoded => Some(format!("application/x-www-form-urlencoded; charset={charset}")),
            Self::Json => Some(format!("application/json; charset={charset}")),
            Self::Xml => Some(format!("text/xml; charset={charset}")),
            Self::Multipart => Some(format!("multipart/form-data; boundary={boundary}")),
            Self::Raw => Some("application/octet-stream".to_string()),
        }
    }
}

/// Preferred response encoding announced through `Accept`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AcceptMode {
    /// No Accept header.
    #[default]
    None,
    /// `application/json`.
    Json,
    /// `text/xml`.
    Xml,
}

impl AcceptMode {
    /// The Accept header value for this mode.
    pub fn accept_header(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Json => Some("application/json"),
            Self::Xml => Some(XML_CONTENT_TYPE),
        }
    }
}

/// Payload encoding of a response, inferred from its Content-Type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ResponseMode {
    /// Unknown or absent content type.
    #[default]
    None,
    /// JSON payload.
    Json,
    /// XML payload.
    Xml,
}

impl ResponseMode {
    /// Infer the response mode from a Content-Type header value.
    ///
    /// Parameters after the first `;` are ignored and the comparison is
    /// case-insensitive.
    ///
    /// ```
    /// use framework_rest::http::ResponseMode;
    ///
    /// assert_eq!(ResponseMode::from_content_type(Some("application/json; charset=utf-8")), ResponseMode::Json);
    /// assert_eq!(ResponseMode::from_content_type(Some("text/xml")), ResponseMode::Xml);
    /// assert_eq!(ResponseMode::from_content_type(Some("text/plain")), ResponseMode::None);
    /// assert_eq!(ResponseMode::from_content_type(None), ResponseMode::None);
    /// ```
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        let Some(content_type) = content_type else {
            return Self::None;
        };
        let media_type = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim();

        if JSON_CONTENT_TYPES
            .iter()
            .any(|known| known.eq_ignore_ascii_case(media_type))
        {
            Self::Json
        } else if XML_CONTENT_TYPE.eq_ignore_ascii_case(media_type) {
            Self::Xml
        } else {
            Self::None
        }
    }
}

/// Outcome of a request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ResponseStatus {
    /// Not executed yet.
    #[default]
    None,
    /// A 2xx response was received and read.
    Completed,
    /// Non-success status, transport failure or deserialization failure.
    Error,
    /// The transport timed out.
    TimedOut,
}
