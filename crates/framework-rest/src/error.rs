//! Error types for the REST client.

use framework_core::CoreError;

/// REST client errors.
///
/// Argument and header errors are returned from builder methods before any
/// I/O happens. Transport and deserialization failures never escape a request
/// call; they are stored on the returned response instead, which is why the
/// type is `Clone`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RestError {
    /// The resource URI is empty or could not be parsed.
    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl {
        /// The offending input.
        url: String,
        /// Parser message.
        message: String,
    },

    /// A required argument was empty.
    #[error("Missing required argument: {0}")]
    MissingArgument(&'static str),

    /// The header is restricted by the transport and has no dedicated setter.
    #[error("Header '{0}' is not supported on requests")]
    UnsupportedHeader(String),

    /// Invalid header name or value.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// A body payload could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A response payload could not be deserialized.
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// The server answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    HttpStatus {
        /// The HTTP status code.
        status: u16,
        /// Status description.
        message: String,
    },

    /// The exchange failed below HTTP (connect, TLS, I/O, timeout).
    #[error("Transport error (status {status}): {message}")]
    Transport {
        /// The HTTP status when known, otherwise 500.
        status: u16,
        /// Error message.
        message: String,
    },

    /// TLS material could not be loaded.
    #[error("TLS error: {0}")]
    Tls(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),
}

impl RestError {
    /// HTTP status associated with the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } | Self::Transport { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<CoreError> for RestError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidUrl { url, message } => Self::InvalidUrl { url, message },
            other => Self::Io(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for RestError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport {
            status: err.status().map_or(500, |s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for RestError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<http::header::InvalidHeaderName> for RestError {
    fn from(err: http::header::InvalidHeaderName) -> Self {
        Self::InvalidHeader(err.to_string())
    }
}

impl From<http::header::InvalidHeaderValue> for RestError {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        Self::InvalidHeader(err.to_string())
    }
}

/// A specialized Result type for REST operations.
pub type Result<T> = std::result::Result<T, RestError>;
