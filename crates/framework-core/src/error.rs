//! Error types for the core utilities.

/// The main error type for `framework-core` operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// A URL or resource string could not be parsed.
    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl {
        /// The offending input.
        url: String,
        /// Parser message.
        message: String,
    },

    /// A keyed operation was attempted on a value that is not an object.
    #[error("Expected an object value, found {found}")]
    NotAnObject {
        /// Kind of the value that was found instead.
        found: &'static str,
    },

    /// An indexed operation was attempted on a value that is not an array.
    #[error("Expected an array value, found {found}")]
    NotAnArray {
        /// Kind of the value that was found instead.
        found: &'static str,
    },

    /// The guarded resource has already been released.
    #[error("Resource has already been disposed")]
    Disposed,
}

impl CoreError {
    /// Create an invalid URL error.
    pub fn invalid_url(url: impl Into<String>, message: impl ToString) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            message: message.to_string(),
        }
    }
}

/// A specialized Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
