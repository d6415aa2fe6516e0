//! Typed response parsing.

use framework_core::logging::targets;
use serde::de::DeserializeOwned;

use super::modes::{ResponseMode, ResponseStatus};
use super::response::{Response, TypedResponse};
use super::serializer::{JsonSerializer, SelfDeserialize, Serializer, XmlSerializer};
use crate::error::{RestError, Result};

/// Decodes raw responses into typed payloads.
///
/// JSON responses go through `J`, XML responses through `X`; the response
/// mode decides which. Parsing depends only on the content bytes and the
/// declared content type, so parsing the same response twice yields equal
/// payloads.
///
/// ```
/// use framework_rest::http::{Response, ResponseMode, ResponseParser};
///
/// let response = Response {
///     raw_bytes: bytes::Bytes::from_static(br#"{"id":7}"#),
///     response_mode: ResponseMode::Json,
///     ..Default::default()
/// };
///
/// let typed = ResponseParser::new().parse::<serde_json::Value>(response);
/// assert_eq!(typed.data.unwrap()["id"], 7);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ResponseParser<J = JsonSerializer, X = XmlSerializer> {
    json: J,
    xml: X,
}

impl ResponseParser {
    /// Parser using [`JsonSerializer`] and [`XmlSerializer`].
    pub fn new() -> Self {
        Self::default()
    }
}

impl<J: Serializer, X: Serializer> ResponseParser<J, X> {
    /// Create a parser with custom serializers.
    pub fn with_serializers(json: J, xml: X) -> Self {
        Self { json, xml }
    }

    /// Deserialize the payload with the serializer for the response mode.
    ///
    /// Empty content and responses without a recognized mode produce no
    /// payload. A deserialization failure marks the response as `Error`
    /// and keeps all raw fields.
    pub fn parse<T: DeserializeOwned>(&self, response: Response) -> TypedResponse<T> {
        let result = if response.raw_bytes.is_empty() {
            Ok(None)
        } else {
            match response.response_mode {
                ResponseMode::Json => self.json.deserialize(&response.content()).map(Some),
                ResponseMode::Xml => self.xml.deserialize(&response.content()).map(Some),
                ResponseMode::None => Ok(None),
            }
        };
        finish(response, result)
    }

    /// Build the payload with `T::default()` and let it read the content.
    pub fn parse_self<T: SelfDeserialize + Default>(&self, response: Response) -> TypedResponse<T> {
        let result = if response.raw_bytes.is_empty() {
            Ok(None)
        } else {
            let mut value = T::default();
            value
                .deserialize_self(&response.content())
                .map(|()| Some(value))
        };
        finish(response, result)
    }
}

fn finish<T>(mut response: Response, result: Result<Option<T>>) -> TypedResponse<T> {
    let data = match result {
        Ok(data) => data,
        Err(err) => {
            let err = match err {
                RestError::Deserialization(_) => err,
                other => RestError::Deserialization(other.to_string()),
            };
            tracing::warn!(
                target: targets::REST_PARSER,
                mode = ?response.response_mode,
                error = %err,
                "failed to deserialize response"
            );
            response.fail(ResponseStatus::Error, err);
            None
        }
    };
    TypedResponse { response, data }
}
