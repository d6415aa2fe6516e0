//! Payload serializers.
//!
//! Request bodies and response payloads go through a [`Serializer`]. Two
//! implementations ship with the crate: [`JsonSerializer`] (serde_json) and
//! [`XmlSerializer`] (quick-xml). Types that encode themselves implement
//! [`SelfSerialize`] / [`SelfDeserialize`] instead and bypass both.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{RestError, Result};

/// A text serializer for request and response payloads.
pub trait Serializer {
    /// Content type produced by this serializer, without parameters.
    fn content_type(&self) -> &'static str;

    /// Encode a value as text.
    fn serialize<T: Serialize + ?Sized>(&self, value: &T) -> Result<String>;

    /// Decode a value from text.
    fn deserialize<T: DeserializeOwned>(&self, content: &str) -> Result<T>;
}

/// JSON serializer backed by `serde_json`.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn serialize<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        serde_json::to_string(value).map_err(|e| RestError::Serialization(e.to_string()))
    }

    fn deserialize<T: DeserializeOwned>(&self, content: &str) -> Result<T> {
        serde_json::from_str(content).map_err(|e| RestError::Deserialization(e.to_string()))
    }
}

/// XML serializer backed by `quick-xml`.
///
/// Structs serialize with their type name as the root element unless a root
/// name is configured.
#[derive(Clone, Debug, Default)]
pub struct XmlSerializer {
    root: Option<String>,
}

impl XmlSerializer {
    /// Serializer with the default (type-derived) root element.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializer that wraps values in `<root>...</root>`.
    pub fn with_root(root: impl Into<String>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }
}

impl Serializer for XmlSerializer {
    fn content_type(&self) -> &'static str {
        "text/xml"
    }

    fn serialize<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        let encoded = match &self.root {
            Some(root) => quick_xml::se::to_string_with_root(root, value),
            None => quick_xml::se::to_string(value),
        };
        encoded.map_err(|e| RestError::Serialization(e.to_string()))
    }

    fn deserialize<T: DeserializeOwned>(&self, content: &str) -> Result<T> {
        quick_xml::de::from_str(content).map_err(|e| RestError::Deserialization(e.to_string()))
    }
}

/// A payload that produces its own body text.
pub trait SelfSerialize {
    /// Encode `self` as body text.
    fn serialize_self(&self) -> Result<String>;
}

/// A payload that populates itself from response text.
///
/// The parser constructs the value with `Default` and then calls
/// [`deserialize_self`](Self::deserialize_self) with the decoded content.
pub trait SelfDeserialize {
    /// Fill `self` from the response content.
    fn deserialize_self(&mut self, content: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Item {
        id: u32,
        name: String,
    }

    #[test]
    fn test_json_serializer() {
        let json = JsonSerializer;
        let text = json
            .serialize(&Item {
                id: 1,
                name: "a".into(),
            })
            .unwrap();
        assert_eq!(text, r#"{"id":1,"name":"a"}"#);

        let item: Item = json.deserialize(&text).unwrap();
        assert_eq!(item.id, 1);
    }

    #[test]
    fn test_json_deserialize_error() {
        let err = JsonSerializer.deserialize::<Item>("{not json").unwrap_err();
        assert!(matches!(err, RestError::Deserialization(_)));
    }

    #[test]
    fn test_xml_serializer_uses_type_name() {
        let text = XmlSerializer::new()
            .serialize(&Item {
                id: 2,
                name: "b".into(),
            })
            .unwrap();
        assert_eq!(text, "<Item><id>2</id><name>b</name></Item>");
    }

    #[test]
    fn test_xml_serializer_custom_root() {
        let text = XmlSerializer::with_root("item")
            .serialize(&Item {
                id: 3,
                name: "c".into(),
            })
            .unwrap();
        assert_eq!(text, "<item><id>3</id><name>c</name></item>");

        let item: Item = XmlSerializer::new().deserialize(&text).unwrap();
        assert_eq!(
            item,
            Item {
                id: 3,
                name: "c".into()
            }
        );
    }

    #[test]
    fn test_content_types() {
        assert_eq!(JsonSerializer.content_type(), "application/json");
        assert_eq!(XmlSerializer::new().content_type(), "text/xml");
    }
}
