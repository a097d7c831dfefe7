//! Payload codecs keyed by media type.
//!
//! A [`Content`](crate::content::Content) holds its payload either as raw
//! bytes or as a decoded [`Value`]. The codec registered for its media type
//! converts between the two.

use crate::error::{CoreError, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const TEXT_CONTENT_TYPE: &str = "text/plain";

/// Converts between a payload's stored bytes and its decoded value.
pub trait Codec: Send + Sync {
    fn encode(&self, value: &Value) -> std::result::Result<Vec<u8>, String>;

    fn decode(&self, bytes: &[u8]) -> std::result::Result<Value, String>;
}

/// `application/json`
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode(&self, value: &Value) -> std::result::Result<Vec<u8>, String> {
        serde_json::to_vec(value).map_err(|e| e.to_string())
    }

    fn decode(&self, bytes: &[u8]) -> std::result::Result<Value, String> {
        serde_json::from_slice(bytes).map_err(|e| e.to_string())
    }
}

/// `text/plain`, decoded as a UTF-8 string value.
#[derive(Clone, Copy, Debug, Default)]
pub struct TextCodec;

impl Codec for TextCodec {
    fn encode(&self, value: &Value) -> std::result::Result<Vec<u8>, String> {
        match value {
            Value::String(s) => Ok(s.clone().into_bytes()),
            other => Err(format!("expected a string value, found {}", other)),
        }
    }

    fn decode(&self, bytes: &[u8]) -> std::result::Result<Value, String> {
        std::str::from_utf8(bytes)
            .map(|s| Value::String(s.to_string()))
            .map_err(|e| e.to_string())
    }
}

/// Strip media type parameters and normalize case:
/// `"Application/JSON; charset=utf-8"` becomes `"application/json"`.
pub fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// A shared registry of codecs.
///
/// Cloning is cheap; registering on a clone copies the table first so
/// existing holders keep their view.
#[derive(Clone)]
pub struct Codecs {
    table: Arc<HashMap<String, Arc<dyn Codec>>>,
}

impl Codecs {
    /// A registry with no codecs at all.
    pub fn empty() -> Self {
        Self {
            table: Arc::new(HashMap::new()),
        }
    }

    /// Register (or replace) the codec for a media type.
    pub fn register(&mut self, content_type: &str, codec: impl Codec + 'static) {
        Arc::make_mut(&mut self.table).insert(media_type(content_type), Arc::new(codec));
    }

    /// Find the codec for a content type, ignoring parameters.
    pub fn get(&self, content_type: &str) -> Option<&Arc<dyn Codec>> {
        self.table.get(&media_type(content_type))
    }

    pub fn contains(&self, content_type: &str) -> bool {
        self.get(content_type).is_some()
    }

    pub fn encode(&self, content_type: &str, value: &Value) -> Result<Vec<u8>> {
        let codec = self
            .get(content_type)
            .ok_or_else(|| CoreError::NoCodec(content_type.to_string()))?;
        codec.encode(value).map_err(|reason| CoreError::Codec {
            content_type: content_type.to_string(),
            reason,
        })
    }

    pub fn decode(&self, content_type: &str, bytes: &[u8]) -> Result<Value> {
        let codec = self
            .get(content_type)
            .ok_or_else(|| CoreError::NoCodec(content_type.to_string()))?;
        codec.decode(bytes).map_err(|reason| CoreError::Codec {
            content_type: content_type.to_string(),
            reason,
        })
    }
}

impl Default for Codecs {
    fn default() -> Self {
        let mut codecs = Self::empty();
        codecs.register(JSON_CONTENT_TYPE, JsonCodec);
        codecs.register(TEXT_CONTENT_TYPE, TextCodec);
        codecs
    }
}

impl fmt::Debug for Codecs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<_> = self.table.keys().collect();
        types.sort();
        f.debug_struct("Codecs").field("types", &types).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_media_type_normalization() {
        assert_eq!(media_type("Application/JSON; charset=utf-8"), "application/json");
        assert_eq!(media_type(" text/plain "), "text/plain");
    }

    #[test]
    fn test_default_codecs() {
        let codecs = Codecs::default();
        assert!(codecs.contains("application/json"));
        assert!(codecs.contains("text/plain; charset=utf-8"));
        assert!(!codecs.contains("application/octet-stream"));
    }

    #[test]
    fn test_json_codec() {
        let codecs = Codecs::default();
        let bytes = codecs.encode("application/json", &json!({"a": 1})).unwrap();
        assert_eq!(bytes, br#"{"a":1}"#.to_vec());
        assert_eq!(
            codecs.decode("application/json", &bytes).unwrap(),
            json!({"a": 1})
        );
    }

    #[test]
    fn test_text_codec_rejects_non_strings() {
        let codecs = Codecs::default();
        assert!(matches!(
            codecs.encode("text/plain", &json!(42)),
            Err(CoreError::Codec { .. })
        ));
        assert_eq!(
            codecs.decode("text/plain", b"hello").unwrap(),
            json!("hello")
        );
    }

    #[test]
    fn test_missing_codec() {
        let codecs = Codecs::default();
        assert_eq!(
            codecs.decode("image/png", b"\x89PNG"),
            Err(CoreError::NoCodec("image/png".to_string()))
        );
    }

    #[test]
    fn test_register_on_clone_is_isolated() {
        let base = Codecs::empty();
        let mut extended = base.clone();
        extended.register("application/x-text", TextCodec);
        assert!(extended.contains("application/x-text"));
        assert!(!base.contains("application/x-text"));
    }
}
