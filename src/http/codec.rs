//! Wire-format codec
//!
//! The requestor serializes request payloads and deserializes response
//! bodies only through a [`Codec`], so the wire format is swappable.

use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Serializes values to and from wire text
pub trait Codec: Clone + Send + Sync + 'static {
    /// Content type attached to every encoded request body
    fn content_type(&self) -> &'static str;

    /// Encode a value
    fn serialize<T: Serialize + ?Sized>(&self, value: &T) -> Result<String>;

    /// Decode a value
    fn deserialize<T: DeserializeOwned>(&self, text: &str) -> Result<T>;

    /// Encode an optional payload; a missing payload encodes as an empty
    /// string.
    fn serialize_body<T: Serialize + ?Sized>(&self, value: Option<&T>) -> Result<String> {
        match value {
            Some(value) => self.serialize(value),
            None => Ok(String::new()),
        }
    }
}

/// JSON codec backed by serde_json
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn serialize<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        Ok(serde_json::to_string(value)?)
    }

    fn deserialize<T: DeserializeOwned>(&self, text: &str) -> Result<T> {
        Ok(serde_json::from_str(text)?)
    }
}
