//! The `{message, data}` wrapper carried by every backend JSON response.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Backend response envelope.
///
/// ```json
/// {"message": "ok", "data": {...}}
/// ```
///
/// Success responses carry the payload in `data`; error responses usually
/// carry only a user-facing `message`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Value,
}

impl Envelope {
    pub fn new(message: impl Into<String>, data: Value) -> Self {
        Self {
            message: message.into(),
            data,
        }
    }

    /// Parse a response body as an envelope.
    ///
    /// Returns `None` unless the body is a JSON object with at least one of
    /// `message` or `data`. An empty body is an envelope with `data: null`.
    pub fn parse(body: &[u8]) -> Option<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Some(Self::new("", Value::Null));
        }
        let value: Value = serde_json::from_slice(body).ok()?;
        let obj = value.as_object()?;
        if !obj.contains_key("message") && !obj.contains_key("data") {
            return None;
        }
        serde_json::from_value(value).ok()
    }

    /// Decode the inner payload into the caller's type.
    pub fn into_data<T: DeserializeOwned>(self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.data)
    }
}
