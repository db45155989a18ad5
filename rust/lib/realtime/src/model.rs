use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Notification item, as served by the list endpoint and pushed on the
/// realtime topics. Identity is `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    /// RFC 3339 timestamp.
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub is_read: bool,
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Order code or numeric id the notification points at.
    #[serde(default, deserialize_with = "string_or_number")]
    pub reference_id: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub receiver: Option<String>,
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}
