//! Chat message types for Confab.
//!
//! Messages are role-tagged text with an epoch-millisecond timestamp.
//! The persistence service is inconsistent about timestamp encoding (some
//! records carry JSON numbers, older ones RFC 3339 strings), so the wire
//! form accepts both and always normalizes to a number.

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// Role of a message within a chat session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "system" => Ok(MessageRole::System),
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            other => Err(format!("invalid message role: '{other}'")),
        }
    }
}

/// A single message within a chat session.
///
/// Immutable once persisted. Ordering within a session is by `timestamp`
/// ascending, ties broken by insertion order -- the sync engine never
/// reorders, it only appends or wholesale-replaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Server-assigned identifier; absent until the message is persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub role: MessageRole,
    pub content: String,
    /// Epoch milliseconds, normalized on decode (see [`timestamp_ms`]).
    #[serde(with = "timestamp_ms")]
    pub timestamp: i64,
}

impl Message {
    /// Construct an unpersisted message (no server id yet).
    pub fn new(role: MessageRole, content: impl Into<String>, timestamp: i64) -> Self {
        Self {
            id: None,
            role,
            content: content.into(),
            timestamp,
        }
    }
}

/// Serde helper normalizing timestamps to epoch milliseconds.
///
/// Accepts either a JSON number (already epoch ms) or an RFC 3339 / ISO 8601
/// date string; serializes as a number unconditionally.
pub mod timestamp_ms {
    use chrono::DateTime;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Millis(i64),
        Float(f64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(*value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Millis(ms) => Ok(ms),
            Raw::Float(f) => Ok(f as i64),
            Raw::Text(s) => DateTime::parse_from_rfc3339(&s)
                .map(|dt| dt.timestamp_millis())
                .map_err(|e| D::Error::custom(format!("invalid timestamp '{s}': {e}"))),
        }
    }
}
