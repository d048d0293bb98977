//! Chat session types for Confab.
//!
//! A [`Chat`] is a persisted conversation: server-assigned id, title,
//! ordered messages, and recency timestamps. The wire form is camelCase
//! to match the persistence service's JSON records.

use serde::{Deserialize, Serialize};

use crate::message::{timestamp_ms, Message};

/// Placeholder title for freshly created chats, replaced once the title
/// generator has run on the first exchange.
pub const DEFAULT_CHAT_TITLE: &str = "New Chat";

/// A chat session between the user and the assistant.
///
/// `id` is server-assigned on creation and stable for the session lifetime.
/// `title_generated` transitions false -> true at most once and never
/// reverts; it gates automatic title generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub title_generated: bool,
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Epoch milliseconds; the server may send either a number or a date
    /// string, normalized on decode.
    #[serde(with = "timestamp_ms")]
    pub created_at: i64,
    #[serde(with = "timestamp_ms")]
    pub updated_at: i64,
}

impl Chat {
    /// Last message in the session, if any.
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}
