//! LLM request/response types for Confab.
//!
//! The completion contract here is deliberately small: one request in, one
//! generated message out. Streaming, tool calling, and token accounting are
//! provider concerns this client does not consume.

use serde::{Deserialize, Serialize};

use crate::message::{Message, MessageRole};

/// Request to an LLM provider for a single completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
}

/// Response from an LLM provider for a completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub content: String,
    pub model: String,
}

/// Errors from LLM provider operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("provider error: {message}")]
    Provider { message: String },

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("rate limited")]
    RateLimited,

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("provider returned an empty completion")]
    EmptyCompletion,
}

impl CompletionRequest {
    /// Build a plain chat request from an ordered transcript.
    pub fn chat(
        model: impl Into<String>,
        system: impl Into<String>,
        messages: Vec<Message>,
        max_tokens: u32,
        temperature: f64,
    ) -> Self {
        Self {
            model: model.into(),
            messages,
            system: Some(system.into()),
            max_tokens,
            temperature: Some(temperature),
            top_p: None,
        }
    }
}

/// Convenience constructor used by request builders and tests.
pub fn user_message(content: impl Into<String>, timestamp: i64) -> Message {
    Message::new(MessageRole::User, content, timestamp)
}
