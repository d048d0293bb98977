//! Send flow controller.
//!
//! Sequences one send end to end: validate the composed content, ensure a
//! session exists, append the user message (optimistic + commit), invoke
//! the completion collaborator, append the assistant reply, and -- for a
//! session created by this very send -- run the title orchestrator.
//!
//! Completion failures do not abort the flow: they become a synthetic
//! system-role message in the transcript so the failure is visible where
//! the conversation happened, not just in the logs. The only errors this
//! module returns are pre-flight validation failures ([`SendError`]).

use tracing::{info, warn};

use confab_types::attachment::Attachment;
use confab_types::chat::Chat;
use confab_types::config::ClientConfig;
use confab_types::error::SendError;
use confab_types::llm::CompletionRequest;
use confab_types::message::{Message, MessageRole};

use crate::gateway::ChatGateway;
use crate::llm::box_provider::BoxLlmProvider;
use crate::sync::{now_ms, ChatSync};
use crate::title::generate_title;

/// Confirmation hook for oversized sends.
///
/// The CLI implements this with an interactive prompt; tests and
/// non-interactive callers use [`AutoConfirm`].
pub trait SendGate: Send + Sync {
    /// Whether a composed message of `chars` characters should be sent
    /// anyway. Returning false aborts the send with no state change.
    fn confirm_large_send(
        &self,
        chars: usize,
    ) -> impl std::future::Future<Output = bool> + Send;
}

/// A gate that always allows the send.
pub struct AutoConfirm;

impl SendGate for AutoConfirm {
    async fn confirm_large_send(&self, _chars: usize) -> bool {
        true
    }
}

/// Result of a completed send.
#[derive(Debug, Clone)]
pub struct SendOutcome {
    /// Session the exchange landed in (created by this send if none was
    /// active).
    pub chat_id: String,
    /// The assistant reply, or the synthetic system message on completion
    /// failure.
    pub reply: Message,
    /// Title generated for a newly created session, when that fired.
    pub title: Option<String>,
}

/// Compose user text and attachment blocks into a single message body.
///
/// Attachments render as delimited blocks joined by blank lines, appended
/// after the user text. The result is trimmed; an empty result means there
/// is nothing to send.
pub fn compose(text: &str, attachments: &[Attachment]) -> String {
    let blocks = attachments
        .iter()
        .map(Attachment::render)
        .collect::<Vec<_>>()
        .join("\n\n");

    let composed = if blocks.is_empty() {
        text.to_string()
    } else if text.trim().is_empty() {
        blocks
    } else {
        format!("{text}\n\n{blocks}")
    };
    composed.trim().to_string()
}

/// One-shot sequencing of message sends over a [`ChatSync`] engine.
pub struct SendFlow<'a, G: ChatGateway> {
    sync: &'a ChatSync<G>,
    provider: &'a BoxLlmProvider,
    config: &'a ClientConfig,
}

impl<'a, G: ChatGateway> SendFlow<'a, G> {
    pub fn new(
        sync: &'a ChatSync<G>,
        provider: &'a BoxLlmProvider,
        config: &'a ClientConfig,
    ) -> Self {
        Self {
            sync,
            provider,
            config,
        }
    }

    /// Send a message (plus any attachments) into the active session.
    ///
    /// Performs zero network calls when validation fails. Gateway and
    /// completion failures are resolved internally; the returned error is
    /// always a [`SendError`] validation case.
    pub async fn send(
        &self,
        gate: &impl SendGate,
        text: &str,
        attachments: &[Attachment],
    ) -> Result<SendOutcome, SendError> {
        let composed = compose(text, attachments);
        if composed.is_empty() {
            return Err(SendError::EmptyMessage);
        }

        let chars = composed.chars().count();
        if chars > self.config.confirm_threshold_chars && !gate.confirm_large_send(chars).await {
            info!(chars, "Oversized send declined");
            return Err(SendError::Declined);
        }

        // Ensure a session exists before anything is appended anywhere.
        let (chat, created_this_send) = match self.active_chat().await {
            Some(chat) => (chat, false),
            None => {
                let chat = self
                    .sync
                    .create_chat(None)
                    .await
                    .ok_or(SendError::SessionCreationFailed)?;
                (chat, true)
            }
        };

        // Append the user message: optimistic write, then commit.
        let user_message = Message::new(MessageRole::User, composed.clone(), now_ms());
        let mut messages = chat.messages.clone();
        messages.push(user_message);
        self.sync.replace_messages(&chat.id, messages).await;

        // The transcript sent to the model is the server-confirmed state.
        let transcript = match self.sync.chat(&chat.id).await {
            Some(chat) => chat.messages,
            None => Vec::new(),
        };

        let request = CompletionRequest::chat(
            self.config.model.clone(),
            self.config.system_prompt.clone(),
            transcript.clone(),
            self.config.max_tokens,
            self.config.temperature,
        );

        let completion = match self.provider.complete(&request).await {
            Ok(response) if !response.content.trim().is_empty() => Ok(response.content),
            Ok(_) => Err("no response content from provider".to_string()),
            Err(e) => Err(e.to_string()),
        };

        // Failure becomes a visible transcript message, not an error.
        let reply = match &completion {
            Ok(content) => Message::new(MessageRole::Assistant, content.clone(), now_ms()),
            Err(reason) => {
                warn!(chat_id = %chat.id, reason, "Completion failed, appending system notice");
                Message::new(MessageRole::System, format!("Error: {reason}"), now_ms())
            }
        };

        let mut messages = transcript;
        messages.push(reply.clone());
        self.sync.replace_messages(&chat.id, messages).await;

        let mut title = None;
        if created_this_send {
            if let Ok(assistant_text) = &completion {
                title = self.maybe_generate_title(&chat.id, &composed, assistant_text).await;
            }
        }

        Ok(SendOutcome {
            chat_id: chat.id,
            reply,
            title,
        })
    }

    /// Resolve the active session, null-checking the weak reference.
    async fn active_chat(&self) -> Option<Chat> {
        let id = self.sync.active_chat_id().await?;
        self.sync.chat(&id).await
    }

    /// Title orchestrator: fires once per session lifetime.
    ///
    /// Guards: the session was created by this very send (checked by the
    /// caller), the server-confirmed `title_generated` flag is still false,
    /// and both trigger messages carry real content. A failed generation
    /// is logged and leaves the flag false; no retry.
    async fn maybe_generate_title(
        &self,
        chat_id: &str,
        user_text: &str,
        assistant_text: &str,
    ) -> Option<String> {
        let confirmed = self.sync.chat(chat_id).await?;
        if confirmed.title_generated
            || user_text.trim().is_empty()
            || assistant_text.trim().is_empty()
        {
            return None;
        }

        match generate_title(self.provider, user_text, assistant_text, &self.config.model).await {
            Ok(title) => {
                info!(chat_id, title = %title, "Chat title generated");
                self.sync.update_title(chat_id, &title).await;
                Some(title)
            }
            Err(e) => {
                warn!(chat_id, error = %e, "Failed to generate chat title");
                None
            }
        }
    }
}
