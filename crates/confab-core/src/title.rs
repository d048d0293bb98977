//! Chat title generation via LLM.
//!
//! `generate_title` produces a short title for a new chat session from its
//! first user/assistant exchange. The policy deciding *when* to call this
//! lives in the send flow; this module only owns the call itself.

use tracing::instrument;

use confab_types::llm::{CompletionRequest, LlmError};
use confab_types::message::{Message, MessageRole};

use crate::llm::box_provider::BoxLlmProvider;
use crate::sync::now_ms;

/// System prompt for the title generation call.
const TITLE_SYSTEM_PROMPT: &str = "Based on the following two messages, generate a very short and concise title (3-5 words) for this new chat session. The title should capture the main topic or question. Do not include any prefixes like 'Title:'. Just return the title itself.";

/// Titles are short; low temperature keeps them factual.
const TITLE_MAX_TOKENS: u32 = 20;
const TITLE_TEMPERATURE: f64 = 0.3;
const TITLE_TOP_P: f64 = 0.9;

/// Generate a chat title from the first user/assistant exchange.
///
/// Returns the trimmed title, or [`LlmError::EmptyCompletion`] when the
/// provider answers with nothing usable.
#[instrument(name = "generate_title", skip(provider, user_text, assistant_text), fields(model = %model))]
pub async fn generate_title(
    provider: &BoxLlmProvider,
    user_text: &str,
    assistant_text: &str,
    model: &str,
) -> Result<String, LlmError> {
    let now = now_ms();
    let request = CompletionRequest {
        model: model.to_string(),
        messages: vec![
            Message::new(MessageRole::User, user_text, now),
            Message::new(MessageRole::Assistant, assistant_text, now),
        ],
        system: Some(TITLE_SYSTEM_PROMPT.to_string()),
        max_tokens: TITLE_MAX_TOKENS,
        temperature: Some(TITLE_TEMPERATURE),
        top_p: Some(TITLE_TOP_P),
    };

    let response = provider.complete(&request).await?;
    let title = response.content.trim().to_string();
    if title.is_empty() {
        return Err(LlmError::EmptyCompletion);
    }
    Ok(title)
}
