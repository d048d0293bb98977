//! OpenAiCompatProvider -- concrete [`LlmProvider`] for any OpenAI-style
//! chat completions endpoint (OpenAI, Azure OpenAI, local inference
//! servers exposing the same surface).
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is never logged
//! or included in `Debug` output.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use confab_core::llm::provider::LlmProvider;
use confab_types::llm::{CompletionRequest, CompletionResponse, LlmError};

use super::types::{ChatCompletionsRequest, ChatCompletionsResponse, WireMessage};

/// OpenAI-compatible chat completions provider.
pub struct OpenAiCompatProvider {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

impl OpenAiCompatProvider {
    /// Create a provider against the given endpoint base (e.g.
    /// `https://api.openai.com/v1`).
    pub fn new(api_key: SecretString, base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            // Long timeout: completions over large transcripts take a while.
            .timeout(Duration::from_secs(300))
            .build()
            .unwrap_or_default();

        Self {
            client,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Build the full API URL for a given path.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Flatten a [`CompletionRequest`] into the wire shape: the system
    /// prompt becomes the leading `system` message.
    fn to_wire_request(request: &CompletionRequest) -> ChatCompletionsRequest {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if let Some(system) = &request.system {
            messages.push(WireMessage {
                role: "system".to_string(),
                content: system.clone(),
            });
        }
        messages.extend(request.messages.iter().map(|m| WireMessage {
            role: m.role.to_string(),
            content: m.content.clone(),
        }));

        ChatCompletionsRequest {
            model: request.model.clone(),
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            top_p: request.top_p,
        }
    }
}

// OpenAiCompatProvider intentionally does NOT derive Debug so the API key
// cannot leak through formatting.

impl LlmProvider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        "openai-compat"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = Self::to_wire_request(request);
        let url = self.url("/chat/completions");

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Provider {
                message: format!("HTTP request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => LlmError::AuthenticationFailed,
                429 => LlmError::RateLimited,
                400 | 422 => LlmError::InvalidRequest(error_body),
                _ => LlmError::Provider {
                    message: format!("HTTP {status}: {error_body}"),
                },
            });
        }

        let wire: ChatCompletionsResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Deserialization(format!("failed to parse response: {e}")))?;

        let content = wire
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();
        if content.trim().is_empty() {
            return Err(LlmError::EmptyCompletion);
        }

        let model = if wire.model.is_empty() {
            request.model.clone()
        } else {
            wire.model
        };
        Ok(CompletionResponse { content, model })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use confab_types::llm::user_message;

    fn make_provider() -> OpenAiCompatProvider {
        OpenAiCompatProvider::new(
            SecretString::from("test-key-not-real"),
            "https://api.openai.com/v1",
        )
    }

    #[test]
    fn test_provider_name() {
        assert_eq!(make_provider().name(), "openai-compat");
    }

    #[test]
    fn test_url_strips_trailing_slash() {
        let provider =
            OpenAiCompatProvider::new(SecretString::from("k"), "http://localhost:8080/v1/");
        assert_eq!(
            provider.url("/chat/completions"),
            "http://localhost:8080/v1/chat/completions"
        );
    }

    #[test]
    fn test_system_prompt_becomes_leading_message() {
        let request = CompletionRequest::chat(
            "gpt-4.1",
            "Be concise.",
            vec![user_message("hello", 1000)],
            1024,
            0.7,
        );
        let wire = OpenAiCompatProvider::to_wire_request(&request);
        assert_eq!(wire.messages.len(), 2);
        assert_eq!(wire.messages[0].role, "system");
        assert_eq!(wire.messages[0].content, "Be concise.");
        assert_eq!(wire.messages[1].role, "user");
    }

    #[test]
    fn test_no_system_prompt_no_leading_message() {
        let request = CompletionRequest {
            model: "gpt-4.1".to_string(),
            messages: vec![user_message("hello", 1000)],
            system: None,
            max_tokens: 64,
            temperature: None,
            top_p: None,
        };
        let wire = OpenAiCompatProvider::to_wire_request(&request);
        assert_eq!(wire.messages.len(), 1);
        assert_eq!(wire.messages[0].role, "user");
    }
}
