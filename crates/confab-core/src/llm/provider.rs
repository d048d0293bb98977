//! LlmProvider trait definition.
//!
//! The abstraction all completion backends implement. Uses native async fn
//! in traits (RPITIT, Rust 2024 edition). Implementations live in
//! confab-infra (e.g., `OpenAiCompatProvider`).

use confab_types::llm::{CompletionRequest, CompletionResponse, LlmError};

/// Trait for completion backends.
///
/// Confab only consumes the non-streaming contract: an ordered transcript
/// in, one generated message out.
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "openai", "azure").
    fn name(&self) -> &str;

    /// Send a completion request and receive the full response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;
}
