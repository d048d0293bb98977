//! ChatGateway trait definition.
//!
//! The persistence service is remote; this trait is the client's contract
//! with it. Implementations live in confab-infra (e.g., `HttpChatGateway`).
//! Uses native async fn in traits (RPITIT, Rust 2024 edition).

use confab_types::chat::Chat;
use confab_types::error::GatewayError;
use confab_types::message::Message;

/// Gateway trait for remote chat session persistence.
///
/// The server is authoritative for ids, timestamps, and recency ordering.
/// `replace_messages` must be atomic server-side: either the full prior
/// list is gone and the full new list is present, or (on failure) the
/// prior list is untouched.
pub trait ChatGateway: Send + Sync {
    /// List all chats, ordered most-recently-updated first.
    fn list_chats(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<Chat>, GatewayError>> + Send;

    /// Create a new chat. The server assigns id and timestamps.
    fn create_chat(
        &self,
        title: &str,
        title_generated: bool,
    ) -> impl std::future::Future<Output = Result<Chat, GatewayError>> + Send;

    /// Fetch a single chat by id. `Ok(None)` when the chat does not exist.
    fn get_chat(
        &self,
        chat_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<Chat>, GatewayError>> + Send;

    /// Atomically replace the full message list of a chat.
    ///
    /// Returns the updated chat as the server now stores it.
    fn replace_messages(
        &self,
        chat_id: &str,
        messages: &[Message],
    ) -> impl std::future::Future<Output = Result<Chat, GatewayError>> + Send;

    /// Update title and/or the title-generated flag of a chat.
    fn update_chat(
        &self,
        chat_id: &str,
        title: Option<&str>,
        title_generated: Option<bool>,
    ) -> impl std::future::Future<Output = Result<Chat, GatewayError>> + Send;

    /// Delete a chat and its messages.
    fn delete_chat(
        &self,
        chat_id: &str,
    ) -> impl std::future::Future<Output = Result<(), GatewayError>> + Send;
}
