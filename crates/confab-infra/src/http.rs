//! HttpChatGateway -- [`ChatGateway`] implementation over the persistence
//! service's REST surface.
//!
//! The wire contract:
//! - `GET  /api/chats`      -> full session list
//! - `POST /api/chats`      -> create a session, returns the stored chat
//! - `GET  /api/chats/{id}` -> one session, 404 when absent
//! - `PUT  /api/chats/{id}` -> replace messages, or update title fields
//! - `DELETE /api/chats/{id}` -> remove a session
//!
//! Bodies are camelCase JSON; the [`Chat`] and [`Message`] types carry the
//! serde attributes, including timestamp normalization for servers that
//! answer with RFC 3339 strings instead of epoch milliseconds.

use std::time::Duration;

use serde::Serialize;

use confab_core::gateway::ChatGateway;
use confab_types::chat::Chat;
use confab_types::error::GatewayError;
use confab_types::message::Message;

/// HTTP client for the chat persistence service.
#[derive(Debug, Clone)]
pub struct HttpChatGateway {
    client: reqwest::Client,
    base_url: String,
}

/// `POST /api/chats` body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateChatBody<'a> {
    title: &'a str,
    title_generated: bool,
}

/// `PUT /api/chats/{id}` body for the message path.
#[derive(Debug, Serialize)]
struct ReplaceMessagesBody<'a> {
    messages: &'a [Message],
}

/// `PUT /api/chats/{id}` body for the title path. Absent fields are left
/// unchanged by the server.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateChatBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    title_generated: Option<bool>,
}

impl HttpChatGateway {
    /// Create a gateway against the given service base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Build the full API URL for a given path.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Consume a response: map error statuses, deserialize the body.
    async fn read_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, GatewayError> {
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(GatewayError::NotFound);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Status {
                code: status.as_u16(),
                body,
            });
        }
        response
            .json::<T>()
            .await
            .map_err(|e| GatewayError::Deserialization(e.to_string()))
    }

    fn transport(e: reqwest::Error) -> GatewayError {
        GatewayError::Http(e.to_string())
    }
}

impl ChatGateway for HttpChatGateway {
    async fn list_chats(&self) -> Result<Vec<Chat>, GatewayError> {
        let response = self
            .client
            .get(self.url("/api/chats"))
            .send()
            .await
            .map_err(Self::transport)?;
        Self::read_json(response).await
    }

    async fn create_chat(&self, title: &str, title_generated: bool) -> Result<Chat, GatewayError> {
        let response = self
            .client
            .post(self.url("/api/chats"))
            .json(&CreateChatBody {
                title,
                title_generated,
            })
            .send()
            .await
            .map_err(Self::transport)?;
        Self::read_json(response).await
    }

    async fn get_chat(&self, chat_id: &str) -> Result<Option<Chat>, GatewayError> {
        let response = self
            .client
            .get(self.url(&format!("/api/chats/{chat_id}")))
            .send()
            .await
            .map_err(Self::transport)?;
        match Self::read_json(response).await {
            Ok(chat) => Ok(Some(chat)),
            Err(GatewayError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn replace_messages(
        &self,
        chat_id: &str,
        messages: &[Message],
    ) -> Result<Chat, GatewayError> {
        let response = self
            .client
            .put(self.url(&format!("/api/chats/{chat_id}")))
            .json(&ReplaceMessagesBody { messages })
            .send()
            .await
            .map_err(Self::transport)?;
        Self::read_json(response).await
    }

    async fn update_chat(
        &self,
        chat_id: &str,
        title: Option<&str>,
        title_generated: Option<bool>,
    ) -> Result<Chat, GatewayError> {
        let response = self
            .client
            .put(self.url(&format!("/api/chats/{chat_id}")))
            .json(&UpdateChatBody {
                title,
                title_generated,
            })
            .send()
            .await
            .map_err(Self::transport)?;
        Self::read_json(response).await
    }

    async fn delete_chat(&self, chat_id: &str) -> Result<(), GatewayError> {
        let response = self
            .client
            .delete(self.url(&format!("/api/chats/{chat_id}")))
            .send()
            .await
            .map_err(Self::transport)?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(GatewayError::NotFound);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Status {
                code: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}
