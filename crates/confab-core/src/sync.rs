//! Chat synchronization engine.
//!
//! [`ChatSync`] owns the client-visible cache of chat sessions and is the
//! only component allowed to mutate it. Every mutation follows the same
//! two-phase shape: apply locally first (optimistic, before any I/O), then
//! commit through the [`ChatGateway`] and reconcile with whatever the
//! server answers. Reconciliation differs per operation:
//!
//! - message/title paths: on success, overwrite the local chat with the
//!   server's response; on failure, re-fetch everything ([`ChatSync::refresh_all`])
//!   and accept losing the optimistic edit -- the server is the tie-breaker.
//! - delete path: on failure, restore the pre-delete snapshot verbatim,
//!   because deletion has no partial server truth to reconcile toward.
//!
//! Gateway failures never propagate to callers; they are logged and
//! resolved here. Concurrent operations are not mutually excluded:
//! last-write-wins, as accepted in the product design.

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, error, warn};

use confab_types::chat::{Chat, DEFAULT_CHAT_TITLE};
use confab_types::message::Message;

use crate::gateway::ChatGateway;

/// Current wall-clock time in epoch milliseconds.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// The engine's owned cache state.
///
/// `active_chat_id` is a weak reference: it may name a chat no longer in
/// `chats` (e.g., deleted by another actor), so lookups must null-check.
#[derive(Debug, Clone, Default)]
struct CacheState {
    chats: Vec<Chat>,
    active_chat_id: Option<String>,
    loading: bool,
}

/// Synchronization engine owning the in-memory chat cache.
///
/// Generic over [`ChatGateway`] so tests can run against an in-memory fake
/// (confab-core never depends on confab-infra).
pub struct ChatSync<G: ChatGateway> {
    gateway: G,
    state: RwLock<CacheState>,
}

impl<G: ChatGateway> ChatSync<G> {
    /// Create an engine with an empty cache in the loading state.
    ///
    /// Call [`ChatSync::refresh_all`] once at startup to populate it.
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            state: RwLock::new(CacheState {
                chats: Vec::new(),
                active_chat_id: None,
                loading: true,
            }),
        }
    }

    /// Access the underlying gateway.
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    // --- Read access ---

    /// Pure lookup of a chat by id. No I/O.
    pub async fn chat(&self, chat_id: &str) -> Option<Chat> {
        let state = self.state.read().await;
        state.chats.iter().find(|c| c.id == chat_id).cloned()
    }

    /// Snapshot of all cached chats, most recently updated first.
    pub async fn chats(&self) -> Vec<Chat> {
        self.state.read().await.chats.clone()
    }

    /// Id of the active chat, if any. Weak reference -- the chat may have
    /// been removed since; pair with [`ChatSync::chat`] and null-check.
    pub async fn active_chat_id(&self) -> Option<String> {
        self.state.read().await.active_chat_id.clone()
    }

    /// Whether the initial list fetch is still outstanding.
    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    /// Point the active-chat reference at the given id.
    pub async fn set_active(&self, chat_id: impl Into<String>) {
        self.state.write().await.active_chat_id = Some(chat_id.into());
    }

    // --- Mutations ---

    /// Replace the entire cache with the server's session list.
    ///
    /// This is the startup path and the recovery path after any failed
    /// reconciliation. Optimistic state not yet committed is lost by
    /// design. If the fetch itself fails, the cache degrades to empty.
    pub async fn refresh_all(&self) {
        {
            self.state.write().await.loading = true;
        }
        let chats = match self.gateway.list_chats().await {
            Ok(chats) => chats,
            Err(e) => {
                error!(error = %e, "Failed to fetch chats from server");
                Vec::new()
            }
        };
        let mut state = self.state.write().await;
        debug!(count = chats.len(), "Cache refreshed from server");
        state.chats = chats;
        state.loading = false;
    }

    /// Create a new chat on the server and insert it into the cache.
    ///
    /// The new chat is placed by recency and becomes active. Returns `None`
    /// (cache untouched) if the gateway call fails.
    pub async fn create_chat(&self, title: Option<&str>) -> Option<Chat> {
        let title = title.unwrap_or(DEFAULT_CHAT_TITLE);
        let chat = match self.gateway.create_chat(title, false).await {
            Ok(chat) => chat,
            Err(e) => {
                error!(error = %e, "Failed to create chat on server");
                return None;
            }
        };

        let mut state = self.state.write().await;
        state.chats.insert(0, chat.clone());
        state.chats.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        state.active_chat_id = Some(chat.id.clone());
        Some(chat)
    }

    /// Replace a chat's message list: optimistic local write, then commit.
    ///
    /// The optimistic write happens before any I/O, so readers observe the
    /// new messages immediately. On a successful commit the local chat is
    /// overwritten with exactly what the server returned (ids, normalized
    /// timestamps, derived fields). On failure the cache is re-fetched
    /// rather than silently rolled back.
    pub async fn replace_messages(&self, chat_id: &str, messages: Vec<Message>) {
        {
            let mut state = self.state.write().await;
            let Some(chat) = state.chats.iter_mut().find(|c| c.id == chat_id) else {
                warn!(chat_id, "replace_messages on a chat not in the cache");
                return;
            };
            chat.messages = messages.clone();
            chat.updated_at = now_ms();
        }

        match self.gateway.replace_messages(chat_id, &messages).await {
            Ok(server_chat) => self.overwrite_chat(server_chat).await,
            Err(e) => {
                error!(chat_id, error = %e, "Failed to commit messages, refreshing from server");
                self.refresh_all().await;
            }
        }
    }

    /// Update a chat's title, marking it as generated.
    ///
    /// Same optimistic/commit/reconcile shape as [`ChatSync::replace_messages`],
    /// scoped to the title fields. `title_generated` flips to true both
    /// optimistically and on the server; it never flips back.
    pub async fn update_title(&self, chat_id: &str, title: &str) {
        {
            let mut state = self.state.write().await;
            let Some(chat) = state.chats.iter_mut().find(|c| c.id == chat_id) else {
                warn!(chat_id, "update_title on a chat not in the cache");
                return;
            };
            chat.title = title.to_string();
            chat.title_generated = true;
            chat.updated_at = now_ms();
        }

        match self.gateway.update_chat(chat_id, Some(title), Some(true)).await {
            Ok(server_chat) => self.overwrite_chat(server_chat).await,
            Err(e) => {
                error!(chat_id, error = %e, "Failed to commit title, refreshing from server");
                self.refresh_all().await;
            }
        }
    }

    /// Delete a chat: optimistic removal, then commit; full rollback on
    /// failure.
    ///
    /// If the deleted chat was active, the most-recently-updated survivor
    /// becomes active (or none). On gateway failure the entire pre-delete
    /// snapshot is restored, including the active reference.
    pub async fn delete_chat(&self, chat_id: &str) {
        let snapshot = {
            let mut state = self.state.write().await;
            let snapshot = state.clone();
            state.chats.retain(|c| c.id != chat_id);
            if state.active_chat_id.as_deref() == Some(chat_id) {
                state.active_chat_id = state
                    .chats
                    .iter()
                    .max_by_key(|c| c.updated_at)
                    .map(|c| c.id.clone());
            }
            snapshot
        };

        if let Err(e) = self.gateway.delete_chat(chat_id).await {
            error!(chat_id, error = %e, "Failed to delete chat on server, rolling back");
            *self.state.write().await = snapshot;
        }
    }

    /// Overwrite the cached copy of a chat with the server's version.
    async fn overwrite_chat(&self, server_chat: Chat) {
        let mut state = self.state.write().await;
        if let Some(chat) = state.chats.iter_mut().find(|c| c.id == server_chat.id) {
            *chat = server_chat;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use confab_types::error::GatewayError;
    use confab_types::message::MessageRole;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
    use std::sync::Mutex;

    /// In-memory gateway fake with per-operation failure switches.
    ///
    /// Mirrors the server's behavior: it assigns ids and bumps timestamps,
    /// and `replace_messages` is all-or-nothing.
    struct MockGateway {
        chats: Mutex<Vec<Chat>>,
        next_id: AtomicU64,
        clock: AtomicU64,
        fail_list: AtomicBool,
        fail_create: AtomicBool,
        fail_replace: AtomicBool,
        fail_update: AtomicBool,
        fail_delete: AtomicBool,
    }

    impl MockGateway {
        fn new() -> Self {
            Self {
                chats: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(1),
                clock: AtomicU64::new(10_000),
                fail_list: AtomicBool::new(false),
                fail_create: AtomicBool::new(false),
                fail_replace: AtomicBool::new(false),
                fail_update: AtomicBool::new(false),
                fail_delete: AtomicBool::new(false),
            }
        }

        fn tick(&self) -> i64 {
            self.clock.fetch_add(1_000, Ordering::SeqCst) as i64
        }

        fn server_snapshot(&self) -> Vec<Chat> {
            let mut chats = self.chats.lock().unwrap().clone();
            chats.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
            chats
        }
    }

    impl ChatGateway for MockGateway {
        async fn list_chats(&self) -> Result<Vec<Chat>, GatewayError> {
            if self.fail_list.load(Ordering::SeqCst) {
                return Err(GatewayError::Http("connection refused".to_string()));
            }
            Ok(self.server_snapshot())
        }

        async fn create_chat(
            &self,
            title: &str,
            title_generated: bool,
        ) -> Result<Chat, GatewayError> {
            if self.fail_create.load(Ordering::SeqCst) {
                return Err(GatewayError::Status {
                    code: 500,
                    body: "create failed".to_string(),
                });
            }
            let now = self.tick();
            let chat = Chat {
                id: format!("chat-{}", self.next_id.fetch_add(1, Ordering::SeqCst)),
                title: title.to_string(),
                title_generated,
                messages: Vec::new(),
                created_at: now,
                updated_at: now,
            };
            self.chats.lock().unwrap().push(chat.clone());
            Ok(chat)
        }

        async fn get_chat(&self, chat_id: &str) -> Result<Option<Chat>, GatewayError> {
            Ok(self
                .chats
                .lock()
                .unwrap()
                .iter()
                .find(|c| c.id == chat_id)
                .cloned())
        }

        async fn replace_messages(
            &self,
            chat_id: &str,
            messages: &[Message],
        ) -> Result<Chat, GatewayError> {
            if self.fail_replace.load(Ordering::SeqCst) {
                return Err(GatewayError::Status {
                    code: 500,
                    body: "replace failed".to_string(),
                });
            }
            let now = self.tick();
            let mut chats = self.chats.lock().unwrap();
            let chat = chats
                .iter_mut()
                .find(|c| c.id == chat_id)
                .ok_or(GatewayError::NotFound)?;
            chat.messages = messages
                .iter()
                .enumerate()
                .map(|(i, m)| {
                    let mut m = m.clone();
                    // Server assigns ids to newly stored messages.
                    m.id.get_or_insert_with(|| format!("{chat_id}-msg-{i}"));
                    m
                })
                .collect();
            chat.updated_at = now;
            Ok(chat.clone())
        }

        async fn update_chat(
            &self,
            chat_id: &str,
            title: Option<&str>,
            title_generated: Option<bool>,
        ) -> Result<Chat, GatewayError> {
            if self.fail_update.load(Ordering::SeqCst) {
                return Err(GatewayError::Status {
                    code: 500,
                    body: "update failed".to_string(),
                });
            }
            let now = self.tick();
            let mut chats = self.chats.lock().unwrap();
            let chat = chats
                .iter_mut()
                .find(|c| c.id == chat_id)
                .ok_or(GatewayError::NotFound)?;
            if let Some(title) = title {
                chat.title = title.to_string();
            }
            if let Some(flag) = title_generated {
                chat.title_generated = flag;
            }
            chat.updated_at = now;
            Ok(chat.clone())
        }

        async fn delete_chat(&self, chat_id: &str) -> Result<(), GatewayError> {
            if self.fail_delete.load(Ordering::SeqCst) {
                return Err(GatewayError::Status {
                    code: 500,
                    body: "delete failed".to_string(),
                });
            }
            let mut chats = self.chats.lock().unwrap();
            let before = chats.len();
            chats.retain(|c| c.id != chat_id);
            if chats.len() == before {
                return Err(GatewayError::NotFound);
            }
            Ok(())
        }
    }

    fn user_msg(content: &str, ts: i64) -> Message {
        Message::new(MessageRole::User, content, ts)
    }

    #[tokio::test]
    async fn test_refresh_all_replaces_cache_and_clears_loading() {
        let sync = ChatSync::new(MockGateway::new());
        assert!(sync.is_loading().await);
        sync.gateway().create_chat("Old", false).await.unwrap();

        sync.refresh_all().await;
        assert!(!sync.is_loading().await);
        assert_eq!(sync.chats().await.len(), 1);
    }

    #[tokio::test]
    async fn test_refresh_all_failure_degrades_to_empty() {
        let sync = ChatSync::new(MockGateway::new());
        sync.gateway().create_chat("Kept", false).await.unwrap();
        sync.refresh_all().await;
        assert_eq!(sync.chats().await.len(), 1);

        sync.gateway().fail_list.store(true, Ordering::SeqCst);
        sync.refresh_all().await;
        assert!(sync.chats().await.is_empty());
        assert!(!sync.is_loading().await);
    }

    #[tokio::test]
    async fn test_create_chat_inserts_front_and_sets_active() {
        let sync = ChatSync::new(MockGateway::new());
        sync.refresh_all().await;

        let first = sync.create_chat(None).await.unwrap();
        let second = sync.create_chat(Some("Planning")).await.unwrap();

        assert_eq!(first.title, DEFAULT_CHAT_TITLE);
        assert!(!first.title_generated);
        assert_eq!(sync.active_chat_id().await, Some(second.id.clone()));
        // Most recent first.
        assert_eq!(sync.chats().await[0].id, second.id);
    }

    #[tokio::test]
    async fn test_create_chat_failure_leaves_cache_unmodified() {
        let sync = ChatSync::new(MockGateway::new());
        sync.refresh_all().await;
        let existing = sync.create_chat(None).await.unwrap();

        sync.gateway().fail_create.store(true, Ordering::SeqCst);
        assert!(sync.create_chat(None).await.is_none());
        assert_eq!(sync.chats().await.len(), 1);
        assert_eq!(sync.active_chat_id().await, Some(existing.id));
    }

    #[tokio::test]
    async fn test_replace_messages_success_adopts_server_state() {
        let sync = ChatSync::new(MockGateway::new());
        sync.refresh_all().await;
        let chat = sync.create_chat(None).await.unwrap();

        sync.replace_messages(&chat.id, vec![user_msg("hello", 1000)])
            .await;

        let cached = sync.chat(&chat.id).await.unwrap();
        assert_eq!(cached.messages.len(), 1);
        assert_eq!(cached.messages[0].content, "hello");
        assert_eq!(cached.messages[0].timestamp, 1000);
        // Server-assigned id made it back into the cache.
        assert!(cached.messages[0].id.is_some());
        // Cache equals the server's copy exactly.
        assert_eq!(cached, sync.gateway().get_chat(&chat.id).await.unwrap().unwrap());
    }

    #[tokio::test]
    async fn test_last_successful_replace_wins() {
        let sync = ChatSync::new(MockGateway::new());
        sync.refresh_all().await;
        let chat = sync.create_chat(None).await.unwrap();

        sync.replace_messages(&chat.id, vec![user_msg("one", 1000)])
            .await;
        sync.replace_messages(
            &chat.id,
            vec![user_msg("one", 1000), user_msg("two", 2000)],
        )
        .await;

        let cached = sync.chat(&chat.id).await.unwrap();
        let server = sync.gateway().get_chat(&chat.id).await.unwrap().unwrap();
        assert_eq!(cached.messages, server.messages);
        assert_eq!(cached.messages.len(), 2);
    }

    #[tokio::test]
    async fn test_replace_messages_failure_refreshes_from_server() {
        let sync = ChatSync::new(MockGateway::new());
        sync.refresh_all().await;
        let chat = sync.create_chat(None).await.unwrap();
        sync.replace_messages(&chat.id, vec![user_msg("committed", 1000)])
            .await;

        sync.gateway().fail_replace.store(true, Ordering::SeqCst);
        sync.replace_messages(
            &chat.id,
            vec![user_msg("committed", 1000), user_msg("lost", 2000)],
        )
        .await;

        // The optimistic edit is gone; the cache equals a fresh server snapshot.
        let cached = sync.chat(&chat.id).await.unwrap();
        assert_eq!(cached.messages.len(), 1);
        assert_eq!(cached.messages[0].content, "committed");
        assert_eq!(sync.chats().await, sync.gateway().server_snapshot());
    }

    #[tokio::test]
    async fn test_update_title_sets_generated_flag() {
        let sync = ChatSync::new(MockGateway::new());
        sync.refresh_all().await;
        let chat = sync.create_chat(None).await.unwrap();

        sync.update_title(&chat.id, "Rust lifetime questions").await;

        let cached = sync.chat(&chat.id).await.unwrap();
        assert_eq!(cached.title, "Rust lifetime questions");
        assert!(cached.title_generated);
        let server = sync.gateway().get_chat(&chat.id).await.unwrap().unwrap();
        assert!(server.title_generated);
    }

    #[tokio::test]
    async fn test_update_title_failure_refreshes() {
        let sync = ChatSync::new(MockGateway::new());
        sync.refresh_all().await;
        let chat = sync.create_chat(None).await.unwrap();

        sync.gateway().fail_update.store(true, Ordering::SeqCst);
        sync.update_title(&chat.id, "Doomed title").await;

        let cached = sync.chat(&chat.id).await.unwrap();
        assert_eq!(cached.title, DEFAULT_CHAT_TITLE);
        assert!(!cached.title_generated);
    }

    #[tokio::test]
    async fn test_delete_reassigns_active_to_most_recent() {
        let sync = ChatSync::new(MockGateway::new());
        sync.refresh_all().await;
        let older = sync.create_chat(Some("Older")).await.unwrap();
        let newer = sync.create_chat(Some("Newer")).await.unwrap();
        sync.set_active(&newer.id).await;

        sync.delete_chat(&newer.id).await;

        assert_eq!(sync.active_chat_id().await, Some(older.id));
        assert_eq!(sync.chats().await.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_last_chat_clears_active() {
        let sync = ChatSync::new(MockGateway::new());
        sync.refresh_all().await;
        let only = sync.create_chat(None).await.unwrap();

        sync.delete_chat(&only.id).await;

        assert_eq!(sync.active_chat_id().await, None);
        assert!(sync.chats().await.is_empty());
    }

    #[tokio::test]
    async fn test_delete_failure_restores_snapshot_verbatim() {
        let sync = ChatSync::new(MockGateway::new());
        sync.refresh_all().await;
        let _keep = sync.create_chat(Some("Keep")).await.unwrap();
        let victim = sync.create_chat(Some("Victim")).await.unwrap();
        sync.set_active(&victim.id).await;
        let chats_before = sync.chats().await;

        sync.gateway().fail_delete.store(true, Ordering::SeqCst);
        sync.delete_chat(&victim.id).await;

        assert_eq!(sync.chats().await, chats_before);
        assert_eq!(sync.active_chat_id().await, Some(victim.id));
    }

    #[tokio::test]
    async fn test_chat_lookup_not_found_is_none() {
        let sync = ChatSync::new(MockGateway::new());
        sync.refresh_all().await;
        assert!(sync.chat("missing").await.is_none());
    }
}
