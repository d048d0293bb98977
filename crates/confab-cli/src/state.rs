//! Shared application state for CLI commands.

use confab_core::sync::ChatSync;
use confab_infra::config::{data_dir, load_client_config};
use confab_infra::http::HttpChatGateway;
use confab_types::config::ClientConfig;

/// Configuration plus the sync engine every command operates through.
pub struct AppState {
    pub config: ClientConfig,
    pub sync: ChatSync<HttpChatGateway>,
}

impl AppState {
    /// Load configuration and build the sync engine.
    ///
    /// The cache starts empty and loading; commands call
    /// [`ChatSync::refresh_all`] before reading from it.
    pub async fn init(server_url_override: Option<String>) -> Self {
        let mut config = load_client_config(&data_dir()).await;
        if let Some(url) = server_url_override {
            config.server_url = url;
        }

        let gateway = HttpChatGateway::new(config.server_url.clone());
        let sync = ChatSync::new(gateway);
        Self { config, sync }
    }
}
