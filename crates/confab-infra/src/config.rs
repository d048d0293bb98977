//! Client configuration loader for Confab.
//!
//! Reads `config.toml` from the data directory (`~/.confab/` in production)
//! and deserializes it into [`ClientConfig`]. Falls back to defaults when
//! the file is missing or malformed.

use std::path::{Path, PathBuf};

use confab_types::config::ClientConfig;

/// Resolve the Confab data directory (`~/.confab`).
pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".confab")
}

/// Load client configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`ClientConfig::default()`].
/// - If the file exists but fails to read or parse, logs a warning and
///   returns the default.
pub async fn load_client_config(data_dir: &Path) -> ClientConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return ClientConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return ClientConfig::default();
        }
    };

    match toml::from_str::<ClientConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            ClientConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_client_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_client_config(tmp.path()).await;
        assert_eq!(config.server_url, "http://localhost:3000");
        assert_eq!(config.model, "gpt-4.1");
    }

    #[tokio::test]
    async fn load_client_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join("config.toml"),
            r#"
server_url = "http://chat.internal:8080"
model = "gpt-4.1-mini"
temperature = 0.2
"#,
        )
        .await
        .unwrap();

        let config = load_client_config(tmp.path()).await;
        assert_eq!(config.server_url, "http://chat.internal:8080");
        assert_eq!(config.model, "gpt-4.1-mini");
        assert!((config.temperature - 0.2).abs() < f64::EPSILON);
        // Unspecified fields keep their defaults.
        assert_eq!(config.confirm_threshold_chars, 700_000);
    }

    #[tokio::test]
    async fn load_client_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_client_config(tmp.path()).await;
        assert_eq!(config.model, "gpt-4.1");
    }
}
