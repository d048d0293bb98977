//! Client configuration for Confab.

use serde::{Deserialize, Serialize};

/// Rough proxy for a ~1M token context budget, measured in characters.
/// Sends longer than this require explicit user confirmation.
pub const DEFAULT_CONFIRM_THRESHOLD_CHARS: usize = 700_000;

/// Client configuration, loaded from `config.toml` in the data directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the persistence service.
    #[serde(default = "default_server_url")]
    pub server_url: String,
    /// Model (or deployment name) used for completions and titles.
    #[serde(default = "default_model")]
    pub model: String,
    /// System prompt sent with every completion.
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Composed-message length above which the user must confirm the send.
    #[serde(default = "default_confirm_threshold")]
    pub confirm_threshold_chars: usize,
}

fn default_server_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_model() -> String {
    "gpt-4.1".to_string()
}

fn default_system_prompt() -> String {
    "You are a helpful AI assistant. Please be concise and friendly.".to_string()
}

fn default_temperature() -> f64 {
    0.7
}

fn default_max_tokens() -> u32 {
    32_768
}

fn default_confirm_threshold() -> usize {
    DEFAULT_CONFIRM_THRESHOLD_CHARS
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            model: default_model(),
            system_prompt: default_system_prompt(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            confirm_threshold_chars: default_confirm_threshold(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.server_url, "http://localhost:3000");
        assert_eq!(config.model, "gpt-4.1");
        assert_eq!(config.confirm_threshold_chars, 700_000);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: ClientConfig =
            toml::from_str("server_url = \"http://chat.internal:8080\"").unwrap();
        assert_eq!(config.server_url, "http://chat.internal:8080");
        assert_eq!(config.model, "gpt-4.1");
        assert!((config.temperature - 0.7).abs() < f64::EPSILON);
    }
}
