//! Wire types for the OpenAI-compatible chat completions API.

use serde::{Deserialize, Serialize};

/// `POST /chat/completions` request body.
#[derive(Debug, Serialize)]
pub struct ChatCompletionsRequest {
    pub model: String,
    pub messages: Vec<WireMessage>,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
}

/// A single `{role, content}` entry. The system prompt travels as the first
/// message with role `"system"`.
#[derive(Debug, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionsResponse {
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub model: String,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let req = ChatCompletionsRequest {
            model: "gpt-4.1".to_string(),
            messages: vec![WireMessage {
                role: "user".to_string(),
                content: "hi".to_string(),
            }],
            max_tokens: 128,
            temperature: Some(0.7),
            top_p: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["messages"][0]["role"], "user");
        assert!(json.get("top_p").is_none());
    }

    #[test]
    fn test_response_with_null_content() {
        let json = r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#;
        let resp: ChatCompletionsResponse = serde_json::from_str(json).unwrap();
        assert!(resp.choices[0].message.content.is_none());
    }
}
