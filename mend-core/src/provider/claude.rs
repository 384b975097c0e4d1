//! Anthropic Claude provider

use super::errors::ProviderError;
use super::traits::TextProvider;
use crate::config::ClaudeConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

/// Claude provider for Anthropic's models
pub struct ClaudeProvider {
    client: Client,
    config: ClaudeConfig,
}

impl ClaudeProvider {
    /// Create a provider; the HTTP client keeps its default timeout behavior.
    pub fn new(config: ClaudeConfig) -> Self {
        Self { client: Client::new(), config }
    }

    fn api_key(&self) -> Result<String, ProviderError> {
        std::env::var(&self.config.api_key_env)
            .map_err(|_| ProviderError::missing_api_key("claude", &self.config.api_key_env))
    }
}

#[async_trait]
impl TextProvider for ClaudeProvider {
    fn name(&self) -> &str {
        "claude"
    }

    async fn is_available(&self) -> bool {
        std::env::var(&self.config.api_key_env).is_ok()
    }

    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let api_key = self.api_key()?;

        let request = MessageRequest {
            model: self.config.model.clone(),
            messages: vec![Message { role: "user".to_string(), content: prompt.to_string() }],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let response = self
            .client
            .post(MESSAGES_URL)
            .header("x-api-key", api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::api(status, message));
        }

        let result: MessageResponse =
            response.json().await.map_err(|e| ProviderError::parse(e.to_string()))?;

        result
            .content
            .first()
            .map(|block| match block {
                Content::Text { text } => text.clone(),
            })
            .filter(|text| !text.is_empty())
            .ok_or_else(|| ProviderError::empty_response("claude"))
    }
}

#[derive(Debug, Serialize)]
struct MessageRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: usize,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    content: Vec<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Content {
    Text { text: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_content_deserializes() {
        let json = r#"{"content":[{"type":"text","text":"fn main() {}"}]}"#;
        let response: MessageResponse = serde_json::from_str(json).unwrap();
        let Content::Text { text } = &response.content[0];
        assert_eq!(text, "fn main() {}");
    }
}
