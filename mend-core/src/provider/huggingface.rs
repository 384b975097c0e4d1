//! Hugging Face hosted inference provider

use super::errors::ProviderError;
use super::traits::TextProvider;
use crate::config::HuggingFaceConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

const INFERENCE_BASE_URL: &str = "https://api-inference.huggingface.co/models";

/// Provider backed by the Hugging Face inference API
pub struct HuggingFaceProvider {
    client: Client,
    config: HuggingFaceConfig,
}

impl HuggingFaceProvider {
    pub fn new(config: HuggingFaceConfig) -> Self {
        Self { client: Client::new(), config }
    }

    fn model_url(&self) -> String {
        format!("{}/{}", INFERENCE_BASE_URL, self.config.model)
    }
}

#[async_trait]
impl TextProvider for HuggingFaceProvider {
    fn name(&self) -> &str {
        "huggingface"
    }

    async fn is_available(&self) -> bool {
        std::env::var(&self.config.api_key_env).is_ok()
    }

    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let api_key = std::env::var(&self.config.api_key_env).map_err(|_| {
            ProviderError::missing_api_key("huggingface", &self.config.api_key_env)
        })?;

        let response = self
            .client
            .post(self.model_url())
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&json!({ "inputs": prompt }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::api(status, message));
        }

        let generations: Vec<Generation> =
            response.json().await.map_err(|e| ProviderError::parse(e.to_string()))?;

        generations
            .into_iter()
            .next()
            .map(|g| g.generated_text)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| ProviderError::empty_response("huggingface"))
    }
}

#[derive(Debug, Deserialize)]
struct Generation {
    generated_text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_url_embeds_model_id() {
        let provider = HuggingFaceProvider::new(HuggingFaceConfig {
            model: "bigcode/starcoder2-15b".to_string(),
            ..HuggingFaceConfig::default()
        });
        assert_eq!(
            provider.model_url(),
            "https://api-inference.huggingface.co/models/bigcode/starcoder2-15b"
        );
    }

    #[test]
    fn generation_deserializes() {
        let json = r#"[{"generated_text":"fn main() {}"}]"#;
        let generations: Vec<Generation> = serde_json::from_str(json).unwrap();
        assert_eq!(generations[0].generated_text, "fn main() {}");
    }
}
