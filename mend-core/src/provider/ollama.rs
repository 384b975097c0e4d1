//! Ollama provider for local model execution

use super::errors::ProviderError;
use super::traits::TextProvider;
use crate::config::OllamaConfig;
use async_trait::async_trait;
use ollama_rs::Ollama;
use ollama_rs::generation::completion::request::GenerationRequest;

/// Provider backed by a local or remote Ollama instance
pub struct OllamaProvider {
    client: Ollama,
    config: OllamaConfig,
}

impl OllamaProvider {
    pub fn new(config: OllamaConfig) -> Self {
        let client = Ollama::new(config.host.clone(), config.port);
        Self { client, config }
    }
}

#[async_trait]
impl TextProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn is_available(&self) -> bool {
        // Listing local models doubles as a connectivity probe
        self.client.list_local_models().await.is_ok()
    }

    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let request = GenerationRequest::new(self.config.model.clone(), prompt.to_string());

        let response = self
            .client
            .generate(request)
            .await
            .map_err(|e| ProviderError::network(e.to_string()))?;

        if response.response.is_empty() {
            return Err(ProviderError::empty_response("ollama"));
        }
        Ok(response.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_reports_its_name() {
        let provider = OllamaProvider::new(OllamaConfig::default());
        assert_eq!(provider.name(), "ollama");
    }
}
