//! Suggestion providers
//!
//! A unified interface over the configured text-generation backends. The
//! registry owns one backend per enabled provider section, dispatches each
//! suggestion to exactly one of them, and post-processes the response into
//! replacement code. Provider failures are logged and surface to callers
//! as an absent suggestion, never as an error.

pub mod claude;
pub mod errors;
pub mod huggingface;
#[cfg(test)]
pub mod mock;
pub mod ollama;
pub mod openai;
pub mod prompt;
pub mod traits;

pub use errors::ProviderError;
pub use traits::TextProvider;

use crate::config::Config;
use std::path::Path;
use tracing::{debug, error, info, warn};

/// One file's worth of input to a suggestion call
#[derive(Debug, Clone, Copy)]
pub struct SuggestionRequest<'a> {
    /// Current on-disk content
    pub content: &'a str,
    /// Improvement goal, already resolved to its description
    pub goal: &'a str,
    /// Path of the file being processed
    pub file_path: &'a Path,
}

/// Holds the enabled backends and dispatches suggestions to one of them
pub struct ProviderRegistry {
    providers: Vec<Box<dyn TextProvider>>,
    default_provider: String,
}

impl ProviderRegistry {
    /// Build the registry from configuration; disabled or absent provider
    /// sections contribute no backend.
    pub fn from_config(config: &Config) -> Self {
        let mut providers: Vec<Box<dyn TextProvider>> = Vec::new();

        if let Some(claude) = &config.providers.claude
            && claude.enabled
        {
            providers.push(Box::new(claude::ClaudeProvider::new(claude.clone())));
        }
        if let Some(openai) = &config.providers.openai
            && openai.enabled
        {
            providers.push(Box::new(openai::OpenAiProvider::new(openai.clone())));
        }
        if let Some(ollama) = &config.providers.ollama
            && ollama.enabled
        {
            providers.push(Box::new(ollama::OllamaProvider::new(ollama.clone())));
        }
        if let Some(huggingface) = &config.providers.huggingface
            && huggingface.enabled
        {
            providers
                .push(Box::new(huggingface::HuggingFaceProvider::new(huggingface.clone())));
        }

        info!(
            "initialized {} provider backend(s), default '{}'",
            providers.len(),
            config.default_provider
        );

        Self { providers, default_provider: config.default_provider.clone() }
    }

    #[cfg(test)]
    pub(crate) fn with_providers(
        providers: Vec<Box<dyn TextProvider>>,
        default_provider: impl Into<String>,
    ) -> Self {
        Self { providers, default_provider: default_provider.into() }
    }

    fn get(&self, name: &str) -> Option<&dyn TextProvider> {
        self.providers.iter().find(|p| p.name() == name).map(|p| p.as_ref())
    }

    /// Names of all configured backends
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Ask one backend for replacement content. Dispatches to the named
    /// provider, or the configured default when `provider` is `None`.
    /// Every failure path logs and returns `None`.
    pub async fn suggest(
        &self,
        request: &SuggestionRequest<'_>,
        provider: Option<&str>,
    ) -> Option<String> {
        let name = provider.unwrap_or(&self.default_provider);
        let Some(backend) = self.get(name) else {
            error!("provider '{}' not available", name);
            return None;
        };

        let prompt = prompt::build_prompt(request);
        match backend.complete(&prompt).await {
            Ok(response) => match prompt::extract_code(&response) {
                Some(code) => {
                    info!("got {} suggestion for {}", name, request.file_path.display());
                    Some(code)
                }
                None => {
                    warn!(
                        "{} returned no usable code for {}",
                        name,
                        request.file_path.display()
                    );
                    None
                }
            },
            Err(err) => {
                error!("error getting suggestions from {}: {}", name, err);
                None
            }
        }
    }

    /// Smoke-test a backend by driving `suggest` with a fixed trivial input
    pub async fn test_connection(&self, provider: Option<&str>) -> bool {
        let request = SuggestionRequest {
            content: "def hello(): print('hello')",
            goal: "add docstring",
            file_path: Path::new("test.py"),
        };
        let ok = self.suggest(&request, provider).await.is_some();
        debug!(
            "connection test for '{}': {}",
            provider.unwrap_or(&self.default_provider),
            if ok { "ok" } else { "failed" }
        );
        ok
    }
}
