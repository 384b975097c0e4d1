//! Mock provider for unit tests

#![cfg(test)]

use super::errors::ProviderError;
use super::traits::TextProvider;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Scripted provider: returns queued responses in order and records every
/// prompt it was asked to complete.
pub struct MockProvider {
    name: String,
    responses: Mutex<VecDeque<Result<String, ProviderError>>>,
    prompts: Mutex<Vec<String>>,
    available: bool,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            name: "mock".to_string(),
            responses: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
            available: true,
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::new() }
    }

    pub fn push_response(self, text: impl Into<String>) -> Self {
        self.responses.lock().unwrap().push_back(Ok(text.into()));
        self
    }

    pub fn push_error(self, error: ProviderError) -> Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn is_available(&self) -> bool {
        self.available
    }

    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ProviderError::empty_response(&self.name)))
    }
}

// Lets a test keep a handle on the mock after handing it to a registry.
#[async_trait]
impl TextProvider for std::sync::Arc<MockProvider> {
    fn name(&self) -> &str {
        self.as_ref().name()
    }

    async fn is_available(&self) -> bool {
        self.as_ref().is_available().await
    }

    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        self.as_ref().complete(prompt).await
    }
}
