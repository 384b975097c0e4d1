//! Provider trait
//!
//! Every backend is a one-shot text completion: send a prompt, get text or
//! a typed error. No retries, no streaming, no rate limiting; a backend
//! that fails is simply reported as failed for that call.

use super::errors::ProviderError;
use async_trait::async_trait;

/// One-shot text-generation backend
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Name used for dispatch and logging
    fn name(&self) -> &str;

    /// Whether the backend is configured and reachable enough to try
    async fn is_available(&self) -> bool;

    /// Send a prompt, return the raw response text
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError>;
}
