//! Error types for suggestion providers

use thiserror::Error;

/// Errors raised by provider backends
#[derive(Debug, Error)]
pub enum ProviderError {
    /// API key environment variable is unset
    #[error("API key not found for provider '{provider}' (env {env})")]
    MissingApiKey { provider: String, env: String },

    /// Network-level failure
    #[error("network error: {message}")]
    Network { message: String },

    /// The backend returned an error status
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The backend answered but carried no usable text
    #[error("empty response from provider '{provider}'")]
    EmptyResponse { provider: String },

    /// No backend with this name is configured and enabled
    #[error("provider '{name}' not available")]
    UnknownProvider { name: String },

    /// Response body could not be decoded
    #[error("failed to parse provider response: {message}")]
    Parse { message: String },
}

impl ProviderError {
    pub fn missing_api_key(provider: impl Into<String>, env: impl Into<String>) -> Self {
        Self::MissingApiKey { provider: provider.into(), env: env.into() }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network { message: message.into() }
    }

    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api { status, message: message.into() }
    }

    pub fn empty_response(provider: impl Into<String>) -> Self {
        Self::EmptyResponse { provider: provider.into() }
    }

    pub fn unknown_provider(name: impl Into<String>) -> Self {
        Self::UnknownProvider { name: name.into() }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse { message: message.into() }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network { message: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ProviderError::missing_api_key("claude", "ANTHROPIC_API_KEY");
        assert!(err.to_string().contains("ANTHROPIC_API_KEY"));

        let err = ProviderError::api(429, "rate limited");
        assert_eq!(err.to_string(), "API error (status 429): rate limited");
    }
}
