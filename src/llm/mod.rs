//! Completion client adapter for the hosted inference API.
//!
//! DESIGN
//! ======
//! One client is constructed at startup from environment variables and shared
//! process-wide through `AppState` (construction is idempotent; there is no
//! mutable global). All three assistant modes go through the same
//! [`CompletionBackend`] trait, which also enables mocking in tests.

pub mod config;
pub mod groq;
pub mod types;

use config::LlmConfig;
pub use types::{ChatMessage, CompletionBackend, CompletionRequest, LlmError, MessageContent};

// =============================================================================
// CLIENT
// =============================================================================

/// Concrete completion client backed by Groq's OpenAI-compatible API.
pub struct LlmClient {
    inner: groq::GroqClient,
}

impl LlmClient {
    /// Build a completion client from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is absent or malformed, or the HTTP
    /// client fails to build. Both are configuration errors and fatal at
    /// startup.
    pub fn from_env() -> Result<Self, LlmError> {
        let config = LlmConfig::from_env()?;
        Self::from_config(config)
    }

    /// Build a completion client from a parsed typed config.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn from_config(config: LlmConfig) -> Result<Self, LlmError> {
        let inner = groq::GroqClient::new(config.api_key, config.base_url, config.timeouts)?;
        Ok(Self { inner })
    }
}

#[async_trait::async_trait]
impl CompletionBackend for LlmClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        self.inner.complete(request).await
    }
}
