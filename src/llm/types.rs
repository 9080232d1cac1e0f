//! Completion types — wire-neutral message types and errors.
//!
//! Message content mirrors the OpenAI-compatible chat shape: plain text for
//! ordinary turns, typed part arrays for multimodal (text + image) turns.

use serde::{Deserialize, Serialize};

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by completion client operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// The required API key environment variable is not set or is blank.
    #[error("missing API key: env var {var} not set")]
    MissingApiKey { var: String },

    /// The API key does not have the expected provider prefix.
    #[error("invalid API key format: {0}")]
    InvalidApiKey(String),

    /// The HTTP request to the completion provider failed.
    #[error("API request failed: {0}")]
    ApiRequest(String),

    /// The request deadline elapsed before the provider answered.
    #[error("API request timed out")]
    Timeout,

    /// The completion provider returned a non-success HTTP status.
    #[error("API response error: status {status}")]
    ApiResponse { status: u16, body: String },

    /// The provider response body could not be deserialized.
    #[error("API response parse failed: {0}")]
    ApiParse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

// =============================================================================
// MESSAGE CONTENT
// =============================================================================

/// One typed part of a multimodal message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContentPart {
    /// A plain text segment.
    #[serde(rename = "text")]
    Text { text: String },

    /// An inline image reference (data URL).
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

/// Image reference payload: `data:image/jpeg;base64,<payload>` or a plain URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
}

/// Message content — either plain text or a sequence of typed parts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// A simple string payload.
    Text(String),
    /// Typed parts, used for image question turns.
    Parts(Vec<ContentPart>),
}

impl MessageContent {
    /// Build the content of an image question: question text plus an inline
    /// base64 JPEG data URL.
    #[must_use]
    pub fn text_with_image(text: impl Into<String>, image_base64: &str) -> Self {
        Self::Parts(vec![
            ContentPart::Text { text: text.into() },
            ContentPart::ImageUrl {
                image_url: ImageUrl { url: format!("data:image/jpeg;base64,{image_base64}") },
            },
        ])
    }
}

// =============================================================================
// MESSAGES
// =============================================================================

/// A single message in a completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: MessageContent,
}

impl ChatMessage {
    #[must_use]
    pub fn text(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self { role: role.into(), content: MessageContent::Text(content.into()) }
    }
}

/// One fully shaped request to the completion service.
///
/// The caller picks the model and sampling parameters per request; the client
/// holds only transport concerns (key, base URL, timeouts).
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Optional system turn, prepended to `messages` on the wire.
    pub system: Option<String>,
    pub messages: Vec<ChatMessage>,
}

// =============================================================================
// BACKEND TRAIT
// =============================================================================

/// Async trait for the completion service. Enables mocking in tests.
#[async_trait::async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Send a completion request and return the model's single top response
    /// as plain text.
    ///
    /// # Errors
    ///
    /// Returns an [`LlmError`] if the request fails, times out, or the
    /// response is malformed. No retry, no backoff, no model fallback.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError>;
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
