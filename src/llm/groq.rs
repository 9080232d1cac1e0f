//! Groq chat-completions client.
//!
//! Thin HTTP wrapper for the OpenAI-compatible `/chat/completions` endpoint.
//! Pure parsing in `parse_completion_response` for testability.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use super::config::LlmTimeouts;
use super::types::{ChatMessage, CompletionRequest, LlmError, MessageContent};

// =============================================================================
// CLIENT
// =============================================================================

pub struct GroqClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GroqClient {
    pub fn new(api_key: String, base_url: String, timeouts: LlmTimeouts) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| LlmError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, api_key, base_url })
    }

    /// Send one chat-completion request and return the top choice's text.
    pub async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let messages = build_messages(request);
        let body = ApiRequest {
            model: &request.model,
            messages: &messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(request_error)?;

        if status != 200 {
            return Err(LlmError::ApiResponse { status, body: text });
        }

        parse_completion_response(&text)
    }
}

fn request_error(e: reqwest::Error) -> LlmError {
    if e.is_timeout() {
        LlmError::Timeout
    } else {
        LlmError::ApiRequest(e.to_string())
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

/// Prepend the optional system turn to the caller's messages.
fn build_messages(request: &CompletionRequest) -> Vec<ChatMessage> {
    let mut out = Vec::with_capacity(request.messages.len() + 1);
    if let Some(system) = request.system.as_deref() {
        if !system.trim().is_empty() {
            out.push(ChatMessage { role: "system".into(), content: MessageContent::Text(system.to_string()) });
        }
    }
    out.extend(request.messages.iter().cloned());
    out
}

// =============================================================================
// RESPONSE PARSING
// =============================================================================

/// Extract the first choice's message content as plain text.
pub(crate) fn parse_completion_response(json_text: &str) -> Result<String, LlmError> {
    let root: Value = serde_json::from_str(json_text).map_err(|e| LlmError::ApiParse(e.to_string()))?;

    let Some(choice) = root
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|arr| arr.first())
    else {
        return Err(LlmError::ApiParse("chat_completions: missing choices[0]".to_string()));
    };

    let Some(content) = choice
        .get("message")
        .and_then(|m| m.get("content"))
        .and_then(Value::as_str)
    else {
        return Err(LlmError::ApiParse("chat_completions: missing message content".to_string()));
    };

    Ok(content.to_string())
}
