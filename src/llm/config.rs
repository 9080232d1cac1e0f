//! Completion client configuration parsed from environment variables.

use super::types::LlmError;

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const API_KEY_VAR: &str = "GROQ_API_KEY";
pub const API_KEY_PREFIX: &str = "gsk_";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LlmTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for LlmTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeouts: LlmTimeouts,
}

impl LlmConfig {
    /// Build typed completion config from environment variables.
    ///
    /// Required:
    /// - `GROQ_API_KEY` (must start with `gsk_`; surrounding quotes and
    ///   whitespace from `.env` files are stripped)
    ///
    /// Optional:
    /// - `GROQ_BASE_URL`: OpenAI-compatible API root, default Groq's
    /// - `LLM_REQUEST_TIMEOUT_SECS`: default 120
    /// - `LLM_CONNECT_TIMEOUT_SECS`: default 10
    pub fn from_env() -> Result<Self, LlmError> {
        let raw_key = std::env::var(API_KEY_VAR).unwrap_or_default();
        let api_key = validate_api_key(&raw_key)?;

        let base_url = std::env::var("GROQ_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let timeouts = LlmTimeouts {
            request_secs: env_parse_u64("LLM_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("LLM_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self { api_key, base_url, timeouts })
    }
}

/// Validate a raw API key value: strip whitespace and stray quoting copied
/// from `.env` files, then require the provider prefix.
pub fn validate_api_key(raw: &str) -> Result<String, LlmError> {
    let key = raw
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim();

    if key.is_empty() {
        return Err(LlmError::MissingApiKey { var: API_KEY_VAR.into() });
    }
    if !key.starts_with(API_KEY_PREFIX) {
        return Err(LlmError::InvalidApiKey(format!("expected key starting with '{API_KEY_PREFIX}'")));
    }
    Ok(key.to_string())
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
