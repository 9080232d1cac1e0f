//! Assistant service — request shaping and orchestration for the three modes.
//!
//! DESIGN
//! ======
//! Free chat sends the full channel history behind a fixed system prompt.
//! PDF Q&A sends one constructed prompt per question (document excerpt +
//! question, no history), and image Q&A sends one multimodal turn (question
//! text + inline JPEG). Every mode follows the same sequence: shape request,
//! call the completion service, then persist the exchange atomically and
//! append it to the session cache.

use tracing::info;
use uuid::Uuid;

use crate::llm::{ChatMessage, CompletionBackend as _, CompletionRequest, LlmError, MessageContent};
use crate::state::AppState;

use super::conversation;
use super::history::{Channel, HistoryError, Role, Turn};

pub const CHAT_SYSTEM_PROMPT: &str = "You are a helpful, friendly, and knowledgeable AI assistant.";

pub const DEFAULT_TEXT_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_VISION_MODEL: &str = "meta-llama/llama-4-maverick-17b-128e-instruct";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Document excerpt cap for PDF questions, in characters.
pub const PDF_CONTEXT_LIMIT: usize = 15_000;
pub const PDF_TEMPERATURE: f32 = 0.3;

pub const CHAT_MAX_TOKENS: u32 = 2048;
pub const QA_MAX_TOKENS: u32 = 1024;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error("no document loaded in this session")]
    NoDocument,
    #[error("no image loaded in this session")]
    NoImage,
    #[error("completion failed: {0}")]
    Completion(#[from] LlmError),
    #[error(transparent)]
    History(#[from] HistoryError),
}

/// Result of one assistant interaction: the reply plus the two turns as
/// they were persisted.
#[derive(Debug)]
pub struct Exchange {
    pub user_turn: Turn,
    pub assistant_turn: Turn,
}

impl Exchange {
    #[must_use]
    pub fn reply(&self) -> &str {
        &self.assistant_turn.content
    }
}

// =============================================================================
// REQUEST SHAPING
// =============================================================================

/// Free chat: system prompt + full history + the new user message.
#[must_use]
pub fn build_chat_request(model: &str, temperature: f32, history: &[Turn], message: &str) -> CompletionRequest {
    let mut messages: Vec<ChatMessage> = history
        .iter()
        .map(|t| ChatMessage::text(t.role.as_str(), t.content.clone()))
        .collect();
    messages.push(ChatMessage::text(Role::User.as_str(), message));

    CompletionRequest {
        model: model.to_string(),
        temperature,
        max_tokens: CHAT_MAX_TOKENS,
        system: Some(CHAT_SYSTEM_PROMPT.to_string()),
        messages,
    }
}

/// PDF Q&A: one self-contained prompt per question. Prior answers are not
/// sent; each question stands alone against the document excerpt.
#[must_use]
pub fn build_pdf_request(model: &str, document: &str, question: &str) -> CompletionRequest {
    let excerpt = truncate_chars(document, PDF_CONTEXT_LIMIT);
    let prompt = format!(
        "Based on the document below, provide a clear and concise answer to the question.\n\
         If the answer is not in the document, say \"I cannot find this information in the document.\"\n\
         \n\
         DOCUMENT:\n\
         {excerpt}\n\
         \n\
         QUESTION: {question}\n\
         \n\
         ANSWER:"
    );

    CompletionRequest {
        model: model.to_string(),
        temperature: PDF_TEMPERATURE,
        max_tokens: QA_MAX_TOKENS,
        system: None,
        messages: vec![ChatMessage::text(Role::User.as_str(), prompt)],
    }
}

/// Image Q&A: a single user turn pairing the question text with an inline
/// base64 JPEG. No history is sent with image turns.
#[must_use]
pub fn build_image_request(model: &str, temperature: f32, question: &str, image_base64: &str) -> CompletionRequest {
    CompletionRequest {
        model: model.to_string(),
        temperature,
        max_tokens: QA_MAX_TOKENS,
        system: None,
        messages: vec![ChatMessage {
            role: Role::User.as_str().to_string(),
            content: MessageContent::text_with_image(question, image_base64),
        }],
    }
}

/// Truncate to at most `limit` characters without splitting a code point.
pub(crate) fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

// =============================================================================
// MODE ORCHESTRATION
// =============================================================================

/// Run one free-chat interaction for the session.
pub async fn run_chat(
    state: &AppState,
    token: &str,
    user_id: Uuid,
    message: &str,
    model: &str,
    temperature: f32,
) -> Result<Exchange, AssistantError> {
    let history = conversation::turns(state, token, user_id, Channel::Chat).await?;
    let request = build_chat_request(model, temperature, &history, message);

    info!(%user_id, channel = %Channel::Chat, model, turns = history.len(), "assistant: completion request");
    let reply = state.llm.complete(&request).await?;

    let (user_turn, assistant_turn) =
        conversation::record_exchange(state, token, user_id, Channel::Chat, message, &reply).await?;
    Ok(Exchange { user_turn, assistant_turn })
}

/// Run one PDF question against the session's active document.
pub async fn run_pdf_question(
    state: &AppState,
    token: &str,
    user_id: Uuid,
    question: &str,
    model: &str,
) -> Result<Exchange, AssistantError> {
    let document = conversation::document_text(state, token)
        .await
        .ok_or(AssistantError::NoDocument)?;
    let request = build_pdf_request(model, &document, question);

    info!(%user_id, channel = %Channel::Pdf, model, document_chars = document.len(), "assistant: completion request");
    let reply = state.llm.complete(&request).await?;

    let (user_turn, assistant_turn) =
        conversation::record_exchange(state, token, user_id, Channel::Pdf, question, &reply).await?;
    Ok(Exchange { user_turn, assistant_turn })
}

/// Run one image question against the session's active image.
pub async fn run_image_question(
    state: &AppState,
    token: &str,
    user_id: Uuid,
    question: &str,
    model: &str,
    temperature: f32,
) -> Result<Exchange, AssistantError> {
    let image = conversation::image(state, token)
        .await
        .ok_or(AssistantError::NoImage)?;
    let request = build_image_request(model, temperature, question, &image.base64);

    info!(%user_id, channel = %Channel::Image, model, width = image.width, height = image.height, "assistant: completion request");
    let reply = state.llm.complete(&request).await?;

    let (user_turn, assistant_turn) =
        conversation::record_exchange(state, token, user_id, Channel::Image, question, &reply).await?;
    Ok(Exchange { user_turn, assistant_turn })
}

#[cfg(test)]
#[path = "assistant_test.rs"]
mod tests;
