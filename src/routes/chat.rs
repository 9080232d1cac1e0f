//! Assistant routes — chat messages, history, transcript export, and the
//! PDF / image upload + question flows.

use std::str::FromStr;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use serde_json::json;

use super::auth::AuthUser;
use crate::extract::{image as image_ex, pdf as pdf_ex};
use crate::services::assistant::{self, AssistantError};
use crate::services::history::{Channel, render_transcript};
use crate::services::conversation;
use crate::state::{AppState, ImageContext};

/// Characters of document text echoed back as the upload preview.
const PDF_PREVIEW_CHARS: usize = 2_000;

fn parse_channel(raw: &str) -> Result<Channel, Response> {
    Channel::from_str(raw)
        .map_err(|e| (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() }))).into_response())
}

fn assistant_error(e: &AssistantError) -> Response {
    match e {
        AssistantError::NoDocument | AssistantError::NoImage => {
            (StatusCode::CONFLICT, Json(json!({ "error": e.to_string() }))).into_response()
        }
        // The provider's message is surfaced verbatim; there is no retry and
        // no model fallback.
        AssistantError::Completion(inner) => {
            (StatusCode::BAD_GATEWAY, Json(json!({ "error": inner.to_string() }))).into_response()
        }
        AssistantError::History(inner) => {
            tracing::error!(error = %inner, "conversation persistence failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "failed to save conversation" })))
                .into_response()
        }
    }
}

// =============================================================================
// HISTORY
// =============================================================================

/// `GET /api/chat/{channel}/history` — the channel's turns, hydrating the
/// session cache on first access.
pub async fn get_history(State(state): State<AppState>, auth: AuthUser, Path(channel): Path<String>) -> Response {
    let channel = match parse_channel(&channel) {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    match conversation::turns(&state, &auth.token, auth.user.user_id, channel).await {
        Ok(turns) => Json(json!({ "channel": channel, "turns": turns })).into_response(),
        Err(e) => {
            tracing::error!(error = %e, %channel, "history load failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "failed to load history" }))).into_response()
        }
    }
}

/// `DELETE /api/chat/{channel}/history` — clear the channel. Idempotent.
pub async fn clear_history(State(state): State<AppState>, auth: AuthUser, Path(channel): Path<String>) -> Response {
    let channel = match parse_channel(&channel) {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    match conversation::clear(&state, &auth.token, auth.user.user_id, channel).await {
        Ok(()) => {
            tracing::info!(user_id = %auth.user.user_id, %channel, "history cleared");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, %channel, "history clear failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "failed to clear history" }))).into_response()
        }
    }
}

/// `GET /api/chat/{channel}/transcript` — plain-text download of the
/// channel's turns in chronological order.
pub async fn download_transcript(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(channel): Path<String>,
) -> Response {
    let channel = match parse_channel(&channel) {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    let turns = match conversation::turns(&state, &auth.token, auth.user.user_id, channel).await {
        Ok(turns) => turns,
        Err(e) => {
            tracing::error!(error = %e, %channel, "transcript load failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "failed to load history" })))
                .into_response();
        }
    };

    let filename = format!("attachment; filename=\"{}_history_{}.txt\"", channel, auth.user.username);
    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, filename),
        ],
        render_transcript(&turns),
    )
        .into_response()
}

// =============================================================================
// FREE CHAT
// =============================================================================

#[derive(Deserialize)]
pub struct MessageBody {
    message: String,
    model: Option<String>,
    temperature: Option<f32>,
}

/// `POST /api/chat/message` — one free-chat interaction.
pub async fn send_message(State(state): State<AppState>, auth: AuthUser, Json(body): Json<MessageBody>) -> Response {
    if body.message.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "message must not be empty" }))).into_response();
    }
    let model = body.model.as_deref().unwrap_or(assistant::DEFAULT_TEXT_MODEL);
    let temperature = body.temperature.unwrap_or(assistant::DEFAULT_TEMPERATURE);

    match assistant::run_chat(&state, &auth.token, auth.user.user_id, &body.message, model, temperature).await {
        Ok(exchange) => Json(json!({
            "reply": exchange.reply(),
            "turns": [exchange.user_turn, exchange.assistant_turn],
        }))
        .into_response(),
        Err(e) => assistant_error(&e),
    }
}

// =============================================================================
// PDF MODE
// =============================================================================

/// `POST /api/pdf/document` — upload a PDF; its extracted text becomes the
/// session's document context.
pub async fn upload_pdf(State(state): State<AppState>, auth: AuthUser, body: Bytes) -> Response {
    let extracted = match tokio::task::spawn_blocking(move || pdf_ex::extract_text(&body)).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(error = %e, "pdf extraction task failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "pdf extraction failed" })))
                .into_response();
        }
    };

    let text = match extracted {
        Ok(Some(text)) => text,
        // Parsed fine but no text layer: warn, don't error.
        Ok(None) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "warning": "could not extract text from PDF; the file might be empty or image-based" })),
            )
                .into_response();
        }
        Err(e) => {
            return (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "error": e.to_string() }))).into_response();
        }
    };

    let chars = text.chars().count();
    let preview = assistant::truncate_chars(&text, PDF_PREVIEW_CHARS).to_string();
    tracing::info!(user_id = %auth.user.user_id, chars, "pdf document loaded");
    conversation::store_document(&state, &auth.token, auth.user.user_id, text).await;

    Json(json!({ "chars": chars, "preview": preview })).into_response()
}

#[derive(Deserialize)]
pub struct PdfQuestionBody {
    question: String,
    model: Option<String>,
}

/// `POST /api/pdf/question` — answer one question against the session's
/// document. Questions are independent; no history is sent to the model.
pub async fn ask_pdf(State(state): State<AppState>, auth: AuthUser, Json(body): Json<PdfQuestionBody>) -> Response {
    if body.question.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "question must not be empty" }))).into_response();
    }
    let model = body.model.as_deref().unwrap_or(assistant::DEFAULT_TEXT_MODEL);

    match assistant::run_pdf_question(&state, &auth.token, auth.user.user_id, &body.question, model).await {
        Ok(exchange) => Json(json!({
            "reply": exchange.reply(),
            "turns": [exchange.user_turn, exchange.assistant_turn],
        }))
        .into_response(),
        Err(e) => assistant_error(&e),
    }
}

// =============================================================================
// IMAGE MODE
// =============================================================================

/// `POST /api/image` — upload an image; the encoded payload becomes the
/// session's image context, replacing any previous one.
pub async fn upload_image(State(state): State<AppState>, auth: AuthUser, body: Bytes) -> Response {
    let encoded = match tokio::task::spawn_blocking(move || image_ex::preprocess(&body)).await {
        Ok(Ok(encoded)) => encoded,
        Ok(Err(e)) => {
            return (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "error": e.to_string() }))).into_response();
        }
        Err(e) => {
            tracing::error!(error = %e, "image preprocessing task failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "image preprocessing failed" })))
                .into_response();
        }
    };

    tracing::info!(
        user_id = %auth.user.user_id,
        width = encoded.width,
        height = encoded.height,
        "image loaded"
    );
    let context =
        ImageContext { base64: encoded.base64, jpeg: encoded.jpeg, width: encoded.width, height: encoded.height };
    let (width, height) = (context.width, context.height);
    conversation::store_image(&state, &auth.token, auth.user.user_id, context).await;

    Json(json!({ "width": width, "height": height })).into_response()
}

/// `GET /api/image/preview` — the session's active image as normalized JPEG.
pub async fn image_preview(State(state): State<AppState>, auth: AuthUser) -> Response {
    match conversation::image(&state, &auth.token).await {
        Some(image) => ([(header::CONTENT_TYPE, "image/jpeg")], image.jpeg).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({ "error": "no image loaded in this session" }))).into_response(),
    }
}

#[derive(Deserialize)]
pub struct ImageQuestionBody {
    question: String,
    model: Option<String>,
    temperature: Option<f32>,
}

/// `POST /api/image/question` — answer one question about the session's
/// image. No conversation history is sent with image turns.
pub async fn ask_image(State(state): State<AppState>, auth: AuthUser, Json(body): Json<ImageQuestionBody>) -> Response {
    if body.question.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "question must not be empty" }))).into_response();
    }
    let model = body.model.as_deref().unwrap_or(assistant::DEFAULT_VISION_MODEL);
    let temperature = body.temperature.unwrap_or(assistant::DEFAULT_TEMPERATURE);

    match assistant::run_image_question(&state, &auth.token, auth.user.user_id, &body.question, model, temperature)
        .await
    {
        Ok(exchange) => Json(json!({
            "reply": exchange.reply(),
            "turns": [exchange.user_turn, exchange.assistant_turn],
        }))
        .into_response(),
        Err(e) => assistant_error(&e),
    }
}

#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;
