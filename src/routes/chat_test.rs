use super::*;
use crate::llm::LlmError;
use crate::services::history::HistoryError;

// =============================================================================
// parse_channel
// =============================================================================

#[test]
fn known_channels_parse() {
    assert_eq!(parse_channel("chat").unwrap(), Channel::Chat);
    assert_eq!(parse_channel("pdf").unwrap(), Channel::Pdf);
    assert_eq!(parse_channel("image").unwrap(), Channel::Image);
}

#[test]
fn unknown_channel_is_bad_request() {
    let response = parse_channel("video").unwrap_err();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// assistant_error mapping
// =============================================================================

#[test]
fn missing_contexts_are_conflicts() {
    assert_eq!(assistant_error(&AssistantError::NoDocument).status(), StatusCode::CONFLICT);
    assert_eq!(assistant_error(&AssistantError::NoImage).status(), StatusCode::CONFLICT);
}

#[test]
fn completion_failures_are_bad_gateway() {
    let e = AssistantError::Completion(LlmError::ApiResponse { status: 429, body: "rate limited".into() });
    assert_eq!(assistant_error(&e).status(), StatusCode::BAD_GATEWAY);

    let timeout = AssistantError::Completion(LlmError::Timeout);
    assert_eq!(assistant_error(&timeout).status(), StatusCode::BAD_GATEWAY);
}

#[test]
fn persistence_failures_are_internal_errors() {
    let e = AssistantError::History(HistoryError::Database(sqlx::Error::PoolTimedOut));
    assert_eq!(assistant_error(&e).status(), StatusCode::INTERNAL_SERVER_ERROR);
}
