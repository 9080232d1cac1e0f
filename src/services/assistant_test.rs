use super::*;
use crate::llm::MessageContent;
use crate::state::test_helpers;
use std::sync::Arc;
use time::OffsetDateTime;

fn turn(role: Role, content: &str) -> Turn {
    Turn { role, content: content.into(), created_at: OffsetDateTime::UNIX_EPOCH }
}

// =============================================================================
// truncate_chars
// =============================================================================

#[test]
fn truncate_shorter_text_is_untouched() {
    assert_eq!(truncate_chars("hello", 10), "hello");
}

#[test]
fn truncate_cuts_at_char_count() {
    assert_eq!(truncate_chars("hello world", 5), "hello");
}

#[test]
fn truncate_counts_chars_not_bytes() {
    // Four 3-byte chars; a byte slice at 6 would split the third one.
    assert_eq!(truncate_chars("日本語文", 3), "日本語");
}

// =============================================================================
// build_chat_request
// =============================================================================

#[test]
fn chat_request_carries_system_prompt_and_full_history() {
    let history = vec![turn(Role::User, "hello"), turn(Role::Assistant, "hi there")];
    let request = build_chat_request(DEFAULT_TEXT_MODEL, 0.7, &history, "how are you?");

    assert_eq!(request.system.as_deref(), Some(CHAT_SYSTEM_PROMPT));
    assert_eq!(request.max_tokens, CHAT_MAX_TOKENS);
    assert_eq!(request.messages.len(), 3);
    assert_eq!(request.messages[0].role, "user");
    assert_eq!(request.messages[1].role, "assistant");
    assert!(matches!(&request.messages[2].content, MessageContent::Text(t) if t == "how are you?"));
}

#[test]
fn chat_request_with_empty_history_has_one_message() {
    let request = build_chat_request(DEFAULT_TEXT_MODEL, 0.2, &[], "first");
    assert_eq!(request.messages.len(), 1);
    assert!((request.temperature - 0.2).abs() < f32::EPSILON);
}

// =============================================================================
// build_pdf_request
// =============================================================================

#[test]
fn pdf_request_is_a_single_self_contained_prompt() {
    let request = build_pdf_request(DEFAULT_TEXT_MODEL, "annual report body", "what is the revenue?");

    assert!(request.system.is_none());
    assert_eq!(request.messages.len(), 1);
    assert_eq!(request.max_tokens, QA_MAX_TOKENS);
    assert!((request.temperature - PDF_TEMPERATURE).abs() < f32::EPSILON);

    let MessageContent::Text(prompt) = &request.messages[0].content else {
        panic!("expected text prompt");
    };
    assert!(prompt.contains("DOCUMENT:\nannual report body"));
    assert!(prompt.contains("QUESTION: what is the revenue?"));
    assert!(prompt.contains("I cannot find this information in the document."));
}

#[test]
fn pdf_request_truncates_long_documents() {
    let document = "x".repeat(PDF_CONTEXT_LIMIT + 500);
    let request = build_pdf_request(DEFAULT_TEXT_MODEL, &document, "q");

    let MessageContent::Text(prompt) = &request.messages[0].content else {
        panic!("expected text prompt");
    };
    let excerpt_len = prompt.matches('x').count();
    assert_eq!(excerpt_len, PDF_CONTEXT_LIMIT);
}

// =============================================================================
// build_image_request
// =============================================================================

#[test]
fn image_request_pairs_question_with_data_url() {
    let request = build_image_request(DEFAULT_VISION_MODEL, 0.7, "what is this?", "QUJD");

    assert!(request.system.is_none());
    assert_eq!(request.max_tokens, QA_MAX_TOKENS);
    assert_eq!(request.messages.len(), 1);

    let json = serde_json::to_value(&request.messages[0]).unwrap();
    let parts = json["content"].as_array().unwrap();
    assert_eq!(parts[0]["text"], "what is this?");
    assert_eq!(parts[1]["image_url"]["url"], "data:image/jpeg;base64,QUJD");
}

// =============================================================================
// orchestration failure paths (no database needed)
// =============================================================================

#[tokio::test]
async fn failed_completion_leaves_memory_untouched() {
    let state = test_helpers::test_app_state_with_llm(Arc::new(test_helpers::FailingBackend));
    let user_id = test_helpers::seed_session(&state, "tok").await;

    // Mark the channel Loaded with one existing turn.
    {
        let mut sessions = state.sessions.write().await;
        sessions
            .get_mut("tok")
            .unwrap()
            .conversations
            .insert(Channel::Chat, vec![turn(Role::User, "earlier")]);
    }

    let result = run_chat(&state, "tok", user_id, "hello", DEFAULT_TEXT_MODEL, 0.7).await;
    assert!(matches!(result, Err(AssistantError::Completion(_))));

    let sessions = state.sessions.read().await;
    let seq = &sessions.get("tok").unwrap().conversations[&Channel::Chat];
    assert_eq!(seq.len(), 1, "failed interaction must not mutate the sequence");
}

#[tokio::test]
async fn pdf_question_without_document_is_rejected() {
    let state = test_helpers::test_app_state();
    let user_id = test_helpers::seed_session(&state, "tok").await;

    let result = run_pdf_question(&state, "tok", user_id, "q", DEFAULT_TEXT_MODEL).await;
    assert!(matches!(result, Err(AssistantError::NoDocument)));
}

#[tokio::test]
async fn image_question_without_image_is_rejected() {
    let state = test_helpers::test_app_state();
    let user_id = test_helpers::seed_session(&state, "tok").await;

    let result = run_image_question(&state, "tok", user_id, "q", DEFAULT_VISION_MODEL, 0.7).await;
    assert!(matches!(result, Err(AssistantError::NoImage)));
}
