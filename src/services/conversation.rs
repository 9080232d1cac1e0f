//! Conversation state manager.
//!
//! DESIGN
//! ======
//! Each session token owns a `SessionCache` holding the channels it has
//! loaded. First access to a channel hydrates it from the database; later
//! accesses reuse memory without re-querying until the session ends.
//!
//! DURABILITY
//! ==========
//! Appends persist first and mutate memory only after the transaction
//! commits. A failed write therefore leaves the in-memory sequence exactly
//! as it was — the two views never silently diverge. Clearing resets the
//! in-memory sequence to empty (it stays Loaded) after the delete succeeds.

use uuid::Uuid;

use crate::state::{AppState, DocumentContext, ImageContext, SessionCache};

use super::history::{self, Channel, HistoryError, Turn};

// =============================================================================
// CONVERSATIONS
// =============================================================================

/// Return the turns for (session, channel), loading from storage on first
/// access (`Unloaded -> Loaded`).
pub async fn turns(
    state: &AppState,
    token: &str,
    user_id: Uuid,
    channel: Channel,
) -> Result<Vec<Turn>, HistoryError> {
    {
        let sessions = state.sessions.read().await;
        if let Some(loaded) = sessions.get(token).and_then(|c| c.conversations.get(&channel)) {
            return Ok(loaded.clone());
        }
    }

    let loaded = history::load_conversation(&state.pool, user_id, channel).await?;

    let mut sessions = state.sessions.write().await;
    let cache = sessions
        .entry(token.to_string())
        .or_insert_with(|| SessionCache::new(user_id));
    // Interactions within one session are serialized, but don't clobber a
    // sequence another task loaded between our locks.
    let entry = cache
        .conversations
        .entry(channel)
        .or_insert_with(|| loaded.clone());
    Ok(entry.clone())
}

/// Persist a question/answer pair and append it to the session's in-memory
/// sequence. The write is one transaction; memory is touched only after the
/// commit, so a storage failure leaves the cache unchanged.
pub async fn record_exchange(
    state: &AppState,
    token: &str,
    user_id: Uuid,
    channel: Channel,
    user_content: &str,
    assistant_content: &str,
) -> Result<(Turn, Turn), HistoryError> {
    // Hydrate first so the append lands on the full sequence.
    let _ = turns(state, token, user_id, channel).await?;

    let (user_turn, assistant_turn) =
        history::append_exchange(&state.pool, user_id, channel, user_content, assistant_content).await?;

    let mut sessions = state.sessions.write().await;
    let cache = sessions
        .entry(token.to_string())
        .or_insert_with(|| SessionCache::new(user_id));
    let seq = cache.conversations.entry(channel).or_default();
    seq.push(user_turn.clone());
    seq.push(assistant_turn.clone());

    Ok((user_turn, assistant_turn))
}

/// Clear (session, channel): delete the stored turns, then reset the
/// in-memory sequence to empty. Idempotent.
pub async fn clear(state: &AppState, token: &str, user_id: Uuid, channel: Channel) -> Result<(), HistoryError> {
    history::clear_conversation(&state.pool, user_id, channel).await?;

    let mut sessions = state.sessions.write().await;
    let cache = sessions
        .entry(token.to_string())
        .or_insert_with(|| SessionCache::new(user_id));
    cache.conversations.insert(channel, Vec::new());
    Ok(())
}

// =============================================================================
// TRANSIENT CONTEXTS
// =============================================================================

/// Replace the session's active document text. Never persisted.
pub async fn store_document(state: &AppState, token: &str, user_id: Uuid, text: String) {
    let mut sessions = state.sessions.write().await;
    let cache = sessions
        .entry(token.to_string())
        .or_insert_with(|| SessionCache::new(user_id));
    cache.document = Some(DocumentContext { text });
}

/// The active document text, if a PDF has been uploaded this session.
pub async fn document_text(state: &AppState, token: &str) -> Option<String> {
    let sessions = state.sessions.read().await;
    sessions
        .get(token)
        .and_then(|c| c.document.as_ref())
        .map(|d| d.text.clone())
}

/// Replace the session's active image. A new upload displaces the old one.
pub async fn store_image(state: &AppState, token: &str, user_id: Uuid, image: ImageContext) {
    let mut sessions = state.sessions.write().await;
    let cache = sessions
        .entry(token.to_string())
        .or_insert_with(|| SessionCache::new(user_id));
    cache.image = Some(image);
}

/// The active image payload, if one has been uploaded this session.
pub async fn image(state: &AppState, token: &str) -> Option<ImageContext> {
    let sessions = state.sessions.read().await;
    sessions.get(token).and_then(|c| c.image.clone())
}

/// Drop the whole session cache (logout). Conversations revert to Unloaded
/// for any future session of the same user.
pub async fn drop_session(state: &AppState, token: &str) {
    let mut sessions = state.sessions.write().await;
    sessions.remove(token);
}

#[cfg(test)]
#[path = "conversation_test.rs"]
mod tests;
