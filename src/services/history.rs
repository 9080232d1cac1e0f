//! Chat-history persistence gateway.
//!
//! DESIGN
//! ======
//! Turns are immutable rows partitioned by (user, channel). Reads come back
//! ordered by creation time with the serial id as tiebreaker, so N appends
//! always reload in call order. `append_exchange` writes a question/answer
//! pair in one transaction: either both turns become durable or neither does.

use std::str::FromStr;

use sqlx::{PgPool, Row};
use time::OffsetDateTime;
use uuid::Uuid;

// =============================================================================
// TYPES
// =============================================================================

/// Logical partition of conversation history by assistant mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Chat,
    Pdf,
    Image,
}

impl Channel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Pdf => "pdf",
            Self::Image => "image",
        }
    }
}

impl FromStr for Channel {
    type Err = HistoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chat" => Ok(Self::Chat),
            "pdf" => Ok(Self::Pdf),
            "image" => Ok(Self::Image),
            other => Err(HistoryError::UnknownChannel(other.to_string())),
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Author of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }
}

impl FromStr for Role {
    type Err = HistoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            "system" => Ok(Self::System),
            other => Err(HistoryError::UnknownRole(other.to_string())),
        }
    }
}

/// One immutable message in a conversation.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("unknown channel: {0}")]
    UnknownChannel(String),
    #[error("unknown role in stored history: {0}")]
    UnknownRole(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

// =============================================================================
// OPERATIONS
// =============================================================================

/// Insert one turn, returning it with its database timestamp.
///
/// # Errors
///
/// Returns a database error if the insert fails; nothing is retried.
pub async fn append_turn(
    pool: &PgPool,
    user_id: Uuid,
    channel: Channel,
    role: Role,
    content: &str,
) -> Result<Turn, HistoryError> {
    let row = sqlx::query(
        r"INSERT INTO chat_history (user_id, chat_type, role, content)
          VALUES ($1, $2, $3, $4)
          RETURNING created_at",
    )
    .bind(user_id)
    .bind(channel.as_str())
    .bind(role.as_str())
    .bind(content)
    .fetch_one(pool)
    .await?;

    Ok(Turn { role, content: content.to_string(), created_at: row.get("created_at") })
}

/// Insert a question/answer pair in a single transaction.
///
/// # Errors
///
/// On any failure the transaction rolls back and neither turn is stored.
pub async fn append_exchange(
    pool: &PgPool,
    user_id: Uuid,
    channel: Channel,
    user_content: &str,
    assistant_content: &str,
) -> Result<(Turn, Turn), HistoryError> {
    let mut tx = pool.begin().await?;

    let user_row = sqlx::query(
        r"INSERT INTO chat_history (user_id, chat_type, role, content)
          VALUES ($1, $2, $3, $4)
          RETURNING created_at",
    )
    .bind(user_id)
    .bind(channel.as_str())
    .bind(Role::User.as_str())
    .bind(user_content)
    .fetch_one(&mut *tx)
    .await?;

    let assistant_row = sqlx::query(
        r"INSERT INTO chat_history (user_id, chat_type, role, content)
          VALUES ($1, $2, $3, $4)
          RETURNING created_at",
    )
    .bind(user_id)
    .bind(channel.as_str())
    .bind(Role::Assistant.as_str())
    .bind(assistant_content)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok((
        Turn { role: Role::User, content: user_content.to_string(), created_at: user_row.get("created_at") },
        Turn {
            role: Role::Assistant,
            content: assistant_content.to_string(),
            created_at: assistant_row.get("created_at"),
        },
    ))
}

/// Load all turns for (user, channel) in creation order. An empty channel
/// yields an empty vec, not an error.
///
/// # Errors
///
/// Returns a database error if the query fails, or `UnknownRole` if a stored
/// row carries a role this build does not know.
pub async fn load_conversation(pool: &PgPool, user_id: Uuid, channel: Channel) -> Result<Vec<Turn>, HistoryError> {
    let rows = sqlx::query(
        r"SELECT role, content, created_at
          FROM chat_history
          WHERE user_id = $1 AND chat_type = $2
          ORDER BY created_at ASC, chat_id ASC",
    )
    .bind(user_id)
    .bind(channel.as_str())
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|row| {
            let role: String = row.get("role");
            Ok(Turn {
                role: Role::from_str(&role)?,
                content: row.get("content"),
                created_at: row.get("created_at"),
            })
        })
        .collect()
}

/// Delete all turns for (user, channel). Idempotent: clearing an empty
/// channel succeeds with zero rows affected.
///
/// # Errors
///
/// Returns a database error if the delete fails.
pub async fn clear_conversation(pool: &PgPool, user_id: Uuid, channel: Channel) -> Result<u64, HistoryError> {
    let result = sqlx::query("DELETE FROM chat_history WHERE user_id = $1 AND chat_type = $2")
        .bind(user_id)
        .bind(channel.as_str())
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

// =============================================================================
// TRANSCRIPT EXPORT
// =============================================================================

/// Render a channel's turns as a plain-text transcript, one
/// `ROLE: content` paragraph per turn in chronological order.
#[must_use]
pub fn render_transcript(turns: &[Turn]) -> String {
    turns
        .iter()
        .map(|t| format!("{}: {}", t.role.as_str().to_uppercase(), t.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
#[path = "history_test.rs"]
mod tests;
