//! Account service — registration and password login.
//!
//! DESIGN
//! ======
//! Passwords are hashed with argon2id (salted PHC strings). Login fetches by
//! username and verifies the hash; an unknown username still pays one hashing
//! round so the caller cannot distinguish "no such user" from "wrong
//! password" by result or by timing.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use sqlx::{PgPool, Row};
use time::OffsetDateTime;
use uuid::Uuid;

// =============================================================================
// TYPES
// =============================================================================

/// Public user record. Never carries the password hash.
#[derive(Debug, Clone, serde::Serialize)]
pub struct User {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    #[error("username already exists")]
    DuplicateUsername,
    #[error("email already registered")]
    DuplicateEmail,
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

// =============================================================================
// PASSWORD HASHING
// =============================================================================

/// Hash a password into an argon2id PHC string with a fresh random salt.
pub fn hash_password(plain: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}

/// Verify a password against a stored PHC string. A malformed stored hash
/// verifies as false rather than erroring.
#[must_use]
pub fn verify_password(plain: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        return false;
    };
    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok()
}

// =============================================================================
// REGISTRATION
// =============================================================================

/// Map a unique-constraint name to the register error it represents.
pub(crate) fn classify_unique_violation(constraint: Option<&str>) -> Option<RegisterError> {
    match constraint {
        Some("users_username_key") => Some(RegisterError::DuplicateUsername),
        Some("users_email_key") => Some(RegisterError::DuplicateEmail),
        _ => None,
    }
}

/// Insert a new user with a hashed password, returning the generated id.
/// The single INSERT is its own transaction; a constraint violation leaves
/// no partial row behind.
///
/// # Errors
///
/// `DuplicateUsername` / `DuplicateEmail` when the matching uniqueness
/// constraint is violated, `Database` otherwise.
pub async fn register_user(
    pool: &PgPool,
    username: &str,
    email: &str,
    password: &str,
) -> Result<Uuid, RegisterError> {
    let password_hash = hash_password(password).map_err(|e| match e {
        AuthError::Hash(msg) => RegisterError::Hash(msg),
        AuthError::Database(db) => RegisterError::Database(db),
    })?;

    let result = sqlx::query(
        r"INSERT INTO users (username, email, password_hash)
          VALUES ($1, $2, $3)
          RETURNING user_id",
    )
    .bind(username)
    .bind(email)
    .bind(&password_hash)
    .fetch_one(pool)
    .await;

    match result {
        Ok(row) => Ok(row.get("user_id")),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            match classify_unique_violation(db_err.constraint()) {
                Some(conflict) => Err(conflict),
                None => Err(RegisterError::Database(sqlx::Error::Database(db_err))),
            }
        }
        Err(other) => Err(RegisterError::Database(other)),
    }
}

// =============================================================================
// LOGIN
// =============================================================================

/// Authenticate by username and password.
///
/// Returns `Ok(None)` for unknown usernames and wrong passwords alike; the
/// two cases are indistinguishable to the caller.
///
/// # Errors
///
/// Returns a database error if the lookup fails.
pub async fn authenticate(pool: &PgPool, username: &str, password: &str) -> Result<Option<User>, AuthError> {
    let row = sqlx::query(
        r"SELECT user_id, username, email, password_hash, created_at
          FROM users
          WHERE username = $1",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        // Burn one hashing round so the miss costs the same as a verify.
        let _ = hash_password(password);
        return Ok(None);
    };

    let stored: String = row.get("password_hash");
    if !verify_password(password, &stored) {
        return Ok(None);
    }

    Ok(Some(User {
        user_id: row.get("user_id"),
        username: row.get("username"),
        email: row.get("email"),
        created_at: row.get("created_at"),
    }))
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
