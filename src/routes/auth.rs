//! Auth routes — registration, password login, session management.

use axum::extract::{FromRef, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use serde_json::json;
use time::Duration;

use crate::services::{auth as auth_svc, conversation, session};
use crate::state::AppState;

const COOKIE_NAME: &str = "session_token";

/// Minimum password length accepted at registration.
const MIN_PASSWORD_LEN: usize = 6;

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

pub(crate) fn cookie_secure() -> bool {
    env_bool("COOKIE_SECURE").unwrap_or(false)
}

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(cookie_secure())
        .build()
}

fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(cookie_secure())
        .max_age(Duration::ZERO)
        .build()
}

// =============================================================================
// AUTH EXTRACTOR
// =============================================================================

/// Authenticated user extracted from the session cookie.
/// Use as a handler parameter to require authentication.
pub struct AuthUser {
    pub user: auth_svc::User,
    pub token: String,
}

impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar.get(COOKIE_NAME).map(Cookie::value).unwrap_or_default();
        if token.is_empty() {
            return Err(StatusCode::UNAUTHORIZED);
        }

        let app_state = AppState::from_ref(state);
        let user = session::validate_session(&app_state.pool, token)
            .await
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
            .ok_or(StatusCode::UNAUTHORIZED)?;

        Ok(Self { user, token: token.to_owned() })
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

#[derive(Deserialize)]
pub struct RegisterBody {
    username: String,
    email: String,
    password: String,
}

/// Reject obviously bad registration input before touching the database.
pub(crate) fn validate_registration(body: &RegisterBody) -> Result<(), &'static str> {
    if body.username.trim().is_empty() || body.email.trim().is_empty() || body.password.is_empty() {
        return Err("all fields are required");
    }
    if !body.email.contains('@') {
        return Err("invalid email address");
    }
    if body.password.chars().count() < MIN_PASSWORD_LEN {
        return Err("password must be at least 6 characters");
    }
    Ok(())
}

/// `POST /api/auth/register` — create an account.
pub async fn register(State(state): State<AppState>, Json(body): Json<RegisterBody>) -> Response {
    if let Err(reason) = validate_registration(&body) {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": reason }))).into_response();
    }

    match auth_svc::register_user(&state.pool, body.username.trim(), body.email.trim(), &body.password).await {
        Ok(user_id) => {
            tracing::info!(%user_id, "user registered");
            (StatusCode::CREATED, Json(json!({ "user_id": user_id }))).into_response()
        }
        Err(e @ (auth_svc::RegisterError::DuplicateUsername | auth_svc::RegisterError::DuplicateEmail)) => {
            (StatusCode::CONFLICT, Json(json!({ "error": e.to_string() }))).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "registration failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "registration failed" }))).into_response()
        }
    }
}

#[derive(Deserialize)]
pub struct LoginBody {
    username: String,
    password: String,
}

/// `POST /api/auth/login` — authenticate and start a session.
///
/// Unknown usernames and wrong passwords get the same response.
pub async fn login(State(state): State<AppState>, jar: CookieJar, Json(body): Json<LoginBody>) -> Response {
    let user = match auth_svc::authenticate(&state.pool, body.username.trim(), &body.password).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "invalid username or password" })))
                .into_response();
        }
        Err(e) => {
            tracing::error!(error = %e, "login failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "login failed" }))).into_response();
        }
    };

    let token = match session::create_session(&state.pool, user.user_id).await {
        Ok(t) => t,
        Err(e) => {
            tracing::error!(error = %e, "session creation failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "login failed" }))).into_response();
        }
    };

    tracing::info!(user_id = %user.user_id, "login");
    let jar = jar.add(session_cookie(token));
    (jar, Json(user)).into_response()
}

/// `POST /api/auth/logout` — delete the session and its in-memory cache.
pub async fn logout(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let _ = session::delete_session(&state.pool, &auth.token).await;
    conversation::drop_session(&state, &auth.token).await;

    let jar = CookieJar::new().add(clear_session_cookie());
    (jar, StatusCode::NO_CONTENT)
}

/// `GET /api/auth/me` — return the current user.
pub async fn me(auth: AuthUser) -> Json<auth_svc::User> {
    Json(auth.user)
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
