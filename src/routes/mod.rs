//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Binds the JSON API under `/api` for the browser frontend. Uploads arrive
//! as raw request bodies, so the default body limit is raised to cover
//! typical PDFs and photos.

pub mod auth;
pub mod chat;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};

use crate::state::AppState;

const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Assemble the application router.
#[must_use]
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        .route("/api/chat/message", post(chat::send_message))
        .route(
            "/api/chat/{channel}/history",
            get(chat::get_history).delete(chat::clear_history),
        )
        .route("/api/chat/{channel}/transcript", get(chat::download_transcript))
        .route("/api/pdf/document", post(chat::upload_pdf))
        .route("/api/pdf/question", post(chat::ask_pdf))
        .route("/api/image", post(chat::upload_image))
        .route("/api/image/preview", get(chat::image_preview))
        .route("/api/image/question", post(chat::ask_image))
        .route("/healthz", get(healthz))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
