mod db;
mod extract;
mod llm;
mod routes;
mod services;
mod state;

use std::sync::Arc;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()
        .expect("invalid PORT");

    let pool = db::init_pool(&db::database_url())
        .await
        .expect("database init failed");

    // Missing or malformed credentials halt startup; every mode needs the
    // completion service.
    let llm: Arc<dyn llm::CompletionBackend> = match llm::LlmClient::from_env() {
        Ok(client) => {
            tracing::info!("completion client initialized");
            Arc::new(client)
        }
        Err(e) => {
            tracing::error!(error = %e, "completion client configuration failed");
            std::process::exit(1);
        }
    };

    let state = state::AppState::new(pool, llm);

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "askbox listening");
    axum::serve(listener, app).await.expect("server failed");
}
