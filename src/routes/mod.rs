pub mod chat;
pub mod generate;
pub mod health;
pub mod metrics;
pub mod notify;

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;

use crate::app_state::AppState;

/// API routes sharing the application state. The metrics endpoint is added
/// separately in `main` because it carries its own exporter state.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route(
            "/api/v1/generate",
            post(generate::generate).options(preflight),
        )
        .route("/api/v1/chat", post(chat::chat).options(preflight))
        .route("/api/v1/notify", post(notify::notify).options(preflight))
        .with_state(state)
}

/// Plain OPTIONS probes get an empty 204; the CORS layer stamps the
/// permissive headers onto the response.
async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}
