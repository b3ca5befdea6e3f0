pub mod charge;
pub mod recurring;
pub mod webhook;

use axum::{Router, routing::get};

use crate::adapters::http::app_state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/webhooks", webhook::router())
        .nest("/charges", charge::router())
        .nest("/recurring", recurring::router())
}

/// GET /api/health
async fn health() -> &'static str {
    "ok"
}
