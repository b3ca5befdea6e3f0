//! Recurring charge endpoint for the billing host.

use axum::{Json, Router, extract::State, response::IntoResponse, routing::post};

use crate::adapters::http::app_state::AppState;
use crate::app_error::AppResult;
use crate::application::use_cases::charge::ChargeRequest;

/// POST /api/charges
///
/// Runs the configured recurring strategy against one due invoice. The
/// response is always 200 with a structured outcome; the billing host
/// records the message and schedules its own retries.
async fn create_charge(
    State(app_state): State<AppState>,
    Json(request): Json<ChargeRequest>,
) -> AppResult<impl IntoResponse> {
    let outcome = app_state.charges.run(&request).await;
    Ok(Json(outcome))
}

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/", post(create_charge))
}
