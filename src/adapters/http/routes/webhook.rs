//! Mollie webhook endpoint.

use axum::{
    Form, Json, Router,
    extract::{
        Query, State,
        rejection::{FormRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::Deserialize;

use crate::adapters::http::app_state::AppState;

#[derive(Debug, Deserialize)]
struct CallbackBody {
    #[serde(default)]
    id: String,
}

#[derive(Debug, Deserialize)]
struct CallbackQuery {
    status: Option<String>,
}

/// POST /api/webhooks/mollie
///
/// Mollie posts the transaction reference form-encoded and only acts on the
/// response status: any non-2xx answer triggers a redelivery. Processing
/// failures are audited internally while the response stays 200, so a broken
/// payment cannot wedge the provider's retry queue. The only non-2xx answer
/// is 503 for a gateway with no usable API key.
async fn handle_mollie_webhook(
    State(app_state): State<AppState>,
    query: Result<Query<CallbackQuery>, QueryRejection>,
    body: Result<Form<CallbackBody>, FormRejection>,
) -> Response {
    if !app_state.callback.is_active() {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({
                "status": "error",
                "message": "Gateway not activated. Please try again later."
            })),
        )
            .into_response();
    }

    // A body that does not parse as a form carries no usable reference.
    // Treat it as an empty delivery; the response must stay 200.
    let reference = body.map(|Form(b)| b.id).unwrap_or_default();
    let status_override = query.ok().and_then(|Query(q)| q.status);

    app_state
        .callback
        .process(&reference, status_override.as_deref())
        .await;

    StatusCode::OK.into_response()
}

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/mollie", post(handle_mollie_webhook))
}
