//! Host-facing recurring payment operations: mandate bootstrap and
//! subscription cancellation.

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::post,
};
use serde::{Deserialize, Serialize};

use crate::adapters::http::app_state::AppState;
use crate::app_error::{AppError, AppResult};
use crate::application::use_cases::recurring::ChargeParams;
use crate::domain::entities::amount::Amount;
use crate::domain::entities::payment_status::PaymentStatus;

#[derive(Debug, Deserialize)]
struct FirstPaymentRequest {
    invoice_id: i64,
    client_id: i64,
    amount: Amount,
    description: String,
    #[serde(default)]
    service_id: Option<i64>,
    #[serde(default)]
    return_url: Option<String>,
}

#[derive(Debug, Serialize)]
struct FirstPaymentResponse {
    transaction_id: String,
    status: PaymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    checkout_url: Option<String>,
}

/// POST /api/recurring/first-payment
///
/// Creates the mandate-establishing first payment for a client. The payer
/// must visit the returned checkout URL; settlement and mandate capture
/// arrive later through the webhook.
async fn create_first_payment(
    State(app_state): State<AppState>,
    Json(request): Json<FirstPaymentRequest>,
) -> AppResult<impl IntoResponse> {
    let params = ChargeParams {
        invoice_id: request.invoice_id,
        service_id: request.service_id,
        amount: request.amount,
        description: request.description,
        return_url: request.return_url,
    };

    let payment = app_state
        .recurring
        .start_first_payment(request.client_id, &params)
        .await?;

    Ok(Json(FirstPaymentResponse {
        transaction_id: payment.id,
        status: payment.status,
        checkout_url: payment.checkout_url,
    }))
}

/// POST /api/recurring/subscriptions/{subscription_id}/cancel
///
/// Cancels at Mollie first, then mirrors the cancellation locally. An
/// unknown subscription is 404; a provider refusal is 502 with the local
/// row left untouched.
async fn cancel_subscription(
    State(app_state): State<AppState>,
    Path(subscription_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let canceled = app_state
        .recurring
        .cancel_client_subscription(&subscription_id)
        .await?;
    if !canceled {
        return Err(AppError::Provider(format!(
            "Failed to cancel subscription {subscription_id}"
        )));
    }

    Ok(Json(serde_json::json!({ "status": "success" })))
}

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/first-payment", post(create_first_payment))
        .route(
            "/subscriptions/{subscription_id}/cancel",
            post(cancel_subscription),
        )
}
