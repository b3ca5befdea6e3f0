use crate::app_error::{AppError, ErrorCode};
use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the error before it gets converted into a status response.
        tracing::error!(error = ?self, "Request failed");

        match self {
            err @ AppError::MissingBinding => {
                error_resp(StatusCode::BAD_REQUEST, ErrorCode::MissingBinding, Some(err.to_string()))
            }
            err @ AppError::InvalidInvoice(_) => {
                error_resp(StatusCode::BAD_REQUEST, ErrorCode::InvalidInvoice, Some(err.to_string()))
            }
            err @ AppError::NoCustomer(_) => {
                error_resp(StatusCode::NOT_FOUND, ErrorCode::NoCustomer, Some(err.to_string()))
            }
            err @ AppError::NoMandate(_) => {
                error_resp(StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::NoMandate, Some(err.to_string()))
            }
            err @ AppError::UnknownSubscription(_) => {
                error_resp(StatusCode::NOT_FOUND, ErrorCode::UnknownSubscription, Some(err.to_string()))
            }
            err @ AppError::AlreadyProcessed(_) => {
                error_resp(StatusCode::CONFLICT, ErrorCode::AlreadyProcessed, Some(err.to_string()))
            }
            AppError::Provider(msg) => {
                error_resp(StatusCode::BAD_GATEWAY, ErrorCode::ProviderError, Some(msg))
            }
            AppError::NotFound => {
                error_resp(StatusCode::NOT_FOUND, ErrorCode::NotFound, None)
            }
            AppError::InvalidInput(msg) => {
                error_resp(StatusCode::BAD_REQUEST, ErrorCode::InvalidInput, Some(msg))
            }
            AppError::Database(_) => {
                error_resp(StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::DatabaseError, None)
            }
            AppError::Internal(_) => {
                error_resp(StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::InternalError, None)
            }
        }
    }
}

fn error_resp(status: StatusCode, code: ErrorCode, message: Option<String>) -> Response {
    let body = match message {
        Some(msg) => serde_json::json!({ "code": code.as_str(), "message": msg }),
        None => serde_json::json!({ "code": code.as_str() }),
    };
    (status, Json(body)).into_response()
}
