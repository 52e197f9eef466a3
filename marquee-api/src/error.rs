use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use marquee_core::{HoldError, LedgerError};
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    ValidationError(String),
    ServiceUnavailable(String),
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::ServiceUnavailable(msg) => {
                tracing::error!("Ledger unavailable: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, "Service Unavailable".to_string())
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<HoldError> for AppError {
    fn from(err: HoldError) -> Self {
        match err {
            HoldError::InvalidInput(msg) => AppError::ValidationError(msg),
            HoldError::Ledger(LedgerError::Unavailable(msg)) => AppError::ServiceUnavailable(msg),
            HoldError::Ledger(other) => AppError::InternalServerError(other.to_string()),
        }
    }
}
