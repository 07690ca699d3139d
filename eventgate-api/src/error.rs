use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use eventgate_core::repository::RepositoryError;
use eventgate_order::PlacementError;

// Malformed or incomplete request bodies are handled by the axum `Json`
// rejection before a handler runs, so there is no validation variant here.
#[derive(Debug)]
pub enum AppError {
    ConflictError(String),
    GatewayError(String),
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, msg),
            AppError::GatewayError(msg) => {
                tracing::error!("Upstream gateway failure: {}", msg);
                (StatusCode::BAD_GATEWAY, "Upstream gateway failure".to_string())
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<PlacementError> for AppError {
    fn from(err: PlacementError) -> Self {
        match err {
            PlacementError::Gateway(e) => AppError::GatewayError(e.to_string()),
            PlacementError::Repository(RepositoryError::DuplicateBarcode(barcode)) => {
                AppError::ConflictError(format!("barcode {} already stored", barcode))
            }
            PlacementError::Repository(e) => AppError::InternalServerError(e.to_string()),
        }
    }
}
