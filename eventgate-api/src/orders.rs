use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::Serialize;
use tracing::info;

use eventgate_core::gateway::APPROVAL_CONFIRMED;
use eventgate_core::models::PlaceOrderRequest;
use eventgate_order::PlacementOutcome;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
struct StoreOrderResponse {
    message: String,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/storeOrder", post(store_order))
}

/// POST /storeOrder
/// Book the order with the external booking API, request approval, and
/// persist it on full success. 200 with the approval message on success,
/// 400 with the rejection message otherwise.
async fn store_order(
    State(state): State<AppState>,
    Json(request): Json<PlaceOrderRequest>,
) -> Result<Response, AppError> {
    let outcome = state.workflow.place_order(request).await?;

    match outcome {
        PlacementOutcome::Approved { order } => {
            info!("Order approved and stored: barcode {}", order.barcode);
            Ok((
                StatusCode::OK,
                Json(StoreOrderResponse {
                    message: APPROVAL_CONFIRMED.to_string(),
                }),
            )
                .into_response())
        }
        PlacementOutcome::Rejected { message } => {
            info!("Order rejected: {}", message);
            Ok((StatusCode::BAD_REQUEST, Json(StoreOrderResponse { message })).into_response())
        }
    }
}
