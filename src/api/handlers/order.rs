//! Order submission handler.

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::matching::OrderSubmission;
use crate::models::{CreateOrderRequest, SubmitOrderResponse};
use crate::utils::response::AppError;
use crate::AppState;

pub async fn submit_order(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<Json<SubmitOrderResponse>, AppError> {
    let submission = OrderSubmission {
        symbol: req.symbol,
        side: req.side,
        order_type: req.order_type,
        quantity: req.quantity,
        price: req.price,
    };

    let result = state.matching_engine.submit(submission).await?;

    Ok(Json(SubmitOrderResponse::from_result(&result.order, &result.trades)))
}
