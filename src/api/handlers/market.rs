use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;

use crate::models::{BboResponse, BookQuery, BookSnapshotResponse, RecentOrderResponse, RecentOrdersQuery, TradeResponse};
use crate::AppState;

const DEFAULT_BOOK_DEPTH: usize = 10;
const DEFAULT_TRADES_LIMIT: usize = 50;
const DEFAULT_ORDERS_LIMIT: usize = 100;

pub async fn get_book(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
    Query(query): Query<BookQuery>,
) -> Json<BookSnapshotResponse> {
    let depth = query.depth.unwrap_or(DEFAULT_BOOK_DEPTH);
    let (bids, asks) = state.matching_engine.snapshot(&symbol, depth).await;

    Json(BookSnapshotResponse { symbol, timestamp: chrono::Utc::now(), bids, asks })
}

pub async fn get_bbo(State(state): State<Arc<AppState>>, Path(symbol): Path<String>) -> Json<BboResponse> {
    let (best_bid, best_bid_quantity, best_ask, best_ask_quantity) = state.matching_engine.bbo(&symbol).await;

    Json(BboResponse {
        symbol,
        best_bid,
        best_bid_quantity,
        best_ask,
        best_ask_quantity,
        timestamp: chrono::Utc::now(),
    })
}

#[derive(Debug, serde::Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

pub async fn get_recent_trades(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
    Query(query): Query<LimitQuery>,
) -> Json<Vec<TradeResponse>> {
    let limit = query.limit.unwrap_or(DEFAULT_TRADES_LIMIT);
    let trades = state.matching_engine.recent_trades(&symbol, limit);
    Json(trades.iter().map(TradeResponse::from).collect())
}

pub async fn get_recent_orders(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
    Query(query): Query<LimitQuery>,
) -> Json<Vec<RecentOrderResponse>> {
    let limit = query.limit.unwrap_or(DEFAULT_ORDERS_LIMIT);
    let orders = state.matching_engine.recent_orders(Some(&symbol), limit);
    Json(orders.iter().map(RecentOrderResponse::from).collect())
}

/// Cross-symbol variant of `get_recent_orders`: `symbol` is an optional
/// query parameter rather than a path segment.
pub async fn get_recent_orders_any(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RecentOrdersQuery>,
) -> Json<Vec<RecentOrderResponse>> {
    let limit = query.limit.unwrap_or(DEFAULT_ORDERS_LIMIT);
    let orders = state.matching_engine.recent_orders(query.symbol.as_deref(), limit);
    Json(orders.iter().map(RecentOrderResponse::from).collect())
}
