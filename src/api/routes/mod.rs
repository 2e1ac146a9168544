use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::api::handlers;
use crate::AppState;

pub fn create_router(_state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders", post(handlers::order::submit_order).get(handlers::market::get_recent_orders_any))
        .route("/markets/:symbol/book", get(handlers::market::get_book))
        .route("/markets/:symbol/bbo", get(handlers::market::get_bbo))
        .route("/markets/:symbol/trades", get(handlers::market::get_recent_trades))
        .route("/markets/:symbol/orders", get(handlers::market::get_recent_orders))
}
