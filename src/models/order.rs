//! Wire DTOs for order submission.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::matching::{Order, OrderStatus, OrderType, Side};

#[derive(Debug, Deserialize)]
pub struct RecentOrdersQuery {
    pub symbol: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub symbol: String,
    pub order_type: OrderType,
    pub side: Side,
    pub quantity: Decimal,
    pub price: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TradeResponse {
    pub trade_id: Uuid,
    pub price: Decimal,
    pub quantity: Decimal,
    pub aggressor_side: Side,
    pub maker_order_id: Uuid,
    pub taker_order_id: Uuid,
    pub timestamp: DateTime<Utc>,
}

impl From<&crate::matching::Trade> for TradeResponse {
    fn from(trade: &crate::matching::Trade) -> Self {
        Self {
            trade_id: trade.trade_id,
            price: trade.price,
            quantity: trade.quantity,
            aggressor_side: trade.aggressor_side,
            maker_order_id: trade.maker_order_id,
            taker_order_id: trade.taker_order_id,
            timestamp: trade.timestamp,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SubmitOrderResponse {
    pub order_id: Uuid,
    pub status: OrderStatus,
    pub filled_quantity: Decimal,
    pub remaining_quantity: Decimal,
    pub trades: Vec<TradeResponse>,
}

impl SubmitOrderResponse {
    pub fn from_result(order: &Order, trades: &[crate::matching::Trade]) -> Self {
        Self {
            order_id: order.order_id,
            status: order.status,
            filled_quantity: order.filled_quantity(),
            remaining_quantity: order.remaining_quantity,
            trades: trades.iter().map(TradeResponse::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RecentOrderResponse {
    pub order_id: Uuid,
    pub symbol: String,
    pub side: Side,
    pub order_type: OrderType,
    pub price: Option<Decimal>,
    pub original_quantity: Decimal,
    pub remaining_quantity: Decimal,
    pub status: OrderStatus,
    pub timestamp: DateTime<Utc>,
}

impl From<&Order> for RecentOrderResponse {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.order_id,
            symbol: order.symbol.clone(),
            side: order.side,
            order_type: order.order_type,
            price: order.price,
            original_quantity: order.original_quantity,
            remaining_quantity: order.remaining_quantity,
            status: order.status,
            timestamp: order.timestamp,
        }
    }
}
