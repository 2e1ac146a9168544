//! Trade value type produced by the matching core.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::order::{OrderId, Side};

/// An executed trade. Immutable once produced.
///
/// `price` is always the maker's resting price (price improvement accrues
/// to the taker); `aggressor_side` is the taker's side.
#[derive(Debug, Clone)]
pub struct Trade {
    pub trade_id: uuid::Uuid,
    pub symbol: String,
    pub price: Decimal,
    pub quantity: Decimal,
    pub aggressor_side: Side,
    pub maker_order_id: OrderId,
    pub taker_order_id: OrderId,
    pub timestamp: DateTime<Utc>,
}
