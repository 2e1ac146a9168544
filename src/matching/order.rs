//! Order domain types used inside the matching core.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type OrderId = Uuid;

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "buy"),
            Side::Sell => write!(f, "sell"),
        }
    }
}

/// The four supported order-type semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Market,
    Limit,
    /// Immediate-or-cancel.
    Ioc,
    /// Fill-or-kill.
    Fok,
}

impl OrderType {
    /// Whether this order type carries a limit price.
    pub fn requires_price(self) -> bool {
        !matches!(self, OrderType::Market)
    }

    /// Whether a residual (after matching) is ever allowed to rest in the book.
    pub fn may_rest(self) -> bool {
        matches!(self, OrderType::Limit)
    }
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderType::Market => write!(f, "market"),
            OrderType::Limit => write!(f, "limit"),
            OrderType::Ioc => write!(f, "ioc"),
            OrderType::Fok => write!(f, "fok"),
        }
    }
}

/// Order lifecycle status. Transitions monotonically:
/// `open -> partially_filled? -> (filled | cancelled)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Open,
    PartiallyFilled,
    Filled,
    Cancelled,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Open => write!(f, "open"),
            OrderStatus::PartiallyFilled => write!(f, "partially_filled"),
            OrderStatus::Filled => write!(f, "filled"),
            OrderStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// An order, live in the matching core.
///
/// `remaining_quantity` is mutated monotonically downward by the matching
/// core; once `status` reaches `filled` or `cancelled` the order is never
/// mutated again.
#[derive(Debug, Clone)]
pub struct Order {
    pub order_id: OrderId,
    pub symbol: String,
    pub side: Side,
    pub order_type: OrderType,
    pub original_quantity: Decimal,
    pub remaining_quantity: Decimal,
    /// Required for limit/ioc/fok, absent for market.
    pub price: Option<Decimal>,
    pub status: OrderStatus,
    pub timestamp: DateTime<Utc>,
}

impl Order {
    pub fn filled_quantity(&self) -> Decimal {
        self.original_quantity - self.remaining_quantity
    }

    pub fn is_resting(&self) -> bool {
        matches!(self.status, OrderStatus::Open | OrderStatus::PartiallyFilled)
            && self.remaining_quantity > Decimal::ZERO
    }

    /// Apply a fill of `quantity`, updating `remaining_quantity` and
    /// `status`. Never regresses `status`.
    pub fn apply_fill(&mut self, quantity: Decimal) {
        self.remaining_quantity -= quantity;
        if self.remaining_quantity <= Decimal::ZERO {
            self.remaining_quantity = Decimal::ZERO;
            self.status = OrderStatus::Filled;
        } else {
            self.status = OrderStatus::PartiallyFilled;
        }
    }
}
