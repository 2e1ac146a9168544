//! Wire DTOs for book snapshot and BBO responses.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct BookQuery {
    pub depth: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct BookSnapshotResponse {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    /// Highest price first.
    pub bids: Vec<(Decimal, Decimal)>,
    /// Lowest price first.
    pub asks: Vec<(Decimal, Decimal)>,
}

#[derive(Debug, Serialize)]
pub struct BboResponse {
    pub symbol: String,
    pub best_bid: Option<Decimal>,
    pub best_bid_quantity: Option<Decimal>,
    pub best_ask: Option<Decimal>,
    pub best_ask_quantity: Option<Decimal>,
    pub timestamp: DateTime<Utc>,
}
