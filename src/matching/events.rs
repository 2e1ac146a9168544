//! Broadcast fan-out of book/trade/bbo events to websocket subscribers.
//!
//! One `broadcast::Sender` per logical stream, shared across all symbols; a
//! consumer filters by symbol after receiving. A send with no live receivers
//! returns `Err` from `tokio::sync::broadcast`, which we simply ignore: a
//! subscriber that has disconnected just stops receiving, no unsubscribe
//! bookkeeping needed.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio::sync::broadcast;

use super::order::{OrderId, Side};

const CHANNEL_CAPACITY: usize = 1024;

#[derive(Debug, Clone)]
pub struct BookUpdateEvent {
    pub symbol: String,
    pub bids: Vec<(Decimal, Decimal)>,
    pub asks: Vec<(Decimal, Decimal)>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct TradeEvent {
    pub symbol: String,
    pub trade_id: uuid::Uuid,
    pub price: Decimal,
    pub quantity: Decimal,
    pub aggressor_side: Side,
    pub maker_order_id: OrderId,
    pub taker_order_id: OrderId,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct BboEvent {
    pub symbol: String,
    pub best_bid_price: Option<Decimal>,
    pub best_bid_quantity: Option<Decimal>,
    pub best_ask_price: Option<Decimal>,
    pub best_ask_quantity: Option<Decimal>,
    pub timestamp: DateTime<Utc>,
}

/// Holds the three broadcast channels and exposes subscribe/publish.
pub struct EventPublisher {
    book_tx: broadcast::Sender<BookUpdateEvent>,
    trade_tx: broadcast::Sender<TradeEvent>,
    bbo_tx: broadcast::Sender<BboEvent>,
}

impl EventPublisher {
    pub fn new() -> Self {
        let (book_tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        let (trade_tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        let (bbo_tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { book_tx, trade_tx, bbo_tx }
    }

    pub fn subscribe_book(&self) -> broadcast::Receiver<BookUpdateEvent> {
        self.book_tx.subscribe()
    }

    pub fn subscribe_trades(&self) -> broadcast::Receiver<TradeEvent> {
        self.trade_tx.subscribe()
    }

    pub fn subscribe_bbo(&self) -> broadcast::Receiver<BboEvent> {
        self.bbo_tx.subscribe()
    }

    pub fn publish_book(&self, event: BookUpdateEvent) {
        let _ = self.book_tx.send(event);
    }

    pub fn publish_trade(&self, event: TradeEvent) {
        let _ = self.trade_tx.send(event);
    }

    pub fn publish_bbo(&self, event: BboEvent) {
        let _ = self.bbo_tx.send(event);
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}
