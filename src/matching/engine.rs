//! The matching engine facade: the single entry point transport code talks
//! to. Owns one order book per symbol, serializes all mutation to a symbol
//! through that symbol's mutex, and fans out persistence writes and
//! broadcast events around each match.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use tracing::warn;
use uuid::Uuid;

use super::error::EngineError;
use super::events::{BboEvent, BookUpdateEvent, EventPublisher, TradeEvent};
use super::history::RecentHistory;
use super::matching_core::match_order;
use super::order::{Order, OrderId, OrderStatus, OrderType, Side};
use super::order_book::OrderBook;
use super::persistence::{InMemoryPersistence, PersistenceAdapter};
use super::trade::Trade;
use crate::metrics;

const SNAPSHOT_DEPTH: usize = 20;

pub struct OrderSubmission {
    pub symbol: String,
    pub side: Side,
    pub order_type: OrderType,
    pub quantity: Decimal,
    pub price: Option<Decimal>,
}

pub struct SubmitResult {
    pub order: Order,
    pub trades: Vec<Trade>,
}

/// One order book per symbol, guarded by an async mutex so the lock can be
/// held across the persistence and publish steps that follow a match, not
/// just the match itself. This keeps the order in which trades are
/// persisted and events are published for a symbol identical to the order
/// `submit` calls for that symbol were made in.
pub struct MatchingEngine {
    books: DashMap<String, Arc<Mutex<OrderBook>>>,
    known_symbols: Option<HashSet<String>>,
    persistence: Arc<dyn PersistenceAdapter>,
    events: EventPublisher,
    history: RecentHistory,
}

impl MatchingEngine {
    pub fn new() -> Self {
        Self::with_persistence(Arc::new(InMemoryPersistence::new()))
    }

    pub fn with_persistence(persistence: Arc<dyn PersistenceAdapter>) -> Self {
        Self {
            books: DashMap::new(),
            known_symbols: None,
            persistence,
            events: EventPublisher::new(),
            history: RecentHistory::new(),
        }
    }

    pub fn with_symbols(symbols: Vec<String>, persistence: Arc<dyn PersistenceAdapter>) -> Self {
        let mut engine = Self::with_persistence(persistence);
        engine.known_symbols = Some(symbols.into_iter().collect());
        engine
    }

    fn validate_symbol(&self, symbol: &str) -> Result<(), EngineError> {
        match &self.known_symbols {
            Some(known) if !known.contains(symbol) => Err(EngineError::UnknownSymbol(symbol.to_string())),
            _ => Ok(()),
        }
    }

    fn validate_submission(submission: &OrderSubmission) -> Result<(), EngineError> {
        if submission.quantity <= Decimal::ZERO {
            return Err(EngineError::InvalidOrder("quantity must be positive".into()));
        }
        if submission.order_type.requires_price() {
            match submission.price {
                Some(price) if price > Decimal::ZERO => {}
                _ => return Err(EngineError::InvalidOrder("price must be a positive value for this order type".into())),
            }
        }
        Ok(())
    }

    fn book_for(&self, symbol: &str) -> Arc<Mutex<OrderBook>> {
        self.books.entry(symbol.to_string()).or_insert_with(|| Arc::new(Mutex::new(OrderBook::new(symbol)))).clone()
    }

    /// Validate, construct, match and publish one order. The per-symbol book
    /// lock is acquired once and held across the match, the persistence
    /// writes for the outcome, and the event publish, so that two concurrent
    /// `submit` calls for the same symbol can never have their post-match
    /// phases interleave.
    pub async fn submit(&self, submission: OrderSubmission) -> Result<SubmitResult, EngineError> {
        self.validate_symbol(&submission.symbol)?;
        Self::validate_submission(&submission)?;

        metrics::record_order_submitted(submission.side.to_string().as_str(), submission.order_type.to_string().as_str());

        let incoming = Order {
            order_id: Uuid::new_v4(),
            symbol: submission.symbol.clone(),
            side: submission.side,
            order_type: submission.order_type,
            original_quantity: submission.quantity,
            remaining_quantity: submission.quantity,
            price: submission.price,
            status: OrderStatus::Open,
            timestamp: Utc::now(),
        };

        if let Err(err) = self.persistence.insert_order(&incoming).await {
            warn!(order_id = %incoming.order_id, error = %err, "failed to persist new order");
        }

        let book_handle = self.book_for(&submission.symbol);
        let mut book = book_handle.lock().await;

        let timer = metrics::Timer::new();
        let outcome = match_order(&mut book, incoming);
        metrics::record_order_match_duration(timer.elapsed_secs());

        if let Err(err) = self.persistence.upsert_order(&outcome.order).await {
            warn!(order_id = %outcome.order.order_id, error = %err, "failed to persist order outcome");
        }
        for trade in &outcome.trades {
            if let Err(err) = self.persistence.insert_trade(trade).await {
                warn!(trade_id = %trade.trade_id, error = %err, "failed to persist trade");
            }
            self.history.record_trade(trade);
            metrics::record_trade_executed();
        }
        self.history.record_order(&outcome.order);
        if outcome.order.status == OrderStatus::Cancelled {
            metrics::record_order_cancelled();
        }

        self.publish_post_match_events(&submission.symbol, &book, &outcome.trades);
        drop(book);

        Ok(SubmitResult { order: outcome.order, trades: outcome.trades })
    }

    /// Publishes trade events (if any), then one book snapshot and one BBO
    /// update for the symbol, unconditionally. A resting limit order, a
    /// rejected FOK, or a market order against an empty book still moves
    /// zero trades but subscribers expect one snapshot/BBO pair per submit
    /// regardless.
    fn publish_post_match_events(&self, symbol: &str, book: &OrderBook, trades: &[Trade]) {
        let now = Utc::now();
        for trade in trades {
            self.events.publish_trade(TradeEvent {
                symbol: symbol.to_string(),
                trade_id: trade.trade_id,
                price: trade.price,
                quantity: trade.quantity,
                aggressor_side: trade.aggressor_side,
                maker_order_id: trade.maker_order_id,
                taker_order_id: trade.taker_order_id,
                timestamp: trade.timestamp,
            });
        }

        let (bids, asks) = book.snapshot(SNAPSHOT_DEPTH);
        self.events.publish_book(BookUpdateEvent { symbol: symbol.to_string(), bids, asks, timestamp: now });

        let (bid_price, bid_qty, ask_price, ask_qty) = book.bbo();
        self.events.publish_bbo(BboEvent {
            symbol: symbol.to_string(),
            best_bid_price: bid_price,
            best_bid_quantity: bid_qty,
            best_ask_price: ask_price,
            best_ask_quantity: ask_qty,
            timestamp: now,
        });
    }

    pub async fn snapshot(&self, symbol: &str, depth: usize) -> (Vec<(Decimal, Decimal)>, Vec<(Decimal, Decimal)>) {
        match self.books.get(symbol) {
            Some(book) => book.lock().await.snapshot(depth),
            None => (Vec::new(), Vec::new()),
        }
    }

    pub async fn bbo(&self, symbol: &str) -> (Option<Decimal>, Option<Decimal>, Option<Decimal>, Option<Decimal>) {
        match self.books.get(symbol) {
            Some(book) => book.lock().await.bbo(),
            None => (None, None, None, None),
        }
    }

    pub fn recent_trades(&self, symbol: &str, limit: usize) -> Vec<Trade> {
        self.history.recent_trades(symbol, limit)
    }

    /// `symbol = None` lists the most recent orders across every symbol.
    pub fn recent_orders(&self, symbol: Option<&str>, limit: usize) -> Vec<Order> {
        self.history.recent_orders(symbol, limit)
    }

    pub fn subscribe_book(&self) -> tokio::sync::broadcast::Receiver<BookUpdateEvent> {
        self.events.subscribe_book()
    }
    pub fn subscribe_trades(&self) -> tokio::sync::broadcast::Receiver<TradeEvent> {
        self.events.subscribe_trades()
    }
    pub fn subscribe_bbo(&self) -> tokio::sync::broadcast::Receiver<BboEvent> {
        self.events.subscribe_bbo()
    }

    #[cfg(test)]
    pub async fn has_resting_order(&self, symbol: &str, order_id: OrderId) -> bool {
        match self.books.get(symbol) {
            Some(book) => book.lock().await.has_order(order_id),
            None => false,
        }
    }
}

impl Default for MatchingEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn limit(symbol: &str, side: Side, price: Decimal, qty: Decimal) -> OrderSubmission {
        OrderSubmission { symbol: symbol.into(), side, order_type: OrderType::Limit, quantity: qty, price: Some(price) }
    }

    fn market(symbol: &str, side: Side, qty: Decimal) -> OrderSubmission {
        OrderSubmission { symbol: symbol.into(), side, order_type: OrderType::Market, quantity: qty, price: None }
    }

    #[tokio::test]
    async fn submit_rejects_zero_quantity() {
        let engine = MatchingEngine::new();
        let result = engine.submit(limit("BTCUSD", Side::Buy, dec!(100), dec!(0))).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn submit_rejects_unknown_symbol_when_restricted() {
        let engine = MatchingEngine::with_symbols(vec!["BTCUSD".into()], Arc::new(InMemoryPersistence::new()));
        let result = engine.submit(limit("DOGEUSD", Side::Buy, dec!(1), dec!(1))).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn submit_accepts_a_market_order_with_a_price_ignored() {
        let engine = MatchingEngine::new();
        let submission = OrderSubmission {
            symbol: "BTCUSD".into(),
            side: Side::Buy,
            order_type: OrderType::Market,
            quantity: dec!(1),
            price: Some(dec!(100)),
        };
        let result = engine.submit(submission).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn resting_limit_order_appears_in_snapshot() {
        let engine = MatchingEngine::new();
        let result = engine.submit(limit("BTCUSD", Side::Buy, dec!(100), dec!(1))).await.unwrap();
        assert!(engine.has_resting_order("BTCUSD", result.order.order_id).await);
        let (bids, _) = engine.snapshot("BTCUSD", 10).await;
        assert_eq!(bids, vec![(dec!(100), dec!(1))]);
    }

    #[tokio::test]
    async fn crossing_orders_produce_a_trade_and_history_entry() {
        let engine = MatchingEngine::new();
        engine.submit(limit("BTCUSD", Side::Sell, dec!(100), dec!(1))).await.unwrap();
        let taker = engine.submit(limit("BTCUSD", Side::Buy, dec!(100), dec!(1))).await.unwrap();
        assert_eq!(taker.trades.len(), 1);
        assert_eq!(engine.recent_trades("BTCUSD", 10).len(), 1);
    }

    #[tokio::test]
    async fn resting_limit_order_publishes_a_book_and_bbo_event_with_no_trades() {
        let engine = MatchingEngine::new();
        let mut book_rx = engine.subscribe_book();
        let mut bbo_rx = engine.subscribe_bbo();

        let result = engine.submit(limit("BTCUSD", Side::Buy, dec!(100), dec!(1))).await.unwrap();
        assert!(result.trades.is_empty());

        let book_event = book_rx.try_recv().expect("book snapshot published even without a trade");
        assert_eq!(book_event.symbol, "BTCUSD");
        assert_eq!(book_event.bids, vec![(dec!(100), dec!(1))]);

        let bbo_event = bbo_rx.try_recv().expect("bbo update published even without a trade");
        assert_eq!(bbo_event.best_bid_price, Some(dec!(100)));
    }

    #[tokio::test]
    async fn empty_book_market_order_still_publishes_book_and_bbo() {
        let engine = MatchingEngine::new();
        let mut book_rx = engine.subscribe_book();
        let mut bbo_rx = engine.subscribe_bbo();

        let result = engine.submit(market("BTCUSD", Side::Sell, dec!(1))).await.unwrap();
        assert!(result.trades.is_empty());
        assert_eq!(result.order.status, OrderStatus::Cancelled);

        assert!(book_rx.try_recv().is_ok());
        assert!(bbo_rx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn crossing_orders_publish_trade_book_and_bbo_events() {
        let engine = MatchingEngine::new();
        let mut trade_rx = engine.subscribe_trades();
        let mut book_rx = engine.subscribe_book();
        let mut bbo_rx = engine.subscribe_bbo();

        engine.submit(limit("BTCUSD", Side::Sell, dec!(100), dec!(1))).await.unwrap();
        book_rx.try_recv().unwrap();
        bbo_rx.try_recv().unwrap();

        let taker = engine.submit(limit("BTCUSD", Side::Buy, dec!(100), dec!(1))).await.unwrap();
        assert_eq!(taker.trades.len(), 1);

        let trade_event = trade_rx.try_recv().expect("trade event published");
        assert_eq!(trade_event.price, dec!(100));
        assert!(book_rx.try_recv().is_ok());
        assert!(bbo_rx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn recent_orders_with_no_symbol_lists_across_markets() {
        let engine = MatchingEngine::new();
        engine.submit(limit("BTCUSD", Side::Buy, dec!(100), dec!(1))).await.unwrap();
        engine.submit(limit("ETHUSD", Side::Buy, dec!(50), dec!(1))).await.unwrap();

        assert_eq!(engine.recent_orders(None, 10).len(), 2);
        assert_eq!(engine.recent_orders(Some("BTCUSD"), 10).len(), 1);
    }
}
