//! In-memory ring buffers backing the "recent trades" / "recent orders"
//! read endpoints. This is a cache for fast reads, not a durability layer;
//! the persistence adapter is the durable sink.

use std::collections::VecDeque;

use dashmap::DashMap;
use parking_lot::Mutex;

use super::order::Order;
use super::trade::Trade;

const MAX_RETAINED: usize = 1000;

struct Ring<T> {
    items: Mutex<VecDeque<T>>,
}

impl<T: Clone> Ring<T> {
    fn new() -> Self {
        Self { items: Mutex::new(VecDeque::with_capacity(MAX_RETAINED)) }
    }

    fn push(&self, item: T) {
        let mut items = self.items.lock();
        if items.len() == MAX_RETAINED {
            items.pop_front();
        }
        items.push_back(item);
    }

    /// Most recent first, capped at `limit`.
    fn recent(&self, limit: usize) -> Vec<T> {
        self.items.lock().iter().rev().take(limit).cloned().collect()
    }
}

/// Per-symbol recent-order and recent-trade buffers, plus a cross-symbol
/// order ring for listings that span every market.
pub struct RecentHistory {
    orders: DashMap<String, Ring<Order>>,
    all_orders: Ring<Order>,
    trades: DashMap<String, Ring<Trade>>,
}

impl RecentHistory {
    pub fn new() -> Self {
        Self { orders: DashMap::new(), all_orders: Ring::new(), trades: DashMap::new() }
    }

    pub fn record_order(&self, order: &Order) {
        self.orders
            .entry(order.symbol.clone())
            .or_insert_with(Ring::new)
            .push(order.clone());
        self.all_orders.push(order.clone());
    }

    pub fn record_trade(&self, trade: &Trade) {
        self.trades
            .entry(trade.symbol.clone())
            .or_insert_with(Ring::new)
            .push(trade.clone());
    }

    /// Most recent orders, optionally restricted to one symbol. `None`
    /// returns the cross-symbol ring.
    pub fn recent_orders(&self, symbol: Option<&str>, limit: usize) -> Vec<Order> {
        match symbol {
            Some(symbol) => self.orders.get(symbol).map(|r| r.recent(limit)).unwrap_or_default(),
            None => self.all_orders.recent(limit),
        }
    }

    pub fn recent_trades(&self, symbol: &str, limit: usize) -> Vec<Trade> {
        self.trades.get(symbol).map(|r| r.recent(limit)).unwrap_or_default()
    }
}

impl Default for RecentHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::order::{OrderStatus, OrderType, Side};
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn order() -> Order {
        Order {
            order_id: Uuid::new_v4(),
            symbol: "BTCUSD".into(),
            side: Side::Buy,
            order_type: OrderType::Limit,
            original_quantity: dec!(1),
            remaining_quantity: dec!(1),
            price: Some(dec!(100)),
            status: OrderStatus::Open,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn recent_orders_returns_most_recent_first() {
        let history = RecentHistory::new();
        let first = order();
        let second = order();
        let second_id = second.order_id;
        history.record_order(&first);
        history.record_order(&second);

        let recent = history.recent_orders(Some("BTCUSD"), 10);
        assert_eq!(recent[0].order_id, second_id);
    }

    #[test]
    fn recent_orders_with_no_symbol_spans_every_market() {
        let history = RecentHistory::new();
        let mut btc = order();
        btc.symbol = "BTCUSD".into();
        let mut eth = order();
        eth.symbol = "ETHUSD".into();
        let eth_id = eth.order_id;
        history.record_order(&btc);
        history.record_order(&eth);

        let recent = history.recent_orders(None, 10);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].order_id, eth_id);
    }

    #[test]
    fn ring_caps_at_capacity() {
        let ring: Ring<u32> = Ring::new();
        for i in 0..(MAX_RETAINED + 5) {
            ring.push(i as u32);
        }
        assert_eq!(ring.items.lock().len(), MAX_RETAINED);
    }
}
