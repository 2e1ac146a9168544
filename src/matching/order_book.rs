//! Per-symbol order book: a pair of price-indexed FIFO queues plus an
//! order-id index for O(log n) lookup and removal.

use dashmap::DashMap;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use super::order::{Order, OrderId, Side};
use super::price::Tick;
use super::price_level::PriceLevel;

/// `(symbol, side, price)` is implicit in which map an order lives in; the
/// index only needs side + tick to find the level, matching the teacher's
/// `DashMap<Uuid, (Side, PriceLevel)>` order index.
struct Location {
    side: Side,
    tick: Tick,
}

/// One symbol's order book.
///
/// Bids and asks are both plain ascending `BTreeMap<Tick, PriceLevel>`;
/// "best" is `next_back()` on bids (highest price) and `next()` on asks
/// (lowest price). No negated-key trick.
pub struct OrderBook {
    pub symbol: String,
    bids: BTreeMap<Tick, PriceLevel>,
    asks: BTreeMap<Tick, PriceLevel>,
    index: DashMap<OrderId, Location>,
}

impl OrderBook {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            index: DashMap::new(),
        }
    }

    fn side_map(&self, side: Side) -> &BTreeMap<Tick, PriceLevel> {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    fn side_map_mut(&mut self, side: Side) -> &mut BTreeMap<Tick, PriceLevel> {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    /// Best `(price, aggregate_quantity)` for a side, if any orders rest there.
    pub fn best(&self, side: Side) -> Option<(Decimal, Decimal)> {
        let map = self.side_map(side);
        let (tick, level) = match side {
            Side::Buy => map.iter().next_back()?,
            Side::Sell => map.iter().next()?,
        };
        Some((tick.to_decimal(), level.aggregate_quantity()))
    }

    /// Best ask tick and a read-only view of its queue, for matching.
    pub(super) fn best_ask_level_mut(&mut self) -> Option<(Tick, &mut PriceLevel)> {
        let tick = *self.asks.keys().next()?;
        self.asks.get_mut(&tick).map(|level| (tick, level))
    }

    pub(super) fn best_bid_level_mut(&mut self) -> Option<(Tick, &mut PriceLevel)> {
        let tick = *self.bids.keys().next_back()?;
        self.bids.get_mut(&tick).map(|level| (tick, level))
    }

    pub(super) fn drop_level_if_empty(&mut self, side: Side, tick: Tick) {
        let map = self.side_map_mut(side);
        if matches!(map.get(&tick), Some(level) if level.is_empty()) {
            map.remove(&tick);
        }
    }

    /// Opposite-side levels in best-to-worst order, for the FOK pre-check scan.
    pub(super) fn levels_best_to_worst(&self, side: Side) -> Vec<(Tick, Decimal)> {
        let map = self.side_map(side);
        match side {
            Side::Buy => map.iter().map(|(t, l)| (*t, l.aggregate_quantity())).collect(),
            Side::Sell => map.iter().rev().map(|(t, l)| (*t, l.aggregate_quantity())).collect(),
        }
    }

    /// Insert a resting order. Creates the level if absent; preserves FIFO.
    pub fn insert(&mut self, order: Order) {
        let side = order.side;
        let tick = Tick::from_decimal(order.price.expect("resting order must have a price"));
        let order_id = order.order_id;

        self.side_map_mut(side).entry(tick).or_default().push(order);
        self.index.insert(order_id, Location { side, tick });
    }

    /// Remove a resting order by id, dropping its level if it empties.
    pub fn remove(&mut self, order_id: OrderId) -> Option<Order> {
        let Location { side, tick } = self.index.remove(&order_id)?.1;
        let map = self.side_map_mut(side);
        let order = map.get_mut(&tick)?.remove(order_id);
        self.drop_level_if_empty(side, tick);
        order
    }

    pub(super) fn untrack(&self, order_id: OrderId) {
        self.index.remove(&order_id);
    }

    pub fn has_order(&self, order_id: OrderId) -> bool {
        self.index.contains_key(&order_id)
    }

    /// Up to `depth` top levels per side as `(price, aggregate_quantity)`
    /// pairs: bids descending, asks ascending.
    pub fn snapshot(&self, depth: usize) -> (Vec<(Decimal, Decimal)>, Vec<(Decimal, Decimal)>) {
        let bids = self
            .bids
            .iter()
            .rev()
            .take(depth)
            .map(|(tick, level)| (tick.to_decimal(), level.aggregate_quantity()))
            .collect();
        let asks = self
            .asks
            .iter()
            .take(depth)
            .map(|(tick, level)| (tick.to_decimal(), level.aggregate_quantity()))
            .collect();
        (bids, asks)
    }

    /// `(best_bid_price, best_bid_qty, best_ask_price, best_ask_qty)`.
    pub fn bbo(&self) -> (Option<Decimal>, Option<Decimal>, Option<Decimal>, Option<Decimal>) {
        let (bid_price, bid_qty) = self.best(Side::Buy).map_or((None, None), |(p, q)| (Some(p), Some(q)));
        let (ask_price, ask_qty) = self.best(Side::Sell).map_or((None, None), |(p, q)| (Some(p), Some(q)));
        (bid_price, bid_qty, ask_price, ask_qty)
    }

    /// `best_bid < best_ask` whenever both sides are non-empty.
    #[cfg(test)]
    pub fn is_not_crossed(&self) -> bool {
        match (self.best(Side::Buy), self.best(Side::Sell)) {
            (Some((bid, _)), Some((ask, _))) => bid < ask,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::order::{OrderStatus, OrderType};
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn resting(side: Side, price: Decimal, qty: Decimal) -> Order {
        Order {
            order_id: Uuid::new_v4(),
            symbol: "BTCUSD".into(),
            side,
            order_type: OrderType::Limit,
            original_quantity: qty,
            remaining_quantity: qty,
            price: Some(price),
            status: OrderStatus::Open,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn best_bid_and_ask() {
        let mut book = OrderBook::new("BTCUSD");
        book.insert(resting(Side::Buy, dec!(100), dec!(1)));
        book.insert(resting(Side::Buy, dec!(101), dec!(1)));
        book.insert(resting(Side::Sell, dec!(102), dec!(1)));
        book.insert(resting(Side::Sell, dec!(103), dec!(1)));

        assert_eq!(book.best(Side::Buy).unwrap().0, dec!(101));
        assert_eq!(book.best(Side::Sell).unwrap().0, dec!(102));
        assert!(book.is_not_crossed());
    }

    #[test]
    fn remove_drops_empty_level() {
        let mut book = OrderBook::new("BTCUSD");
        let order = resting(Side::Buy, dec!(100), dec!(1));
        let id = order.order_id;
        book.insert(order);
        assert!(book.has_order(id));

        book.remove(id);
        assert!(!book.has_order(id));
        assert!(book.best(Side::Buy).is_none());
    }

    #[test]
    fn snapshot_orders_by_price() {
        let mut book = OrderBook::new("BTCUSD");
        book.insert(resting(Side::Buy, dec!(100), dec!(1)));
        book.insert(resting(Side::Buy, dec!(100), dec!(2)));
        book.insert(resting(Side::Sell, dec!(102), dec!(1.5)));

        let (bids, asks) = book.snapshot(10);
        assert_eq!(bids, vec![(dec!(100), dec!(3))]);
        assert_eq!(asks, vec![(dec!(102), dec!(1.5))]);
    }
}
