//! A FIFO queue of resting orders at one price.

use rust_decimal::Decimal;
use std::collections::VecDeque;

use super::order::{Order, OrderId};

/// Orders at a single price, in strict submission order. Order of
/// insertion equals order of match eligibility.
#[derive(Debug, Default)]
pub struct PriceLevel {
    orders: VecDeque<Order>,
}

impl PriceLevel {
    pub fn new() -> Self {
        Self { orders: VecDeque::new() }
    }

    pub fn push(&mut self, order: Order) {
        self.orders.push_back(order);
    }

    pub fn head(&self) -> Option<&Order> {
        self.orders.front()
    }

    pub fn head_mut(&mut self) -> Option<&mut Order> {
        self.orders.front_mut()
    }

    /// Drop the head once its remaining quantity has reached zero.
    pub fn pop_filled_head(&mut self) -> Option<Order> {
        if matches!(self.orders.front(), Some(o) if o.remaining_quantity <= Decimal::ZERO) {
            self.orders.pop_front()
        } else {
            None
        }
    }

    pub fn remove(&mut self, order_id: OrderId) -> Option<Order> {
        let pos = self.orders.iter().position(|o| o.order_id == order_id)?;
        self.orders.remove(pos)
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn aggregate_quantity(&self) -> Decimal {
        self.orders.iter().map(|o| o.remaining_quantity).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::order::{OrderStatus, OrderType, Side};
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn order(qty: Decimal) -> Order {
        Order {
            order_id: Uuid::new_v4(),
            symbol: "BTCUSD".into(),
            side: Side::Buy,
            order_type: OrderType::Limit,
            original_quantity: qty,
            remaining_quantity: qty,
            price: Some(dec!(100)),
            status: OrderStatus::Open,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn fifo_order_preserved() {
        let mut level = PriceLevel::new();
        let first = order(dec!(1));
        let first_id = first.order_id;
        level.push(first);
        level.push(order(dec!(2)));

        assert_eq!(level.head().unwrap().order_id, first_id);
        assert_eq!(level.aggregate_quantity(), dec!(3));
    }

    #[test]
    fn pop_filled_head_only_when_empty() {
        let mut level = PriceLevel::new();
        let mut o = order(dec!(1));
        o.remaining_quantity = Decimal::ZERO;
        level.push(o);
        level.push(order(dec!(1)));

        let popped = level.pop_filled_head();
        assert!(popped.is_some());
        assert_eq!(level.len(), 1);
        assert!(level.pop_filled_head().is_none());
    }
}
