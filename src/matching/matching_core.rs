//! The price-time priority matching algorithm.
//!
//! `match_order` takes an incoming order and an `OrderBook` and produces
//! trades by walking the opposite side best-to-worst, filling FIFO within
//! each price level. It never looks at any other symbol's book.

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::order::{Order, OrderStatus, OrderType, Side};
use super::order_book::OrderBook;
use super::trade::Trade;

/// Outcome of submitting one order to a book.
pub struct MatchOutcome {
    pub order: Order,
    pub trades: Vec<Trade>,
}

/// A resting price is marketable against an incoming order if the incoming
/// side's limit crosses it (market orders are marketable against anything).
fn is_marketable(order_type: OrderType, side: Side, limit_price: Option<Decimal>, resting_price: Decimal) -> bool {
    match (order_type, limit_price) {
        (OrderType::Market, _) => true,
        (_, Some(limit)) => match side {
            Side::Buy => limit >= resting_price,
            Side::Sell => limit <= resting_price,
        },
        (_, None) => unreachable!("non-market orders always carry a limit price"),
    }
}

/// Would a FOK order, given the book's current liquidity, fill completely?
/// Read-only: never mutates the book. Scans best-to-worst on the opposite
/// side, stopping as soon as either the requested quantity is covered or a
/// non-marketable level is reached.
fn fok_can_fully_fill(book: &OrderBook, side: Side, limit_price: Option<Decimal>, quantity: Decimal) -> bool {
    let opposite = side.opposite();
    let mut remaining = quantity;
    for (tick, level_qty) in book.levels_best_to_worst(opposite) {
        if remaining <= Decimal::ZERO {
            break;
        }
        if !is_marketable(OrderType::Limit, side, limit_price, tick.to_decimal()) {
            break;
        }
        remaining -= level_qty;
    }
    remaining <= Decimal::ZERO
}

/// Walk the opposite side of `book`, filling `order` against resting orders
/// until either `order` is exhausted or no further level is marketable.
/// Mutates `book` in place and returns the trades produced, in execution
/// order.
fn fill_against_book(book: &mut OrderBook, order: &mut Order) -> Vec<Trade> {
    let mut trades = Vec::new();

    loop {
        if order.remaining_quantity <= Decimal::ZERO {
            break;
        }

        let opposite_best = match order.side {
            Side::Buy => book.best_ask_level_mut(),
            Side::Sell => book.best_bid_level_mut(),
        };
        let Some((tick, level)) = opposite_best else { break };

        if !is_marketable(order.order_type, order.side, order.price, tick.to_decimal()) {
            break;
        }

        let Some(maker) = level.head_mut() else { break };

        let fill_qty = order.remaining_quantity.min(maker.remaining_quantity);
        let trade_price = maker.price.expect("resting order carries a price");

        maker.apply_fill(fill_qty);
        order.apply_fill(fill_qty);

        let maker_id = maker.order_id;
        trades.push(Trade {
            trade_id: Uuid::new_v4(),
            symbol: order.symbol.clone(),
            price: trade_price,
            quantity: fill_qty,
            aggressor_side: order.side,
            maker_order_id: maker_id,
            taker_order_id: order.order_id,
            timestamp: Utc::now(),
        });

        if let Some(filled) = level.pop_filled_head() {
            book.untrack(filled.order_id);
        }

        let opposite_side = order.side.opposite();
        book.drop_level_if_empty(opposite_side, tick);
    }

    trades
}

/// Submit `order` against `book`, matching and (for limit orders with a
/// residual) resting it. `order.status`/`remaining_quantity` reflect the
/// final outcome; FOK orders that cannot fully fill are rejected without
/// mutating `book` and return zero trades.
pub fn match_order(book: &mut OrderBook, mut order: Order) -> MatchOutcome {
    if order.order_type == OrderType::Fok
        && !fok_can_fully_fill(book, order.side, order.price, order.remaining_quantity)
    {
        order.status = OrderStatus::Cancelled;
        order.remaining_quantity = Decimal::ZERO;
        return MatchOutcome { order, trades: Vec::new() };
    }

    let trades = fill_against_book(book, &mut order);

    if order.order_type.may_rest() && order.is_resting() {
        book.insert(order.clone());
    } else if order.remaining_quantity > Decimal::ZERO {
        // market/ioc/fok residuals never rest: a partial fill stays
        // partially_filled, an untouched order is cancelled.
        order.status = if order.filled_quantity() > Decimal::ZERO {
            OrderStatus::PartiallyFilled
        } else {
            OrderStatus::Cancelled
        };
        order.remaining_quantity = Decimal::ZERO;
    }

    MatchOutcome { order, trades }
}
