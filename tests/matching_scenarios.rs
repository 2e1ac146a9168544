//! End-to-end scenarios against `MatchingEngine`, exercising the full
//! validate -> match -> persist -> publish pipeline with the in-memory
//! persistence adapter.

use ordermatch::matching::{MatchingEngine, OrderStatus, OrderSubmission, OrderType, Side};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn limit(symbol: &str, side: Side, price: Decimal, qty: Decimal) -> OrderSubmission {
    OrderSubmission { symbol: symbol.into(), side, order_type: OrderType::Limit, quantity: qty, price: Some(price) }
}

fn market(symbol: &str, side: Side, qty: Decimal) -> OrderSubmission {
    OrderSubmission { symbol: symbol.into(), side, order_type: OrderType::Market, quantity: qty, price: None }
}

fn ioc(symbol: &str, side: Side, price: Decimal, qty: Decimal) -> OrderSubmission {
    OrderSubmission { symbol: symbol.into(), side, order_type: OrderType::Ioc, quantity: qty, price: Some(price) }
}

fn fok(symbol: &str, side: Side, price: Decimal, qty: Decimal) -> OrderSubmission {
    OrderSubmission { symbol: symbol.into(), side, order_type: OrderType::Fok, quantity: qty, price: Some(price) }
}

#[tokio::test]
async fn scenario_a_limit_resting_and_crossing() {
    let engine = MatchingEngine::new();

    let resting = engine.submit(limit("BTCUSD", Side::Buy, dec!(100), dec!(1.0))).await.unwrap();
    assert_eq!(resting.order.status, OrderStatus::Open);
    assert!(resting.trades.is_empty());
    let (bids, _) = engine.snapshot("BTCUSD", 10).await;
    assert_eq!(bids, vec![(dec!(100), dec!(1.0))]);

    let crossing = engine.submit(limit("BTCUSD", Side::Sell, dec!(99), dec!(0.4))).await.unwrap();
    assert_eq!(crossing.order.status, OrderStatus::Filled);
    assert_eq!(crossing.trades.len(), 1);
    assert_eq!(crossing.trades[0].price, dec!(100));
    assert_eq!(crossing.trades[0].quantity, dec!(0.4));
    assert_eq!(crossing.trades[0].maker_order_id, resting.order.order_id);

    let (bids, _) = engine.snapshot("BTCUSD", 10).await;
    assert_eq!(bids, vec![(dec!(100), dec!(0.6))]);

    let (best_bid, best_bid_qty, best_ask, best_ask_qty) = engine.bbo("BTCUSD").await;
    assert_eq!(best_bid, Some(dec!(100)));
    assert_eq!(best_bid_qty, Some(dec!(0.6)));
    assert_eq!(best_ask, None);
    assert_eq!(best_ask_qty, None);
}

#[tokio::test]
async fn scenario_b_price_time_priority() {
    let engine = MatchingEngine::new();

    let x = engine.submit(limit("ETHUSD", Side::Buy, dec!(50), dec!(1))).await.unwrap();
    let y = engine.submit(limit("ETHUSD", Side::Buy, dec!(50), dec!(1))).await.unwrap();

    let sell = engine.submit(limit("ETHUSD", Side::Sell, dec!(50), dec!(1))).await.unwrap();

    assert_eq!(sell.trades.len(), 1);
    assert_eq!(sell.trades[0].maker_order_id, x.order.order_id);

    assert!(!engine.has_resting_order("ETHUSD", x.order.order_id).await);
    assert!(engine.has_resting_order("ETHUSD", y.order.order_id).await);
}

#[tokio::test]
async fn scenario_c_multi_level_sweep() {
    let engine = MatchingEngine::new();

    engine.submit(limit("BTCUSD", Side::Sell, dec!(101), dec!(1))).await.unwrap();
    engine.submit(limit("BTCUSD", Side::Sell, dec!(102), dec!(1))).await.unwrap();

    let result = engine.submit(market("BTCUSD", Side::Buy, dec!(1.5))).await.unwrap();

    assert_eq!(result.trades.len(), 2);
    assert_eq!((result.trades[0].price, result.trades[0].quantity), (dec!(101), dec!(1)));
    assert_eq!((result.trades[1].price, result.trades[1].quantity), (dec!(102), dec!(0.5)));
    assert_eq!(result.order.status, OrderStatus::Filled);

    let (_, asks) = engine.snapshot("BTCUSD", 10).await;
    assert_eq!(asks, vec![(dec!(102), dec!(0.5))]);
}

#[tokio::test]
async fn scenario_d_ioc_partial() {
    let engine = MatchingEngine::new();

    engine.submit(limit("BTCUSD", Side::Sell, dec!(200), dec!(0.3))).await.unwrap();

    let result = engine.submit(ioc("BTCUSD", Side::Buy, dec!(200), dec!(1))).await.unwrap();

    assert_eq!(result.trades.len(), 1);
    assert_eq!(result.trades[0].quantity, dec!(0.3));
    assert_eq!(result.order.status, OrderStatus::PartiallyFilled);

    let (bids, _) = engine.snapshot("BTCUSD", 10).await;
    assert!(bids.is_empty());
}

#[tokio::test]
async fn scenario_e_fok_unfillable() {
    let engine = MatchingEngine::new();

    engine.submit(limit("BTCUSD", Side::Sell, dec!(300), dec!(0.5))).await.unwrap();

    let result = engine.submit(fok("BTCUSD", Side::Buy, dec!(300), dec!(1))).await.unwrap();

    assert!(result.trades.is_empty());
    assert_eq!(result.order.status, OrderStatus::Cancelled);

    let (_, asks) = engine.snapshot("BTCUSD", 10).await;
    assert_eq!(asks, vec![(dec!(300), dec!(0.5))]);
}

#[tokio::test]
async fn scenario_f_market_on_empty_book() {
    let engine = MatchingEngine::new();

    let result = engine.submit(market("BTCUSD", Side::Sell, dec!(1))).await.unwrap();

    assert!(result.trades.is_empty());
    assert_eq!(result.order.status, OrderStatus::Cancelled);
}

#[tokio::test]
async fn unknown_symbol_is_rejected_when_engine_is_restricted() {
    let engine = MatchingEngine::with_symbols(
        vec!["BTCUSD".to_string()],
        std::sync::Arc::new(ordermatch::matching::InMemoryPersistence::new()),
    );

    let result = engine.submit(limit("DOGEUSD", Side::Buy, dec!(1), dec!(1))).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn recent_trades_and_orders_are_retrievable_after_a_match() {
    let engine = MatchingEngine::new();

    engine.submit(limit("BTCUSD", Side::Sell, dec!(100), dec!(1))).await.unwrap();
    engine.submit(limit("BTCUSD", Side::Buy, dec!(100), dec!(1))).await.unwrap();

    assert_eq!(engine.recent_trades("BTCUSD", 10).len(), 1);
    assert_eq!(engine.recent_orders(Some("BTCUSD"), 10).len(), 2);
}

#[tokio::test]
async fn recent_orders_without_a_symbol_spans_every_market() {
    let engine = MatchingEngine::new();

    engine.submit(limit("BTCUSD", Side::Buy, dec!(100), dec!(1))).await.unwrap();
    engine.submit(limit("ETHUSD", Side::Buy, dec!(50), dec!(1))).await.unwrap();

    assert_eq!(engine.recent_orders(None, 10).len(), 2);
    assert_eq!(engine.recent_orders(Some("BTCUSD"), 10).len(), 1);
}

#[tokio::test]
async fn every_submit_publishes_a_book_and_bbo_event_even_without_a_trade() {
    let engine = MatchingEngine::new();
    let mut book_rx = engine.subscribe_book();
    let mut bbo_rx = engine.subscribe_bbo();

    // A non-marketable limit order produces zero trades but still moves
    // the book and must still publish a snapshot and a BBO update.
    let result = engine.submit(limit("BTCUSD", Side::Buy, dec!(90), dec!(1))).await.unwrap();
    assert!(result.trades.is_empty());

    assert!(book_rx.try_recv().is_ok());
    assert!(bbo_rx.try_recv().is_ok());
}
