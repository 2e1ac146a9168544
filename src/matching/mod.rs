//! Limit-order matching engine: price-time priority order books, market /
//! limit / IOC / FOK admission semantics, and the event/persistence fan-out
//! around a match.

mod engine;
mod error;
mod events;
mod history;
mod matching_core;
mod order;
mod order_book;
mod persistence;
mod price;
mod price_level;
mod trade;

pub use engine::{MatchingEngine, OrderSubmission, SubmitResult};
pub use error::EngineError;
pub use events::{BboEvent, BookUpdateEvent, EventPublisher, TradeEvent};
pub use order::{Order, OrderId, OrderStatus, OrderType, Side};
pub use order_book::OrderBook;
pub use persistence::{InMemoryPersistence, PersistenceAdapter, PostgresPersistence};
pub use price::Tick;
pub use trade::Trade;
