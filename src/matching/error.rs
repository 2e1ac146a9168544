//! Errors the matching core can raise back up to the transport layer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("invalid order: {0}")]
    InvalidOrder(String),
}
