//! WebSocket connection handler.
//!
//! A connection starts with no subscriptions. `subscribe`/`unsubscribe`
//! messages add or remove channel names; book/trade/bbo events from the
//! matching engine are forwarded only to connections subscribed to the
//! matching channel and symbol.

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::websocket::channels::Channel;
use crate::AppState;

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    Subscribe { channel: String },
    Unsubscribe { channel: String },
    Ping,
}

#[derive(Debug, Serialize, Clone)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage {
    Subscribed { channel: String },
    Unsubscribed { channel: String },
    Trade {
        symbol: String,
        trade_id: uuid::Uuid,
        price: Decimal,
        quantity: Decimal,
        aggressor_side: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
    Book {
        symbol: String,
        bids: Vec<(Decimal, Decimal)>,
        asks: Vec<(Decimal, Decimal)>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
    Bbo {
        symbol: String,
        best_bid: Option<Decimal>,
        best_bid_quantity: Option<Decimal>,
        best_ask: Option<Decimal>,
        best_ask_quantity: Option<Decimal>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
    Error { code: String, message: String },
    Pong,
}

pub async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    let mut subscriptions: HashSet<String> = HashSet::new();

    let mut trade_receiver = state.matching_engine.subscribe_trades();
    let mut book_receiver = state.matching_engine.subscribe_book();
    let mut bbo_receiver = state.matching_engine.subscribe_bbo();

    crate::metrics::set_ws_connections(1);

    loop {
        tokio::select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Err(response) = handle_client_message(&text, &mut subscriptions, &mut sender).await {
                            send(&mut sender, &response).await;
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sender.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::warn!("websocket disconnected: {}", e);
                        break;
                    }
                    _ => {}
                }
            }

            trade = trade_receiver.recv() => {
                match trade {
                    Ok(event) => {
                        let channel = format!("trade.{}", event.symbol);
                        if subscriptions.contains(&channel) {
                            send(&mut sender, &ServerMessage::Trade {
                                symbol: event.symbol,
                                trade_id: event.trade_id,
                                price: event.price,
                                quantity: event.quantity,
                                aggressor_side: event.aggressor_side.to_string(),
                                timestamp: event.timestamp,
                            }).await;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!("trade receiver lagged by {} messages", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }

            book = book_receiver.recv() => {
                match book {
                    Ok(event) => {
                        let channel = format!("book.{}", event.symbol);
                        if subscriptions.contains(&channel) {
                            send(&mut sender, &ServerMessage::Book {
                                symbol: event.symbol,
                                bids: event.bids,
                                asks: event.asks,
                                timestamp: event.timestamp,
                            }).await;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!("book receiver lagged by {} messages", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }

            bbo = bbo_receiver.recv() => {
                match bbo {
                    Ok(event) => {
                        let channel = format!("bbo.{}", event.symbol);
                        if subscriptions.contains(&channel) {
                            send(&mut sender, &ServerMessage::Bbo {
                                symbol: event.symbol,
                                best_bid: event.best_bid_price,
                                best_bid_quantity: event.best_bid_quantity,
                                best_ask: event.best_ask_price,
                                best_ask_quantity: event.best_ask_quantity,
                                timestamp: event.timestamp,
                            }).await;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!("bbo receiver lagged by {} messages", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    crate::metrics::set_ws_connections(-1);
    tracing::info!("websocket connection closed");
}

async fn send(sender: &mut futures::stream::SplitSink<WebSocket, Message>, msg: &ServerMessage) {
    if let Ok(text) = serde_json::to_string(msg) {
        let _ = sender.send(Message::Text(text)).await;
        crate::metrics::record_ws_message_sent();
    }
}

async fn handle_client_message(
    text: &str,
    subscriptions: &mut HashSet<String>,
    sender: &mut futures::stream::SplitSink<WebSocket, Message>,
) -> Result<(), ServerMessage> {
    let client_msg: ClientMessage = serde_json::from_str(text).map_err(|e| ServerMessage::Error {
        code: "INVALID_MESSAGE".to_string(),
        message: format!("failed to parse message: {}", e),
    })?;

    match client_msg {
        ClientMessage::Subscribe { channel } => {
            if Channel::parse(&channel).is_none() {
                return Err(ServerMessage::Error {
                    code: "UNKNOWN_CHANNEL".to_string(),
                    message: format!("unknown channel: {}", channel),
                });
            }
            subscriptions.insert(channel.clone());
            send(sender, &ServerMessage::Subscribed { channel }).await;
        }
        ClientMessage::Unsubscribe { channel } => {
            subscriptions.remove(&channel);
            send(sender, &ServerMessage::Unsubscribed { channel }).await;
        }
        ClientMessage::Ping => {
            send(sender, &ServerMessage::Pong).await;
        }
    }

    Ok(())
}
