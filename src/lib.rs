//! Limit-order matching engine service: price-time priority order books,
//! market/limit/IOC/FOK admission, and the HTTP/WebSocket surface around it.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;

pub mod api;
pub mod config;
pub mod db;
pub mod matching;
pub mod metrics;
pub mod models;
pub mod utils;
pub mod websocket;

use crate::config::AppConfig;
use crate::db::Database;
use crate::matching::MatchingEngine;

pub struct AppState {
    pub config: AppConfig,
    pub db: Database,
    pub matching_engine: Arc<MatchingEngine>,
    pub metrics_handle: PrometheusHandle,
}
