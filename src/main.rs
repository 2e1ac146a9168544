use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ordermatch::config::AppConfig;
use ordermatch::db::Database;
use ordermatch::matching::{MatchingEngine, PersistenceAdapter, PostgresPersistence};
use ordermatch::{api, metrics, websocket, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "matching_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let config = AppConfig::load()?;

    tracing::info!("Starting matching engine v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.environment);

    let metrics_handle = metrics::init_metrics();

    let db = Database::connect(&config.database_url).await?;
    tracing::info!("Database connected");

    let trading_pairs = config.get_trading_pairs();
    let persistence: Arc<dyn PersistenceAdapter> = Arc::new(PostgresPersistence::new(db.pool.clone()));

    let matching_engine = if trading_pairs.is_empty() {
        Arc::new(MatchingEngine::with_persistence(persistence))
    } else {
        Arc::new(MatchingEngine::with_symbols(trading_pairs.clone(), persistence))
    };
    tracing::info!("Matching engine initialized for {:?}", trading_pairs);

    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        matching_engine,
        metrics_handle,
    });

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .nest("/api/v1", api::routes::create_router(state.clone()))
        .nest("/ws", websocket::routes::create_router(state.clone()))
        .layer(axum::middleware::from_fn(api::middleware::metrics_middleware))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}

async fn metrics_handler(axum::extract::State(state): axum::extract::State<Arc<AppState>>) -> String {
    state.metrics_handle.render()
}
