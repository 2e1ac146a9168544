//! Application configuration, layered from defaults, an optional config
//! file, and environment variables (highest precedence), the way the
//! `config` crate is meant to be used.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_environment")]
    pub environment: String,

    #[serde(default = "default_port")]
    pub port: u16,

    pub database_url: String,

    /// Comma-separated in the environment, e.g. `BTCUSD,ETHUSD`.
    #[serde(default, deserialize_with = "deserialize_trading_pairs")]
    pub trading_pairs: Vec<String>,

    #[serde(default = "default_snapshot_depth")]
    pub snapshot_depth: usize,

    #[serde(default = "default_recent_history_limit")]
    pub recent_history_limit: usize,
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_snapshot_depth() -> usize {
    20
}

fn default_recent_history_limit() -> usize {
    100
}

fn deserialize_trading_pairs<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(raw.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
}

impl AppConfig {
    /// Load from `config/default.toml` (if present) overlaid with environment
    /// variables prefixed `APP__`, e.g. `APP__PORT=9000`.
    pub fn load() -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        Ok(config)
    }

    /// Trading pairs to pre-register with the matching engine, or an empty
    /// allow-list meaning "accept any symbol".
    pub fn get_trading_pairs(&self) -> Vec<String> {
        self.trading_pairs.clone()
    }
}
