use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub providers: ProvidersConfig,
    pub cache: CacheConfig,
    pub forecast: ForecastConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub dry_run: DryRunConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProvidersConfig {
    /// Schedule service base URL (also hosts the execution endpoint)
    pub schedule_url: String,
    /// Polymarket Gamma API base URL
    pub gamma_url: String,
    /// Max vs-matches / futures events returned per category
    #[serde(default = "default_match_limit")]
    pub match_limit: usize,
    /// Events fetched per Gamma page, ordered by volume
    #[serde(default = "default_event_fetch_limit")]
    pub event_fetch_limit: usize,
}

fn default_match_limit() -> usize {
    20
}

fn default_event_fetch_limit() -> usize {
    100
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// TTL for the schedule catalog (seconds)
    #[serde(default = "default_schedule_ttl")]
    pub schedule_ttl_secs: i64,
    /// TTL for single-game / category market catalogs (seconds)
    #[serde(default = "default_markets_ttl")]
    pub markets_ttl_secs: i64,
    /// TTL for season futures markets (seconds)
    #[serde(default = "default_season_ttl")]
    pub season_ttl_secs: i64,
}

fn default_schedule_ttl() -> i64 {
    300
}

fn default_markets_ttl() -> i64 {
    300
}

fn default_season_ttl() -> i64 {
    600
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            schedule_ttl_secs: default_schedule_ttl(),
            markets_ttl_secs: default_markets_ttl(),
            season_ttl_secs: default_season_ttl(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastConfig {
    /// OpenAI-compatible chat-completions base URL
    pub base_url: String,
    /// API key; usually supplied via TIPOFF_FORECAST__API_KEY
    #[serde(default)]
    pub api_key: String,
    pub model: String,
    #[serde(default = "default_forecast_timeout")]
    pub timeout_secs: u64,
}

fn default_forecast_timeout() -> u64 {
    60
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct DryRunConfig {
    /// Use the in-memory store and skip real order submission
    #[serde(default)]
    pub enabled: bool,
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            .set_default("dry_run.enabled", false)?
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(
                File::from(config_dir.join(
                    std::env::var("TIPOFF_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (TIPOFF_PROVIDERS__GAMMA_URL, etc.)
            .add_source(
                Environment::with_prefix("TIPOFF")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.providers.schedule_url.is_empty() {
            errors.push("providers.schedule_url must be set".to_string());
        }
        if self.providers.gamma_url.is_empty() {
            errors.push("providers.gamma_url must be set".to_string());
        }
        if self.providers.match_limit == 0 {
            errors.push("providers.match_limit must be positive".to_string());
        }
        if self.cache.schedule_ttl_secs <= 0
            || self.cache.markets_ttl_secs <= 0
            || self.cache.season_ttl_secs <= 0
        {
            errors.push("cache TTLs must be positive".to_string());
        }
        if self.forecast.model.is_empty() {
            errors.push("forecast.model must be set".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Minimum forecaster confidence before any side is recommended
pub const MIN_CONFIDENCE: Decimal = rust_decimal_macros::dec!(0.6);

/// Minimum edge before any side is recommended or bet
pub const MIN_EDGE: Decimal = rust_decimal_macros::dec!(0.05);
