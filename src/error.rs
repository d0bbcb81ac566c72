use thiserror::Error;

/// Main error type for the betting pipeline
#[derive(Error, Debug)]
pub enum TipoffError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    // Network errors
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Market data errors
    #[error("Market data unavailable: {0}")]
    MarketDataUnavailable(String),

    #[error("Invalid market data: {0}")]
    InvalidMarketData(String),

    // Forecast errors
    #[error("Forecast failed: {0}")]
    Forecast(String),

    // Order execution errors
    #[error("Order submission failed: {0}")]
    OrderSubmission(String),

    // Bet lifecycle errors
    #[error("Invalid state transition: from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Bet not found: {0}")]
    BetNotFound(String),

    // Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for TipoffError
pub type Result<T> = std::result::Result<T, TipoffError>;
