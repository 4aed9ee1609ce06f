use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

/// Main error type for the trading simulator
#[derive(Error, Debug)]
pub enum BullbearError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // Network errors
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Market data errors
    #[error("Price unavailable for {ticker} on {date}")]
    PriceUnavailable { ticker: String, date: NaiveDate },

    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    // Reasoner errors
    #[error("Reasoner error: {0}")]
    Reasoner(String),

    // Simulation job errors
    #[error("A simulation job is already running")]
    JobAlreadyRunning,

    #[error("Job not found: {0}")]
    JobNotFound(Uuid),

    #[error("Cannot reset while a job is running")]
    ResetWhileRunning,

    #[error("Trader not found: {0}")]
    TraderNotFound(String),

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

/// Result type alias for BullbearError
pub type Result<T> = std::result::Result<T, BullbearError>;
