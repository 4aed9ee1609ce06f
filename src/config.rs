use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub trading: TradingConfig,
    #[serde(default)]
    pub reasoner: ReasonerConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            trading: TradingConfig::default(),
            reasoner: ReasonerConfig::default(),
            data: DataConfig::default(),
            api: ApiConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    /// Ticker to simulate when none is given on the request
    #[serde(default = "default_ticker")]
    pub default_ticker: String,
    /// Debate rounds per trading day
    #[serde(default = "default_rounds")]
    pub debate_rounds: u32,
    /// How many prior arguments each debate turn sees
    #[serde(default = "default_context_window")]
    pub context_window: usize,
    /// Price history lookback for the technical analyst (days)
    #[serde(default = "default_technical_lookback")]
    pub technical_lookback_days: i64,
    /// Social sentiment lookback (days)
    #[serde(default = "default_sentiment_lookback")]
    pub sentiment_lookback_days: i64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            default_ticker: default_ticker(),
            debate_rounds: default_rounds(),
            context_window: default_context_window(),
            technical_lookback_days: default_technical_lookback(),
            sentiment_lookback_days: default_sentiment_lookback(),
        }
    }
}

fn default_ticker() -> String {
    "AAPL".to_string()
}

fn default_rounds() -> u32 {
    2
}

fn default_context_window() -> usize {
    2
}

fn default_technical_lookback() -> i64 {
    30
}

fn default_sentiment_lookback() -> i64 {
    7
}

#[derive(Debug, Clone, Deserialize)]
pub struct TradingConfig {
    /// Starting cash per trader
    #[serde(default = "default_initial_cash")]
    pub initial_cash: Decimal,
    /// Advisory cap per position, surfaced to the reasoner prompt
    #[serde(default = "default_max_position_pct")]
    pub max_position_pct: f64,
    /// Trader roster: one independent portfolio per entry
    #[serde(default = "default_traders")]
    pub traders: Vec<TraderSpec>,
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            initial_cash: default_initial_cash(),
            max_position_pct: default_max_position_pct(),
            traders: default_traders(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TraderSpec {
    pub name: String,
    pub model: String,
}

fn default_initial_cash() -> Decimal {
    Decimal::from(10_000)
}

fn default_max_position_pct() -> f64 {
    0.3
}

fn default_traders() -> Vec<TraderSpec> {
    vec![
        TraderSpec {
            name: "Claude Trader".to_string(),
            model: "claude".to_string(),
        },
        TraderSpec {
            name: "GPT-4 Trader".to_string(),
            model: "gpt".to_string(),
        },
        TraderSpec {
            name: "Gemini Trader".to_string(),
            model: "gemini".to_string(),
        },
    ]
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReasonerConfig {
    /// Which reasoner backend to use: "scripted" or "claude-cli"
    #[serde(default = "default_backend")]
    pub backend: String,
    /// Path to the claude CLI executable
    #[serde(default = "default_cli_path")]
    pub cli_path: String,
    /// Timeout for a single reasoner call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Optional model override passed to the CLI
    #[serde(default)]
    pub model: Option<String>,
}

impl Default for ReasonerConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            cli_path: default_cli_path(),
            timeout_secs: default_timeout_secs(),
            model: None,
        }
    }
}

fn default_backend() -> String {
    "scripted".to_string()
}

fn default_cli_path() -> String {
    "claude".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    /// Price source: "synthetic" or "yahoo"
    #[serde(default = "default_price_source")]
    pub price_source: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            price_source: default_price_source(),
        }
    }
}

fn default_price_source() -> String {
    "synthetic".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
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
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("BULLBEAR_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (BULLBEAR_API__PORT, etc.)
            .add_source(
                Environment::with_prefix("BULLBEAR")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.trading.initial_cash <= Decimal::ZERO {
            errors.push("initial_cash must be positive".to_string());
        }

        if self.trading.max_position_pct <= 0.0 || self.trading.max_position_pct > 1.0 {
            errors.push("max_position_pct must be in (0, 1]".to_string());
        }

        if self.trading.traders.is_empty() {
            errors.push("at least one trader must be configured".to_string());
        }

        if self.simulation.debate_rounds == 0 {
            errors.push("debate_rounds must be at least 1".to_string());
        }

        if self.simulation.context_window == 0 {
            errors.push("context_window must be at least 1".to_string());
        }

        match self.reasoner.backend.as_str() {
            "scripted" | "claude-cli" => {}
            other => errors.push(format!("unknown reasoner backend: {other}")),
        }

        match self.data.price_source.as_str() {
            "synthetic" | "yahoo" => {}
            other => errors.push(format!("unknown price source: {other}")),
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.simulation.debate_rounds, 2);
        assert_eq!(config.trading.traders.len(), 3);
    }

    #[test]
    fn test_validate_rejects_zero_rounds() {
        let mut config = AppConfig::default();
        config.simulation.debate_rounds = 0;
        let errors = config.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.contains("debate_rounds")));
    }
}
