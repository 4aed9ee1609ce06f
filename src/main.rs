use std::sync::Arc;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tokio::sync::RwLock;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use bullbear::analyst::{SentimentAnalyst, TechnicalAnalyst};
use bullbear::api::{start_api_server, AppState};
use bullbear::config::{AppConfig, LoggingConfig};
use bullbear::error::{BullbearError, Result};
use bullbear::sim::{JobRegistry, SimulationRunner};
use bullbear::{
    ClaudeCliReasoner, CliReasonerConfig, DebateEngine, PriceSource, Reasoner, ScriptedReasoner,
    SentimentSource, SyntheticPriceSource, SyntheticSentimentSource, YahooPriceSource,
};

#[derive(Parser)]
#[command(name = "bullbear", about = "Multi-agent LLM trading desk simulator")]
struct Cli {
    /// Configuration directory
    #[arg(long, default_value = "config", env = "BULLBEAR_CONFIG_DIR")]
    config_dir: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Override the configured bind port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Run one simulation to completion and print the summary
    Simulate {
        #[arg(long)]
        ticker: Option<String>,
        #[arg(long)]
        start_date: NaiveDate,
        #[arg(long)]
        end_date: NaiveDate,
        /// Print the full day-by-day result instead of the summary
        #[arg(long)]
        full: bool,
    },
    /// Run a single bull/bear debate and print the transcript
    Debate {
        #[arg(long)]
        ticker: Option<String>,
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        rounds: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_from(&cli.config_dir)?;
    if let Err(errors) = config.validate() {
        return Err(BullbearError::Validation(errors.join("; ")));
    }

    match cli.command {
        Commands::Serve { port } => {
            init_logging(&config.logging);
            run_serve(config, port).await
        }
        Commands::Simulate {
            ticker,
            start_date,
            end_date,
            full,
        } => {
            init_logging(&config.logging);
            run_simulate(config, ticker, start_date, end_date, full).await
        }
        Commands::Debate {
            ticker,
            date,
            rounds,
        } => {
            init_logging_simple();
            run_debate(config, ticker, date, rounds).await
        }
    }
}

async fn run_serve(config: AppConfig, port: Option<u16>) -> Result<()> {
    let runner = build_runner(&config).await?;
    let host = config.api.host.clone();
    let port = port.unwrap_or(config.api.port);
    let state = AppState::new(runner, config);
    start_api_server(state, &host, port).await
}

async fn run_simulate(
    config: AppConfig,
    ticker: Option<String>,
    start_date: NaiveDate,
    end_date: NaiveDate,
    full: bool,
) -> Result<()> {
    let ticker = ticker.unwrap_or_else(|| config.simulation.default_ticker.clone());
    let runner = build_runner(&config).await?;

    info!(ticker, %start_date, %end_date, "running simulation");
    let result = runner.run_blocking(ticker, start_date, end_date, None).await?;

    if full {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&result.traders)?);
    }
    Ok(())
}

async fn run_debate(
    config: AppConfig,
    ticker: Option<String>,
    date: NaiveDate,
    rounds: Option<u32>,
) -> Result<()> {
    let ticker = ticker.unwrap_or_else(|| config.simulation.default_ticker.clone());
    let rounds = rounds.unwrap_or(config.simulation.debate_rounds);

    let reasoner = build_reasoner(&config).await?;
    let prices = build_price_source(&config);
    let sentiment: Arc<dyn SentimentSource> = Arc::new(SyntheticSentimentSource::new());

    let technical = TechnicalAnalyst::new(
        Arc::clone(&prices),
        config.simulation.technical_lookback_days,
    )
    .analyze(&ticker, date)
    .await?;
    let sentiment = SentimentAnalyst::new(sentiment, config.simulation.sentiment_lookback_days)
        .analyze(&ticker, date)
        .await?;

    let engine = DebateEngine::new(reasoner, config.simulation.context_window);
    let transcript = engine
        .conduct(&ticker, date, &technical, &sentiment, rounds)
        .await?;

    println!("{}", serde_json::to_string_pretty(&transcript)?);
    Ok(())
}

async fn build_runner(config: &AppConfig) -> Result<SimulationRunner> {
    let reasoner = build_reasoner(config).await?;
    let prices = build_price_source(config);
    let sentiment: Arc<dyn SentimentSource> = Arc::new(SyntheticSentimentSource::new());
    let registry = Arc::new(RwLock::new(JobRegistry::new()));
    Ok(SimulationRunner::new(
        reasoner,
        prices,
        sentiment,
        registry,
        config.clone(),
    ))
}

async fn build_reasoner(config: &AppConfig) -> Result<Arc<dyn Reasoner>> {
    match config.reasoner.backend.as_str() {
        "claude-cli" => {
            let reasoner = ClaudeCliReasoner::with_config(CliReasonerConfig {
                cli_path: config.reasoner.cli_path.clone(),
                timeout: std::time::Duration::from_secs(config.reasoner.timeout_secs),
                model: config.reasoner.model.clone(),
            });
            if !reasoner.check_availability().await? {
                warn!("claude CLI not available; reasoner calls will fail");
            }
            Ok(Arc::new(reasoner))
        }
        _ => Ok(Arc::new(ScriptedReasoner::new())),
    }
}

fn build_price_source(config: &AppConfig) -> Arc<dyn PriceSource> {
    match config.data.price_source.as_str() {
        "yahoo" => Arc::new(YahooPriceSource::new()),
        _ => Arc::new(SyntheticPriceSource::new()),
    }
}

fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},bullbear=debug", config.level)));

    if config.json {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .try_init();
    } else {
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    }
}

fn init_logging_simple() {
    // Minimal logging for CLI commands
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .try_init();
}
