//! Simulation runner: the daily analyze -> debate -> trade pipeline,
//! executed as a background job reporting into the registry.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{error, info};
use uuid::Uuid;

use crate::analyst::{SentimentAnalyst, TechnicalAnalyst};
use crate::config::AppConfig;
use crate::data::{PriceSource, SentimentSource};
use crate::debate::{DebateEngine, DebateTranscript};
use crate::domain::AnalysisSnapshot;
use crate::error::{BullbearError, Result};
use crate::agent::Reasoner;
use crate::sim::calendar;
use crate::sim::job::JobRegistry;
use crate::trader::{ExecutedTrade, Trader, TraderDecision};

/// Everything that happened on one simulated trading day
#[derive(Debug, Clone, Serialize)]
pub struct DayRecord {
    pub date: NaiveDate,
    pub price: Decimal,
    pub technical: AnalysisSnapshot,
    pub sentiment: AnalysisSnapshot,
    pub debate: DebateTranscript,
    pub decisions: Vec<TraderDecision>,
}

/// Per-trader outcome over the whole run
#[derive(Debug, Clone, Serialize)]
pub struct TraderSummary {
    pub name: String,
    pub model: String,
    pub initial_cash: Decimal,
    pub final_cash: Decimal,
    pub final_position: u64,
    /// Cash plus holdings marked at the final day's price
    pub final_value: Decimal,
    pub return_pct: Decimal,
    pub total_trades: usize,
    /// Fraction of recorded decisions (HOLDs included) that brought cash in
    pub win_rate: f64,
    pub trade_history: Vec<ExecutedTrade>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationResult {
    pub ticker: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_days: usize,
    pub final_price: Decimal,
    pub traders: Vec<TraderSummary>,
    pub daily: Vec<DayRecord>,
}

/// Owns the data sources and reasoner, and drives simulation jobs. Cheap to
/// clone; all heavy state is shared behind `Arc`.
#[derive(Clone)]
pub struct SimulationRunner {
    reasoner: Arc<dyn Reasoner>,
    prices: Arc<dyn PriceSource>,
    sentiment: Arc<dyn SentimentSource>,
    registry: Arc<RwLock<JobRegistry>>,
    config: AppConfig,
}

impl SimulationRunner {
    pub fn new(
        reasoner: Arc<dyn Reasoner>,
        prices: Arc<dyn PriceSource>,
        sentiment: Arc<dyn SentimentSource>,
        registry: Arc<RwLock<JobRegistry>>,
        config: AppConfig,
    ) -> Self {
        Self {
            reasoner,
            prices,
            sentiment,
            registry,
            config,
        }
    }

    pub fn registry(&self) -> Arc<RwLock<JobRegistry>> {
        Arc::clone(&self.registry)
    }

    pub fn technical_analyst(&self) -> TechnicalAnalyst {
        TechnicalAnalyst::new(
            Arc::clone(&self.prices),
            self.config.simulation.technical_lookback_days,
        )
    }

    pub fn sentiment_analyst(&self) -> SentimentAnalyst {
        SentimentAnalyst::new(
            Arc::clone(&self.sentiment),
            self.config.simulation.sentiment_lookback_days,
        )
    }

    pub fn debate_engine(&self) -> DebateEngine {
        DebateEngine::new(
            Arc::clone(&self.reasoner),
            self.config.simulation.context_window,
        )
    }

    /// Start a simulation in the background and return its job id.
    ///
    /// Fails fast on an invalid range or when another job is running; after
    /// that, any failure is captured into the job's state instead of
    /// surfacing anywhere.
    pub async fn spawn(
        &self,
        ticker: String,
        start_date: NaiveDate,
        end_date: NaiveDate,
        rounds: Option<u32>,
    ) -> Result<Uuid> {
        let days = calendar::trading_days(start_date, end_date)?;
        if days.is_empty() {
            return Err(BullbearError::InvalidDateRange(format!(
                "no trading days between {start_date} and {end_date}"
            )));
        }
        let rounds = self.resolve_rounds(rounds)?;

        let id = self
            .registry
            .write()
            .await
            .begin(ticker.clone(), start_date, end_date, days.len())?;

        let runner = self.clone();
        tokio::spawn(async move {
            match runner.run_job(id, &ticker, &days, rounds).await {
                Ok(result) => runner.registry.write().await.complete(id, result),
                Err(e) => {
                    error!(job_id = %id, "simulation failed: {e}");
                    runner.registry.write().await.fail(id, e.to_string());
                }
            }
        });

        Ok(id)
    }

    /// Run a simulation to completion on the current task, still recording
    /// it as a job. Used by the CLI one-shot path.
    pub async fn run_blocking(
        &self,
        ticker: String,
        start_date: NaiveDate,
        end_date: NaiveDate,
        rounds: Option<u32>,
    ) -> Result<SimulationResult> {
        let days = calendar::trading_days(start_date, end_date)?;
        if days.is_empty() {
            return Err(BullbearError::InvalidDateRange(format!(
                "no trading days between {start_date} and {end_date}"
            )));
        }
        let rounds = self.resolve_rounds(rounds)?;

        let id = self
            .registry
            .write()
            .await
            .begin(ticker.clone(), start_date, end_date, days.len())?;

        match self.run_job(id, &ticker, &days, rounds).await {
            Ok(result) => {
                self.registry.write().await.complete(id, result.clone());
                Ok(result)
            }
            Err(e) => {
                self.registry.write().await.fail(id, e.to_string());
                Err(e)
            }
        }
    }

    /// Per-request debate-round override, bounded the same way the
    /// configured value is.
    fn resolve_rounds(&self, rounds: Option<u32>) -> Result<u32> {
        let rounds = rounds.unwrap_or(self.config.simulation.debate_rounds);
        if rounds == 0 {
            return Err(BullbearError::Validation(
                "debate_rounds must be at least 1".to_string(),
            ));
        }
        Ok(rounds)
    }

    async fn run_job(
        &self,
        id: Uuid,
        ticker: &str,
        days: &[NaiveDate],
        rounds: u32,
    ) -> Result<SimulationResult> {
        let technical_analyst = self.technical_analyst();
        let sentiment_analyst = self.sentiment_analyst();
        let engine = self.debate_engine();

        // Every job gets a fresh roster so runs never leak state into each
        // other.
        let mut traders: Vec<Trader> = self
            .config
            .trading
            .traders
            .iter()
            .map(|spec| {
                Trader::new(
                    spec.name.clone(),
                    spec.model.clone(),
                    self.config.trading.initial_cash,
                    self.config.trading.max_position_pct,
                )
            })
            .collect();

        info!(job_id = %id, ticker, days = days.len(), "simulation started");

        let mut daily = Vec::with_capacity(days.len());
        let mut final_price = Decimal::ZERO;

        for (done, &day) in days.iter().enumerate() {
            self.registry
                .write()
                .await
                .advance(id, day, done, days.len());

            let price = self.prices.closing_price(ticker, day).await?;
            let technical = technical_analyst.analyze(ticker, day).await?;
            let sentiment = sentiment_analyst.analyze(ticker, day).await?;
            let debate = engine
                .conduct(ticker, day, &technical, &sentiment, rounds)
                .await?;

            let mut decisions = Vec::with_capacity(traders.len());
            for trader in &mut traders {
                let decision = trader
                    .decide(
                        self.reasoner.as_ref(),
                        ticker,
                        day,
                        price,
                        &technical,
                        &sentiment,
                        &debate,
                    )
                    .await?;
                decisions.push(decision);
            }

            final_price = price;
            daily.push(DayRecord {
                date: day,
                price,
                technical,
                sentiment,
                debate,
                decisions,
            });
        }

        let prices_now = HashMap::from([(ticker.to_string(), final_price)]);
        let traders = traders
            .iter()
            .map(|t| summarize(t, ticker, &prices_now))
            .collect();

        Ok(SimulationResult {
            ticker: ticker.to_string(),
            start_date: days[0],
            end_date: days[days.len() - 1],
            total_days: days.len(),
            final_price,
            traders,
            daily,
        })
    }
}

fn summarize(
    trader: &Trader,
    ticker: &str,
    prices_now: &HashMap<String, Decimal>,
) -> TraderSummary {
    let portfolio = &trader.portfolio;
    let initial_cash = portfolio.initial_cash();
    let final_value = portfolio.value(prices_now);
    let return_pct = if initial_cash > Decimal::ZERO {
        ((final_value - initial_cash) / initial_cash * Decimal::from(100)).round_dp(2)
    } else {
        Decimal::ZERO
    };

    let history = portfolio.history();
    let wins = history.iter().filter(|t| t.cost < Decimal::ZERO).count();
    let win_rate = if history.is_empty() {
        0.0
    } else {
        wins as f64 / history.len() as f64
    };

    TraderSummary {
        name: trader.name.clone(),
        model: trader.model.clone(),
        initial_cash,
        final_cash: portfolio.cash(),
        final_position: portfolio.position(ticker),
        final_value,
        return_pct,
        total_trades: history.len(),
        win_rate,
        trade_history: history.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::ScriptedReasoner;
    use crate::data::{SyntheticPriceSource, SyntheticSentimentSource};
    use crate::sim::job::JobStatus;
    use std::time::Duration;

    fn runner() -> SimulationRunner {
        SimulationRunner::new(
            Arc::new(ScriptedReasoner::new()),
            Arc::new(SyntheticPriceSource::new()),
            Arc::new(SyntheticSentimentSource::new()),
            Arc::new(RwLock::new(JobRegistry::new())),
            AppConfig::default(),
        )
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 7, d).unwrap()
    }

    #[tokio::test]
    async fn test_run_blocking_covers_all_trading_days() {
        let runner = runner();
        let result = runner
            .run_blocking("AAPL".to_string(), date(1), date(3), None)
            .await
            .unwrap();

        // Wed/Thu/Fri
        assert_eq!(result.total_days, 3);
        assert_eq!(result.daily.len(), 3);
        assert_eq!(result.traders.len(), 3);
        assert!(result.final_price > Decimal::ZERO);

        let registry = runner.registry();
        let registry = registry.read().await;
        let job = registry.get(None).unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.progress, 100);
    }

    #[tokio::test]
    async fn test_each_trader_records_one_decision_per_day() {
        let runner = runner();
        let result = runner
            .run_blocking("AAPL".to_string(), date(1), date(3), None)
            .await
            .unwrap();

        for summary in &result.traders {
            assert_eq!(summary.total_trades, 3);
            assert_eq!(summary.trade_history.len(), 3);
        }
        for day in &result.daily {
            assert_eq!(day.decisions.len(), 3);
        }
    }

    #[tokio::test]
    async fn test_buy_only_run_has_zero_win_rate() {
        // the scripted reasoner buys in an uptrend, so no cash ever flows in
        let runner = runner();
        let result = runner
            .run_blocking("AAPL".to_string(), date(1), date(3), None)
            .await
            .unwrap();
        for summary in &result.traders {
            assert_eq!(summary.win_rate, 0.0);
            assert!(summary.final_position > 0);
        }
    }

    #[tokio::test]
    async fn test_spawn_runs_in_background() {
        let runner = runner();
        let id = runner
            .spawn("AAPL".to_string(), date(1), date(2), None)
            .await
            .unwrap();

        for _ in 0..100 {
            {
                let registry = runner.registry.read().await;
                let job = registry.get(Some(id)).unwrap();
                if job.status == JobStatus::Completed {
                    assert!(job.result.is_some());
                    return;
                }
                assert_ne!(job.status, JobStatus::Error);
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("job did not complete in time");
    }

    #[tokio::test]
    async fn test_spawn_rejects_concurrent_job() {
        let runner = runner();
        runner
            .spawn("AAPL".to_string(), date(1), date(10), None)
            .await
            .unwrap();
        let second = runner.spawn("MSFT".to_string(), date(1), date(2), None).await;
        assert!(matches!(second, Err(BullbearError::JobAlreadyRunning)));
    }

    #[tokio::test]
    async fn test_weekend_only_range_rejected() {
        let runner = runner();
        let result = runner.spawn("AAPL".to_string(), date(4), date(5), None).await;
        assert!(matches!(result, Err(BullbearError::InvalidDateRange(_))));
    }
}
