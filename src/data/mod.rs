//! Market and social data sources.
//!
//! Price and sentiment loading is a boundary concern: the simulation core
//! only sees the `PriceSource` and `SentimentSource` traits.

mod synthetic;
mod yahoo;

pub use synthetic::{SyntheticPriceSource, SyntheticSentimentSource};
pub use yahoo::YahooPriceSource;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One daily OHLCV bar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: u64,
}

/// Source of historical closing prices
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Closing price for a specific date. Errors if no bar exists at or
    /// before `date` within a reasonable lookback.
    async fn closing_price(&self, ticker: &str, date: NaiveDate) -> Result<Decimal>;

    /// Daily bars over `[start, end]` inclusive, oldest first.
    async fn history(&self, ticker: &str, start: NaiveDate, end: NaiveDate)
        -> Result<Vec<DailyBar>>;
}

/// Aggregate social sentiment over a lookback window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentAggregate {
    pub reddit_avg_sentiment: f64,
    pub twitter_avg_sentiment: f64,
    pub total_posts: u64,
}

/// Source of aggregated social sentiment
#[async_trait]
pub trait SentimentSource: Send + Sync {
    async fn aggregate(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<SentimentAggregate>;
}
