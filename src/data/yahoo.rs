//! Yahoo Finance chart API price source.

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use crate::data::{DailyBar, PriceSource};
use crate::error::{BullbearError, Result};

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Price source backed by the public Yahoo Finance v8 chart endpoint
pub struct YahooPriceSource {
    client: reqwest::Client,
    base_url: String,
}

impl YahooPriceSource {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    async fn fetch_chart(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<ChartResult> {
        let period1 = start
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp())
            .unwrap_or(0);
        // Inclusive end: ask for midnight of the following day
        let period2 = (end + Duration::days(1))
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp())
            .unwrap_or(0);

        let url = format!("{}/v8/finance/chart/{}", self.base_url, ticker);
        debug!(ticker, %start, %end, "fetching yahoo chart");

        let response: ChartResponse = self
            .client
            .get(&url)
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response
            .chart
            .result
            .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
            .ok_or_else(|| BullbearError::PriceUnavailable {
                ticker: ticker.to_string(),
                date: end,
            })
    }
}

impl Default for YahooPriceSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceSource for YahooPriceSource {
    async fn closing_price(&self, ticker: &str, date: NaiveDate) -> Result<Decimal> {
        // Pull a week back so holidays/weekends still resolve to the most
        // recent session at or before the requested date.
        let bars = self.history(ticker, date - Duration::days(7), date).await?;
        bars.into_iter()
            .filter(|b| b.date <= date)
            .next_back()
            .map(|b| b.close)
            .ok_or_else(|| BullbearError::PriceUnavailable {
                ticker: ticker.to_string(),
                date,
            })
    }

    async fn history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyBar>> {
        let chart = self.fetch_chart(ticker, start, end).await?;
        let quote = chart
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| BullbearError::PriceUnavailable {
                ticker: ticker.to_string(),
                date: end,
            })?;

        let mut bars = Vec::with_capacity(chart.timestamp.len());
        for (idx, ts) in chart.timestamp.iter().enumerate() {
            let Some(date) = DateTime::from_timestamp(*ts, 0).map(|dt| dt.date_naive()) else {
                continue;
            };
            // Yahoo pads missing sessions with nulls; skip incomplete bars
            let (Some(open), Some(high), Some(low), Some(close)) = (
                field(&quote.open, idx),
                field(&quote.high, idx),
                field(&quote.low, idx),
                field(&quote.close, idx),
            ) else {
                continue;
            };
            let volume = quote
                .volume
                .get(idx)
                .copied()
                .flatten()
                .unwrap_or_default();
            bars.push(DailyBar {
                date,
                open,
                high,
                low,
                close,
                volume,
            });
        }
        Ok(bars)
    }
}

fn field(values: &[Option<f64>], idx: usize) -> Option<Decimal> {
    values
        .get(idx)
        .copied()
        .flatten()
        .and_then(Decimal::from_f64)
        .map(|d| d.round_dp(4))
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize, Default)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_response_parses_with_nulls() {
        let raw = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1593561600, 1593648000],
                    "indicators": {
                        "quote": [{
                            "open": [100.0, null],
                            "high": [102.0, null],
                            "low": [99.0, null],
                            "close": [101.5, null],
                            "volume": [1000000, null]
                        }]
                    }
                }]
            }
        }"#;
        let parsed: ChartResponse = serde_json::from_str(raw).unwrap();
        let result = &parsed.chart.result.as_ref().unwrap()[0];
        assert_eq!(result.timestamp.len(), 2);
        assert_eq!(result.indicators.quote[0].close[1], None);
    }
}
