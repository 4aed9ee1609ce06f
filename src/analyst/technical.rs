//! Technical analyst: moving averages and RSI over a price-history window,
//! condensed into a trend tag.

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use tracing::debug;

use crate::data::{DailyBar, PriceSource};
use crate::domain::{AnalysisKind, AnalysisSnapshot};
use crate::error::{BullbearError, Result};

const SMA_SHORT: usize = 20;
const SMA_LONG: usize = 50;
const RSI_PERIOD: usize = 14;

pub struct TechnicalAnalyst {
    prices: Arc<dyn PriceSource>,
    /// How far back to pull history before `date`
    lookback_days: i64,
}

impl TechnicalAnalyst {
    pub fn new(prices: Arc<dyn PriceSource>, lookback_days: i64) -> Self {
        Self {
            prices,
            lookback_days,
        }
    }

    /// Analyze `ticker` as of `date` using history up to and including that
    /// day.
    pub async fn analyze(&self, ticker: &str, date: NaiveDate) -> Result<AnalysisSnapshot> {
        let start = date - Duration::days(self.lookback_days);
        let bars = self.prices.history(ticker, start, date).await?;
        let closes: Vec<f64> = bars
            .iter()
            .filter_map(|b: &DailyBar| b.close.to_f64())
            .collect();
        let current = *closes.last().ok_or(BullbearError::PriceUnavailable {
            ticker: ticker.to_string(),
            date,
        })?;
        let sma_20 = sma(&closes, SMA_SHORT);
        let sma_50 = sma(&closes, SMA_LONG);
        let rsi = rsi(&closes, RSI_PERIOD);

        let (tag, confidence) = classify(current, sma_20, sma_50, rsi);
        debug!(ticker, %date, tag, confidence, "technical analysis complete");

        let mut indicators = serde_json::Map::new();
        indicators.insert("current_price".to_string(), json_f64(current));
        if let Some(v) = sma_20 {
            indicators.insert("sma_20".to_string(), json_f64(v));
        }
        if let Some(v) = sma_50 {
            indicators.insert("sma_50".to_string(), json_f64(v));
        }
        if let Some(v) = rsi {
            indicators.insert("rsi".to_string(), json_f64(v));
        }

        Ok(AnalysisSnapshot {
            kind: AnalysisKind::Technical,
            ticker: ticker.to_string(),
            date,
            indicators,
            tag: tag.to_string(),
            confidence,
        })
    }
}

fn json_f64(v: f64) -> serde_json::Value {
    serde_json::Number::from_f64(v)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

/// Simple moving average over the trailing `period` closes
fn sma(closes: &[f64], period: usize) -> Option<f64> {
    if closes.len() < period {
        return None;
    }
    let window = &closes[closes.len() - period..];
    Some(window.iter().sum::<f64>() / period as f64)
}

/// Wilder-style RSI over the trailing `period` deltas
fn rsi(closes: &[f64], period: usize) -> Option<f64> {
    if closes.len() < period + 1 {
        return None;
    }
    let deltas: Vec<f64> = closes[closes.len() - period - 1..]
        .windows(2)
        .map(|w| w[1] - w[0])
        .collect();
    let gains: f64 = deltas.iter().filter(|d| **d > 0.0).sum();
    let losses: f64 = deltas.iter().filter(|d| **d < 0.0).map(|d| -d).sum();
    let avg_gain = gains / period as f64;
    let avg_loss = losses / period as f64;
    if avg_loss == 0.0 {
        return Some(100.0);
    }
    let rs = avg_gain / avg_loss;
    Some(100.0 - 100.0 / (1.0 + rs))
}

fn classify(
    current: f64,
    sma_20: Option<f64>,
    sma_50: Option<f64>,
    rsi: Option<f64>,
) -> (&'static str, f64) {
    let mut score: i32 = 0;
    if let Some(short) = sma_20 {
        score += if current > short { 1 } else { -1 };
        if let Some(long) = sma_50 {
            score += if short > long { 1 } else { -1 };
        }
    }
    if let Some(rsi) = rsi {
        if rsi > 70.0 {
            score -= 1; // overbought
        } else if rsi < 30.0 {
            score += 1; // oversold
        }
    }

    match score {
        s if s >= 2 => ("BULLISH", 0.8),
        1 => ("BULLISH", 0.6),
        -1 => ("BEARISH", 0.6),
        s if s <= -2 => ("BEARISH", 0.8),
        _ => ("NEUTRAL", 0.5),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SyntheticPriceSource;

    #[test]
    fn test_sma_needs_full_window() {
        let closes = vec![1.0, 2.0, 3.0];
        assert_eq!(sma(&closes, 5), None);
        assert_eq!(sma(&closes, 3), Some(2.0));
    }

    #[test]
    fn test_rsi_all_gains_saturates() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        assert_eq!(rsi(&closes, 14), Some(100.0));
    }

    #[test]
    fn test_classify_uptrend_is_bullish() {
        let (tag, confidence) = classify(110.0, Some(105.0), Some(100.0), Some(55.0));
        assert_eq!(tag, "BULLISH");
        assert!(confidence > 0.7);
    }

    #[test]
    fn test_classify_downtrend_is_bearish() {
        let (tag, _) = classify(90.0, Some(95.0), Some(100.0), Some(45.0));
        assert_eq!(tag, "BEARISH");
    }

    #[tokio::test]
    async fn test_analyze_without_history_is_price_unavailable() {
        struct EmptyPriceSource;

        #[async_trait::async_trait]
        impl PriceSource for EmptyPriceSource {
            async fn closing_price(
                &self,
                ticker: &str,
                date: NaiveDate,
            ) -> Result<rust_decimal::Decimal> {
                Err(BullbearError::PriceUnavailable {
                    ticker: ticker.to_string(),
                    date,
                })
            }

            async fn history(
                &self,
                _ticker: &str,
                _start: NaiveDate,
                _end: NaiveDate,
            ) -> Result<Vec<DailyBar>> {
                Ok(Vec::new())
            }
        }

        let analyst = TechnicalAnalyst::new(Arc::new(EmptyPriceSource), 60);
        let err = analyst
            .analyze("AAPL", NaiveDate::from_ymd_opt(2020, 7, 1).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, BullbearError::PriceUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_analyze_produces_snapshot_with_indicators() {
        let source = Arc::new(SyntheticPriceSource::new());
        let analyst = TechnicalAnalyst::new(source, 60);
        let snapshot = analyst
            .analyze("AAPL", NaiveDate::from_ymd_opt(2020, 7, 1).unwrap())
            .await
            .unwrap();
        assert_eq!(snapshot.kind, AnalysisKind::Technical);
        assert!(snapshot.indicator_f64("current_price").is_some());
        assert!(snapshot.indicator_f64("sma_20").is_some());
        // synthetic prices drift upward, so the trend reads bullish
        assert_eq!(snapshot.tag, "BULLISH");
    }
}
