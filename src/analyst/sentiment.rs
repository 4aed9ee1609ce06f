//! Sentiment analyst: aggregates social chatter into an impact tag.

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use tracing::debug;

use crate::data::SentimentSource;
use crate::domain::{AnalysisKind, AnalysisSnapshot};
use crate::error::Result;

pub struct SentimentAnalyst {
    source: Arc<dyn SentimentSource>,
    lookback_days: i64,
}

impl SentimentAnalyst {
    pub fn new(source: Arc<dyn SentimentSource>, lookback_days: i64) -> Self {
        Self {
            source,
            lookback_days,
        }
    }

    pub async fn analyze(&self, ticker: &str, date: NaiveDate) -> Result<AnalysisSnapshot> {
        let start = date - Duration::days(self.lookback_days);
        let aggregate = self.source.aggregate(ticker, start, date).await?;

        let score = (aggregate.reddit_avg_sentiment + aggregate.twitter_avg_sentiment) / 2.0;
        let (tag, confidence) = classify(score, aggregate.total_posts);
        debug!(ticker, %date, tag, score, "sentiment analysis complete");

        let mut indicators = serde_json::Map::new();
        indicators.insert("sentiment_score".to_string(), json_f64(score));
        indicators.insert(
            "reddit_sentiment".to_string(),
            json_f64(aggregate.reddit_avg_sentiment),
        );
        indicators.insert(
            "twitter_sentiment".to_string(),
            json_f64(aggregate.twitter_avg_sentiment),
        );
        indicators.insert(
            "total_posts".to_string(),
            serde_json::Value::from(aggregate.total_posts),
        );

        Ok(AnalysisSnapshot {
            kind: AnalysisKind::Sentiment,
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

fn classify(score: f64, total_posts: u64) -> (&'static str, f64) {
    let tag = if score > 0.2 {
        "POSITIVE"
    } else if score < -0.2 {
        "NEGATIVE"
    } else {
        "NEUTRAL"
    };
    // Confidence grows with signal strength; thin chatter caps it low
    let strength = score.abs().min(1.0);
    let volume_factor = if total_posts >= 50 { 1.0 } else { 0.6 };
    let confidence = (0.4 + 0.5 * strength) * volume_factor;
    (tag, confidence.clamp(0.0, 1.0))
}
