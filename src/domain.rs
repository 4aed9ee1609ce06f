//! Shared domain vocabulary: trade actions, debate sides, analysis snapshots.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A trading action, proposed or executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeAction {
    Buy,
    Sell,
    Hold,
}

impl TradeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
            Self::Hold => "HOLD",
        }
    }

    /// Lenient parse of a reasoner-provided action string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "BUY" => Some(Self::Buy),
            "SELL" => Some(Self::Sell),
            "HOLD" => Some(Self::Hold),
            _ => None,
        }
    }
}

impl std::fmt::Display for TradeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which side of the debate an argument belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DebateSide {
    Bull,
    Bear,
}

impl DebateSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bull => "Bull",
            Self::Bear => "Bear",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "bull" | "bullish" => Some(Self::Bull),
            "bear" | "bearish" => Some(Self::Bear),
            _ => None,
        }
    }
}

impl std::fmt::Display for DebateSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which analysis discipline produced a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    Technical,
    Sentiment,
}

/// Immutable structured analysis result for one (ticker, date) pair.
///
/// Produced once by an analyst, then consumed read-only by the debate
/// engine and trader decision step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSnapshot {
    pub kind: AnalysisKind,
    pub ticker: String,
    pub date: NaiveDate,
    /// Named indicator/metric fields (e.g. sma_20, rsi, sentiment_score)
    pub indicators: serde_json::Map<String, serde_json::Value>,
    /// Categorical trend/impact tag (e.g. "BULLISH", "IMPROVING")
    pub tag: String,
    /// Confidence in [0, 1]
    pub confidence: f64,
}

impl AnalysisSnapshot {
    pub fn indicator_f64(&self, key: &str) -> Option<f64> {
        self.indicators.get(key).and_then(|v| v.as_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_parse_lenient() {
        assert_eq!(TradeAction::parse(" buy "), Some(TradeAction::Buy));
        assert_eq!(TradeAction::parse("SELL"), Some(TradeAction::Sell));
        assert_eq!(TradeAction::parse("hodl"), None);
    }

    #[test]
    fn test_side_parse() {
        assert_eq!(DebateSide::parse("Bull"), Some(DebateSide::Bull));
        assert_eq!(DebateSide::parse("bearish"), Some(DebateSide::Bear));
        assert_eq!(DebateSide::parse("neutral"), None);
    }
}
