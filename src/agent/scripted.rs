//! Deterministic scripted reasoner for offline simulation runs and tests.
//!
//! Produces the same structured output for the same input every time, so
//! simulations are reproducible without a live model behind them.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::agent::{Judgment, Reasoned, Reasoner};
use crate::debate::{DebateArgument, Verdict};
use crate::domain::{DebateSide, TradeAction};
use crate::error::Result;
use crate::trader::{DecisionContext, TradeProposal};

#[derive(Debug, Clone, Default)]
pub struct ScriptedReasoner;

impl ScriptedReasoner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Reasoner for ScriptedReasoner {
    async fn judge(
        &self,
        side: DebateSide,
        ticker: &str,
        _date: NaiveDate,
        _market_context: &str,
        prior_arguments: &[String],
    ) -> Result<Reasoned<Judgment>> {
        let rebuttal = if prior_arguments.is_empty() {
            ""
        } else {
            ", countering the prior exchange"
        };
        let judgment = match side {
            DebateSide::Bull => Judgment {
                text: format!(
                    "Momentum and sentiment both favor accumulating {ticker}{rebuttal}"
                ),
                supporting_points: vec![
                    "Positive momentum indicators".to_string(),
                    "Favorable market sentiment".to_string(),
                    "Strong fundamentals".to_string(),
                ],
                confidence: 0.8,
            },
            DebateSide::Bear => Judgment {
                text: format!(
                    "Stretched valuation and crowd euphoria argue for caution on {ticker}{rebuttal}"
                ),
                supporting_points: vec![
                    "Overbought conditions".to_string(),
                    "Sentiment froth".to_string(),
                    "Macro uncertainty".to_string(),
                ],
                confidence: 0.7,
            },
        };
        Ok(Reasoned::Structured(judgment))
    }

    async fn synthesize(
        &self,
        _ticker: &str,
        _date: NaiveDate,
        arguments: &[DebateArgument],
    ) -> Result<Reasoned<Verdict>> {
        let mean = |side: DebateSide| {
            let convictions: Vec<f64> = arguments
                .iter()
                .filter(|a| a.side == side)
                .map(|a| a.conviction)
                .collect();
            if convictions.is_empty() {
                0.0
            } else {
                convictions.iter().sum::<f64>() / convictions.len() as f64
            }
        };

        let bull = mean(DebateSide::Bull);
        let bear = mean(DebateSide::Bear);
        // Ties go to the Bull side
        let verdict = if bull >= bear {
            Verdict {
                winning_side: DebateSide::Bull,
                action: TradeAction::Buy,
                confidence: 0.72,
                reasons: vec![format!(
                    "bull case carried {:.2} conviction against {:.2}",
                    bull, bear
                )],
            }
        } else {
            Verdict {
                winning_side: DebateSide::Bear,
                action: TradeAction::Sell,
                confidence: 0.68,
                reasons: vec![format!(
                    "bear case carried {:.2} conviction against {:.2}",
                    bear, bull
                )],
            }
        };
        Ok(Reasoned::Structured(verdict))
    }

    async fn propose(&self, context: &DecisionContext) -> Result<Reasoned<TradeProposal>> {
        let (action, quantity) = match context.verdict.action {
            TradeAction::Buy => (TradeAction::Buy, 10),
            TradeAction::Sell => (TradeAction::Sell, context.position),
            TradeAction::Hold => (TradeAction::Hold, 0),
        };
        Ok(Reasoned::Structured(TradeProposal {
            action,
            quantity,
            reasoning: format!(
                "Following the debate verdict ({} won with {:.2} confidence)",
                context.verdict.winning_side, context.verdict.confidence
            ),
            confidence: context.verdict.confidence,
        }))
    }
}
