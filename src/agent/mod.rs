//! Reasoner boundary: the seam between the mechanical protocol/ledger core
//! and whatever produces natural-language judgments.
//!
//! Two implementations ship: `ClaudeCliReasoner` (subprocess call to the
//! `claude` CLI) and `ScriptedReasoner` (deterministic canned output for
//! offline runs and tests).

mod claude_cli;
pub mod prompts;
mod scripted;

pub use claude_cli::{ClaudeCliReasoner, CliReasonerConfig};
pub use scripted::ScriptedReasoner;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::debate::{DebateArgument, Verdict};
use crate::domain::DebateSide;
use crate::error::Result;
use crate::trader::{DecisionContext, TradeProposal};

/// A structured judgment from one reasoner turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Judgment {
    pub text: String,
    pub supporting_points: Vec<String>,
    /// Confidence in [0, 1]
    pub confidence: f64,
}

impl Judgment {
    /// Fixed neutral-but-directional filler used when a turn's response
    /// cannot be parsed. A malformed single turn never aborts a debate.
    pub fn fallback_for(side: DebateSide) -> Self {
        let text = match side {
            DebateSide::Bull => {
                "Strong bullish signals based on technical and sentiment analysis"
            }
            DebateSide::Bear => "Significant risk factors warrant caution on this position",
        };
        Self {
            text: text.to_string(),
            supporting_points: Vec::new(),
            confidence: 0.5,
        }
    }
}

/// Outcome of a parse-or-fallback reasoner call.
///
/// The fallback path is an explicit, testable variant rather than a
/// swallowed error: callers can log or assert on it, but both variants
/// carry a usable value and the protocol always continues.
#[derive(Debug, Clone, PartialEq)]
pub enum Reasoned<T> {
    /// The response parsed as the expected structure
    Structured(T),
    /// The response was malformed; a fixed default was substituted
    Fallback(T),
}

impl<T> Reasoned<T> {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }

    pub fn into_inner(self) -> T {
        match self {
            Self::Structured(v) | Self::Fallback(v) => v,
        }
    }

    pub fn as_inner(&self) -> &T {
        match self {
            Self::Structured(v) | Self::Fallback(v) => v,
        }
    }
}

/// Natural-language reasoning service consumed by the debate protocol and
/// the trader decision step.
///
/// Errors from these methods represent transport failures (process spawn,
/// timeout); malformed-but-received responses surface as
/// `Reasoned::Fallback` instead.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Reasoner: Send + Sync {
    /// Generate one debate argument for `side`, given the market context
    /// and a bounded window of prior argument texts.
    async fn judge(
        &self,
        side: DebateSide,
        ticker: &str,
        date: NaiveDate,
        market_context: &str,
        prior_arguments: &[String],
    ) -> Result<Reasoned<Judgment>>;

    /// Adjudicate the full transcript into a verdict. Called once per debate.
    async fn synthesize(
        &self,
        ticker: &str,
        date: NaiveDate,
        arguments: &[DebateArgument],
    ) -> Result<Reasoned<Verdict>>;

    /// Propose a trade given the complete daily context and portfolio state.
    async fn propose(&self, context: &DecisionContext) -> Result<Reasoned<TradeProposal>>;
}
