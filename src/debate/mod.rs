//! Bull/bear debate protocol: bounded argumentation rounds plus a single
//! synthesis step that seals the transcript with a verdict.

mod engine;

pub use engine::DebateEngine;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{DebateSide, TradeAction};

/// One argument turn in the debate. Immutable once recorded; ordered by
/// round, Bull before Bear within a round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateArgument {
    pub round: u32,
    pub side: DebateSide,
    pub text: String,
    pub supporting_points: Vec<String>,
    /// Conviction in [0, 1]
    pub conviction: f64,
    /// True when the turn was substituted with the side's stock filler
    /// because the reasoner output could not be parsed.
    pub fallback: bool,
}

/// The sealed outcome of a debate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    pub winning_side: DebateSide,
    pub action: TradeAction,
    pub confidence: f64,
    pub reasons: Vec<String>,
}

impl Verdict {
    /// Verdict substituted when the synthesis response is unparsable
    pub fn fallback() -> Self {
        Self {
            winning_side: DebateSide::Bull,
            action: TradeAction::Hold,
            confidence: 0.6,
            reasons: vec!["balanced arguments on both sides".to_string()],
        }
    }
}

/// Full debate record for one (ticker, date) trading cycle. Built
/// incrementally by the engine and sealed by synthesis; never mutated after.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateTranscript {
    pub ticker: String,
    pub date: NaiveDate,
    pub rounds: u32,
    pub arguments: Vec<DebateArgument>,
    pub verdict: Verdict,
}

/// Protocol phases. A fresh engine invocation walks
/// Opening -> Rebuttal -> Synthesis -> Sealed; Sealed is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DebatePhase {
    Opening,
    Rebuttal,
    Synthesis,
    Sealed,
}

impl DebatePhase {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Opening => "opening",
            Self::Rebuttal => "rebuttal",
            Self::Synthesis => "synthesis",
            Self::Sealed => "sealed",
        }
    }
}
