//! Debate engine: runs the bounded bull/bear exchange and seals it with a
//! synthesis verdict.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::agent::{prompts, Reasoner};
use crate::debate::{DebateArgument, DebatePhase, DebateTranscript};
use crate::domain::{AnalysisSnapshot, DebateSide};
use crate::error::{BullbearError, Result};

/// Orchestrates one debate per (ticker, date) cycle.
///
/// Each round runs Bull then Bear. Argument turns see only a sliding
/// window of the most recent prior argument texts; the synthesis step sees
/// the full transcript.
pub struct DebateEngine {
    reasoner: Arc<dyn Reasoner>,
    /// How many prior argument texts each turn gets to see
    context_window: usize,
}

impl DebateEngine {
    pub fn new(reasoner: Arc<dyn Reasoner>, context_window: usize) -> Self {
        Self {
            reasoner,
            context_window,
        }
    }

    /// Run a full debate and return the sealed transcript.
    ///
    /// Individual malformed turns are substituted with stock fillers and
    /// flagged; only transport failures from the reasoner abort the debate.
    pub async fn conduct(
        &self,
        ticker: &str,
        date: NaiveDate,
        technical: &AnalysisSnapshot,
        sentiment: &AnalysisSnapshot,
        rounds: u32,
    ) -> Result<DebateTranscript> {
        if rounds == 0 {
            return Err(BullbearError::Validation(
                "debate must run at least one round".to_string(),
            ));
        }

        let market_context = prompts::format_market_context(technical, sentiment);
        let mut arguments: Vec<DebateArgument> = Vec::with_capacity(rounds as usize * 2);

        for round in 1..=rounds {
            let phase = if round == 1 {
                DebatePhase::Opening
            } else {
                DebatePhase::Rebuttal
            };
            debug!(ticker, %date, round, phase = phase.as_str(), "debate round");
            for side in [DebateSide::Bull, DebateSide::Bear] {
                let priors = self.window(&arguments);
                let reasoned = self
                    .reasoner
                    .judge(side, ticker, date, &market_context, &priors)
                    .await?;
                let fallback = reasoned.is_fallback();
                if fallback {
                    warn!(ticker, %date, round, %side, "argument turn fell back to filler");
                }
                let judgment = reasoned.into_inner();
                arguments.push(DebateArgument {
                    round,
                    side,
                    text: judgment.text,
                    supporting_points: judgment.supporting_points,
                    conviction: judgment.confidence,
                    fallback,
                });
            }
        }

        debug!(ticker, %date, phase = DebatePhase::Synthesis.as_str(), "synthesizing verdict");
        let reasoned = self.reasoner.synthesize(ticker, date, &arguments).await?;
        if reasoned.is_fallback() {
            warn!(ticker, %date, "synthesis fell back to default verdict");
        }
        let verdict = reasoned.into_inner();

        info!(
            ticker,
            %date,
            rounds,
            winner = %verdict.winning_side,
            action = %verdict.action,
            phase = DebatePhase::Sealed.as_str(),
            "debate sealed"
        );

        Ok(DebateTranscript {
            ticker: ticker.to_string(),
            date,
            rounds,
            arguments,
            verdict,
        })
    }

    /// The last `context_window` argument texts, oldest first.
    fn window(&self, arguments: &[DebateArgument]) -> Vec<String> {
        let start = arguments.len().saturating_sub(self.context_window);
        arguments[start..].iter().map(|a| a.text.clone()).collect()
    }
}
