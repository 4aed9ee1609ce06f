//! Daily trader decision step: ask the reasoner for an action proposal,
//! then realize it through the execution ledger.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::agent::Reasoner;
use crate::debate::DebateTranscript;
use crate::domain::{AnalysisSnapshot, TradeAction};
use crate::error::Result;
use crate::trader::Portfolio;

/// A trade proposal from the reasoner, not yet validated against the
/// portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeProposal {
    pub action: TradeAction,
    pub quantity: u64,
    pub reasoning: String,
    pub confidence: f64,
}

impl TradeProposal {
    /// Substituted when the reasoner's proposal cannot be parsed
    pub fn fallback() -> Self {
        Self {
            action: TradeAction::Hold,
            quantity: 0,
            reasoning: "Unable to parse reasoner response".to_string(),
            confidence: 0.5,
        }
    }
}

/// Everything a trader's reasoner call gets to see for one day
#[derive(Debug, Clone, Serialize)]
pub struct DecisionContext {
    pub trader: String,
    pub ticker: String,
    pub date: NaiveDate,
    pub price: Decimal,
    pub cash: Decimal,
    pub position: u64,
    pub portfolio_value: Decimal,
    /// Advisory sizing cap surfaced in the prompt
    pub max_position_pct: f64,
    pub technical: AnalysisSnapshot,
    pub sentiment: AnalysisSnapshot,
    pub verdict: crate::debate::Verdict,
}

/// One trader's executed decision for a day: the proposal's reasoning plus
/// the (possibly clipped or downgraded) result from the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraderDecision {
    pub trader: String,
    pub model: String,
    pub date: NaiveDate,
    pub ticker: String,
    pub price: Decimal,
    pub action: TradeAction,
    pub quantity: u64,
    pub cost: Decimal,
    pub cash_after: Decimal,
    pub reasoning: String,
    pub confidence: f64,
    /// True when the proposal came from the parse fallback
    pub fallback: bool,
}

/// A trader entity: a named reasoner persona owning one portfolio.
#[derive(Debug)]
pub struct Trader {
    pub name: String,
    pub model: String,
    pub portfolio: Portfolio,
    max_position_pct: f64,
}

impl Trader {
    pub fn new(
        name: impl Into<String>,
        model: impl Into<String>,
        initial_cash: Decimal,
        max_position_pct: f64,
    ) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            portfolio: Portfolio::new(initial_cash),
            max_position_pct,
        }
    }

    /// Run one daily decision: reasoner proposal, then ledger execution.
    pub async fn decide(
        &mut self,
        reasoner: &dyn Reasoner,
        ticker: &str,
        date: NaiveDate,
        price: Decimal,
        technical: &AnalysisSnapshot,
        sentiment: &AnalysisSnapshot,
        debate: &DebateTranscript,
    ) -> Result<TraderDecision> {
        let context = DecisionContext {
            trader: self.name.clone(),
            ticker: ticker.to_string(),
            date,
            price,
            cash: self.portfolio.cash(),
            position: self.portfolio.position(ticker),
            portfolio_value: self.portfolio.value(
                &std::collections::HashMap::from([(ticker.to_string(), price)]),
            ),
            max_position_pct: self.max_position_pct,
            technical: technical.clone(),
            sentiment: sentiment.clone(),
            verdict: debate.verdict.clone(),
        };

        let reasoned = reasoner.propose(&context).await?;
        let fallback = reasoned.is_fallback();
        let proposal = reasoned.into_inner();
        if fallback {
            warn!(trader = %self.name, %date, "trade proposal fell back to HOLD");
        }

        let executed =
            self.portfolio
                .execute(ticker, date, price, proposal.action, proposal.quantity)?;
        debug!(
            trader = %self.name,
            %date,
            proposed = %proposal.action,
            executed = %executed.action,
            quantity = executed.quantity,
            "decision executed"
        );

        Ok(TraderDecision {
            trader: self.name.clone(),
            model: self.model.clone(),
            date,
            ticker: ticker.to_string(),
            price,
            action: executed.action,
            quantity: executed.quantity,
            cost: executed.cost,
            cash_after: executed.cash_after,
            reasoning: proposal.reasoning,
            confidence: proposal.confidence,
            fallback,
        })
    }
}
