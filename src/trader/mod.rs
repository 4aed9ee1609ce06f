//! Trader entities: per-trader portfolio accounting and the daily
//! decision step that turns a debate verdict into an executed trade.

mod decision;
mod portfolio;

pub use decision::{DecisionContext, Trader, TraderDecision, TradeProposal};
pub use portfolio::{ExecutedTrade, Portfolio};
