//! Trade execution ledger.
//!
//! Infeasible orders never fail: a buy beyond available cash fills at the
//! largest affordable quantity, a sell beyond inventory fills at the held
//! quantity, and anything left infeasible degrades to HOLD. Every decision
//! appends exactly one record to the append-only trade history.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::TradeAction;
use crate::error::{BullbearError, Result};

/// One executed (possibly clipped or downgraded) trade.
///
/// `cost` is signed: positive is a cash outflow (buy), negative a cash
/// inflow (sell). The sign is the sole later basis for win-rate
/// classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutedTrade {
    pub date: NaiveDate,
    pub ticker: String,
    pub action: TradeAction,
    pub quantity: u64,
    pub price: Decimal,
    pub cost: Decimal,
    pub cash_after: Decimal,
}

/// Per-trader portfolio state, mutated only through [`Portfolio::execute`].
///
/// Invariants: `cash >= 0`, every holding `>= 0`, and the sum of signed
/// costs in the history equals `initial_cash - cash`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Portfolio {
    initial_cash: Decimal,
    cash: Decimal,
    holdings: HashMap<String, u64>,
    trade_history: Vec<ExecutedTrade>,
}

impl Portfolio {
    pub fn new(initial_cash: Decimal) -> Self {
        Self {
            initial_cash,
            cash: initial_cash,
            holdings: HashMap::new(),
            trade_history: Vec::new(),
        }
    }

    pub fn initial_cash(&self) -> Decimal {
        self.initial_cash
    }

    pub fn cash(&self) -> Decimal {
        self.cash
    }

    pub fn position(&self, ticker: &str) -> u64 {
        self.holdings.get(ticker).copied().unwrap_or(0)
    }

    pub fn holdings(&self) -> &HashMap<String, u64> {
        &self.holdings
    }

    pub fn history(&self) -> &[ExecutedTrade] {
        &self.trade_history
    }

    /// Cash plus mark-to-market value of holdings. Tickers without a quoted
    /// price contribute nothing.
    pub fn value(&self, prices: &HashMap<String, Decimal>) -> Decimal {
        let holdings_value: Decimal = self
            .holdings
            .iter()
            .map(|(ticker, qty)| {
                prices.get(ticker).copied().unwrap_or(Decimal::ZERO) * Decimal::from(*qty)
            })
            .sum();
        self.cash + holdings_value
    }

    /// Execute a proposed order against this portfolio.
    ///
    /// Clips to affordability/inventory and downgrades to HOLD when nothing
    /// is feasible; always appends and returns the resulting record.
    pub fn execute(
        &mut self,
        ticker: &str,
        date: NaiveDate,
        price: Decimal,
        action: TradeAction,
        quantity: u64,
    ) -> Result<ExecutedTrade> {
        if price <= Decimal::ZERO {
            return Err(BullbearError::Validation(format!(
                "price must be positive, got {price}"
            )));
        }

        let mut recorded_action = TradeAction::Hold;
        let mut filled: u64 = 0;
        let mut cost = Decimal::ZERO;

        match action {
            TradeAction::Buy if quantity > 0 => {
                let full_cost = price * Decimal::from(quantity);
                if full_cost <= self.cash {
                    filled = quantity;
                    cost = full_cost;
                } else {
                    let affordable = (self.cash / price).floor().to_u64().unwrap_or(0);
                    if affordable > 0 {
                        filled = affordable;
                        cost = price * Decimal::from(affordable);
                    }
                }
                if filled > 0 {
                    recorded_action = TradeAction::Buy;
                    self.cash -= cost;
                    *self.holdings.entry(ticker.to_string()).or_insert(0) += filled;
                }
            }
            TradeAction::Sell if quantity > 0 => {
                let sell_qty = quantity.min(self.position(ticker));
                if sell_qty > 0 {
                    recorded_action = TradeAction::Sell;
                    filled = sell_qty;
                    let proceeds = price * Decimal::from(sell_qty);
                    self.cash += proceeds;
                    cost = -proceeds;
                    if let Some(held) = self.holdings.get_mut(ticker) {
                        *held -= sell_qty;
                    }
                }
            }
            // HOLD, or BUY/SELL with zero quantity: recorded, no state change
            _ => {}
        }

        let trade = ExecutedTrade {
            date,
            ticker: ticker.to_string(),
            action: recorded_action,
            quantity: filled,
            price,
            cost,
            cash_after: self.cash,
        };
        self.trade_history.push(trade.clone());
        Ok(trade)
    }

    /// Sum of signed costs over the full history
    pub fn total_signed_cost(&self) -> Decimal {
        self.trade_history.iter().map(|t| t.cost).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 7, 1).unwrap()
    }

    fn check_invariants(portfolio: &Portfolio) {
        assert!(portfolio.cash() >= Decimal::ZERO);
        assert_eq!(
            portfolio.total_signed_cost(),
            portfolio.initial_cash() - portfolio.cash()
        );
    }

    #[test]
    fn test_full_buy_fill() {
        let mut p = Portfolio::new(dec!(10000));
        let trade = p
            .execute("AAPL", date(), dec!(100), TradeAction::Buy, 50)
            .unwrap();
        assert_eq!(trade.action, TradeAction::Buy);
        assert_eq!(trade.quantity, 50);
        assert_eq!(trade.cost, dec!(5000));
        assert_eq!(p.cash(), dec!(5000));
        assert_eq!(p.position("AAPL"), 50);
        check_invariants(&p);
    }

    #[test]
    fn test_buy_clipped_to_affordable() {
        let mut p = Portfolio::new(dec!(10000));
        let trade = p
            .execute("AAPL", date(), dec!(100), TradeAction::Buy, 150)
            .unwrap();
        assert_eq!(trade.action, TradeAction::Buy);
        assert_eq!(trade.quantity, 100);
        assert_eq!(trade.cost, dec!(10000));
        assert_eq!(p.cash(), Decimal::ZERO);
        assert_eq!(p.position("AAPL"), 100);
        check_invariants(&p);
    }

    #[test]
    fn test_buy_with_no_cash_downgrades_to_hold() {
        let mut p = Portfolio::new(dec!(50));
        let trade = p
            .execute("AAPL", date(), dec!(100), TradeAction::Buy, 10)
            .unwrap();
        assert_eq!(trade.action, TradeAction::Hold);
        assert_eq!(trade.quantity, 0);
        assert_eq!(trade.cost, Decimal::ZERO);
        assert_eq!(p.cash(), dec!(50));
        check_invariants(&p);
    }

    #[test]
    fn test_sell_clipped_to_inventory() {
        let mut p = Portfolio::new(dec!(10000));
        p.execute("AAPL", date(), dec!(100), TradeAction::Buy, 100)
            .unwrap();
        let trade = p
            .execute("AAPL", date(), dec!(110), TradeAction::Sell, 150)
            .unwrap();
        assert_eq!(trade.action, TradeAction::Sell);
        assert_eq!(trade.quantity, 100);
        assert_eq!(trade.cost, dec!(-11000));
        assert_eq!(p.position("AAPL"), 0);
        assert_eq!(p.cash(), dec!(11000));
        check_invariants(&p);
    }

    #[test]
    fn test_sell_with_no_inventory_downgrades_to_hold() {
        let mut p = Portfolio::new(dec!(10000));
        let trade = p
            .execute("AAPL", date(), dec!(100), TradeAction::Sell, 10)
            .unwrap();
        assert_eq!(trade.action, TradeAction::Hold);
        assert_eq!(trade.quantity, 0);
        assert_eq!(trade.cost, Decimal::ZERO);
        check_invariants(&p);
    }

    #[test]
    fn test_zero_quantity_buy_records_hold() {
        let mut p = Portfolio::new(dec!(10000));
        let trade = p
            .execute("AAPL", date(), dec!(100), TradeAction::Buy, 0)
            .unwrap();
        assert_eq!(trade.action, TradeAction::Hold);
        assert_eq!(p.history().len(), 1);
        check_invariants(&p);
    }

    #[test]
    fn test_history_is_chronological_and_append_only() {
        let mut p = Portfolio::new(dec!(10000));
        p.execute("AAPL", date(), dec!(100), TradeAction::Buy, 10)
            .unwrap();
        p.execute("AAPL", date(), dec!(105), TradeAction::Hold, 0)
            .unwrap();
        p.execute("AAPL", date(), dec!(110), TradeAction::Sell, 5)
            .unwrap();
        assert_eq!(p.history().len(), 3);
        assert_eq!(p.history()[0].action, TradeAction::Buy);
        assert_eq!(p.history()[2].action, TradeAction::Sell);
        check_invariants(&p);
    }

    #[test]
    fn test_rejects_non_positive_price() {
        let mut p = Portfolio::new(dec!(10000));
        assert!(p
            .execute("AAPL", date(), Decimal::ZERO, TradeAction::Buy, 10)
            .is_err());
    }

    #[test]
    fn test_value_marks_to_market() {
        let mut p = Portfolio::new(dec!(10000));
        p.execute("AAPL", date(), dec!(100), TradeAction::Buy, 20)
            .unwrap();
        let prices = HashMap::from([("AAPL".to_string(), dec!(120))]);
        assert_eq!(p.value(&prices), dec!(8000) + dec!(2400));
    }
}
