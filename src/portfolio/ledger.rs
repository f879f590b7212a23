use crate::portfolio::position::{Position, TradeRecord};
use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Insufficient funds: need {needed:.2}, have {available:.2}")]
    InsufficientFunds { needed: f64, available: f64 },
    #[error("No open position in {0}")]
    NoPosition(String),
}

//the sole mutable state of a run: cash, open positions, realized pnl
//mutated exclusively by the backtest engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Portfolio {
    pub initial_capital: f64,
    pub cash: f64,
    pub positions: IndexMap<String, Position>,
    pub realized_pnl: f64,
    pub trade_log: Vec<TradeRecord>,
}

impl Portfolio {
    pub fn new(initial_capital: f64) -> Self {
        Portfolio {
            initial_capital,
            cash: initial_capital,
            positions: IndexMap::new(),
            realized_pnl: 0.0,
            trade_log: Vec::new(),
        }
    }

    //opens or adds to a long position
    //rejects the order outright if cost plus commission exceeds cash;
    //the engine pre-clamps quantity so this is the exceptional path
    pub fn apply_buy(
        &mut self,
        ticker: &str,
        date: NaiveDate,
        quantity: u64,
        price: f64,
        commission: f64,
    ) -> Result<(), LedgerError> {
        let total_cost = price * quantity as f64 + commission;

        if total_cost > self.cash {
            warn!(
                ticker,
                needed = total_cost,
                available = self.cash,
                "buy rejected: insufficient funds"
            );
            return Err(LedgerError::InsufficientFunds {
                needed: total_cost,
                available: self.cash,
            });
        }

        self.cash -= total_cost;

        match self.positions.get_mut(ticker) {
            Some(position) => position.add(quantity, price),
            None => {
                self.positions.insert(
                    ticker.to_string(),
                    Position::new(ticker.to_string(), quantity, price, date),
                );
            }
        }

        debug!(ticker, quantity, price, commission, cash = self.cash, "buy applied");
        Ok(())
    }

    //closes all or part of a long position, clamping to the held quantity
    //realized pnl is net of commission; the position is dropped at zero
    pub fn apply_sell(
        &mut self,
        ticker: &str,
        date: NaiveDate,
        quantity: u64,
        price: f64,
        commission: f64,
    ) -> Result<TradeRecord, LedgerError> {
        let position = self
            .positions
            .get_mut(ticker)
            .ok_or_else(|| LedgerError::NoPosition(ticker.to_string()))?;

        let quantity = quantity.min(position.quantity);
        let proceeds = price * quantity as f64 - commission;
        let pnl = (price - position.avg_cost) * quantity as f64 - commission;

        self.cash += proceeds;
        self.realized_pnl += pnl;

        let record = TradeRecord {
            ticker: ticker.to_string(),
            entry_date: position.entry_date,
            entry_price: position.avg_cost,
            exit_date: date,
            exit_price: price,
            quantity,
            pnl,
            holding_days: (date - position.entry_date).num_days(),
        };

        position.quantity -= quantity;
        if position.quantity == 0 {
            self.positions.shift_remove(ticker);
        }

        debug!(ticker, quantity, price, pnl, cash = self.cash, "sell applied");

        self.trade_log.push(record.clone());
        Ok(record)
    }

    //total account value: cash plus mark-to-market of open positions
    //positions missing from the price map fall back to average cost
    pub fn mark_to_market(&self, prices: &IndexMap<String, f64>) -> f64 {
        let mut total = self.cash;

        for (ticker, position) in &self.positions {
            let price = prices.get(ticker).copied().unwrap_or(position.avg_cost);
            total += position.market_value(price);
        }

        total
    }

    pub fn get_position(&self, ticker: &str) -> Option<&Position> {
        self.positions.get(ticker)
    }

    pub fn has_position(&self, ticker: &str) -> bool {
        self.positions.contains_key(ticker)
    }

    //total unrealized pnl at the given prices
    pub fn total_unrealized_pnl(&self, prices: &IndexMap<String, f64>) -> f64 {
        self.positions
            .iter()
            .filter_map(|(ticker, position)| {
                prices.get(ticker).map(|&p| position.unrealized_pnl(p))
            })
            .sum()
    }
}
