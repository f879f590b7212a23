use crate::config::BacktestConfig;
use crate::engine::sizer::{affordable_shares, max_shares};
use crate::engine::slippage::executed_price;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

//order side (buy or sell)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

//a strategy's intended trade for one step, consumed within the same step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub ticker: String,
    pub side: OrderSide,
    pub quantity: u64,
    pub reference_price: f64,
}

impl Order {
    pub fn new(ticker: String, side: OrderSide, quantity: u64, reference_price: f64) -> Self {
        Order {
            ticker,
            side,
            quantity,
            reference_price,
        }
    }
}

//the simulated realized execution of an order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fill {
    pub date: NaiveDate,
    pub ticker: String,
    pub side: OrderSide,
    pub quantity: u64,
    pub price: f64,
    pub commission: f64,
}

impl Fill {
    //notional value of the fill
    pub fn notional(&self) -> f64 {
        self.price * self.quantity as f64
    }
}

//turns orders into fills: slippage-adjusted price, liquidity-capped and
//affordability-clamped quantity, commission on notional
#[derive(Debug, Clone, Copy)]
pub struct ExecutionModel {
    pub commission_rate: f64,
    pub use_slippage: bool,
    pub use_dynamic_sizing: bool,
    pub impact_coefficient: f64,
    pub max_pct_of_volume: f64,
    pub max_pct_of_capital: f64,
}

impl ExecutionModel {
    pub fn from_config(config: &BacktestConfig) -> Self {
        ExecutionModel {
            commission_rate: config.commission_rate,
            use_slippage: config.use_slippage,
            use_dynamic_sizing: config.use_dynamic_sizing,
            impact_coefficient: config.impact_coefficient,
            max_pct_of_volume: config.max_pct_of_volume,
            max_pct_of_capital: config.max_pct_of_capital,
        }
    }

    //quantity the engine proposes for a buy signal: as much as sizing
    //allows, or full cash deployment when dynamic sizing is disabled
    pub fn propose_buy_quantity(&self, available_cash: f64, price: f64, daily_volume: f64) -> u64 {
        if self.use_dynamic_sizing {
            max_shares(
                available_cash,
                price,
                daily_volume,
                self.max_pct_of_capital,
                self.max_pct_of_volume,
            )
        } else {
            affordable_shares(available_cash, price, self.commission_rate)
        }
    }

    //simulates execution of an order against the day's bar
    //returns None when the admissible quantity is zero (treated as hold)
    pub fn execute(
        &self,
        order: &Order,
        date: NaiveDate,
        daily_volume: f64,
        available_cash: f64,
    ) -> Option<Fill> {
        if order.quantity == 0 {
            return None;
        }

        let price = if self.use_slippage {
            executed_price(
                order.reference_price,
                daily_volume,
                order.quantity,
                self.impact_coefficient,
                order.side,
            )
        } else {
            order.reference_price
        };

        //a buy must stay affordable at the slippage-adjusted price;
        //the clamped quantity keeps the original (larger) slippage
        let quantity = match order.side {
            OrderSide::Buy => order
                .quantity
                .min(affordable_shares(available_cash, price, self.commission_rate)),
            OrderSide::Sell => order.quantity,
        };

        if quantity == 0 {
            return None;
        }

        let commission = price * quantity as f64 * self.commission_rate;

        Some(Fill {
            date,
            ticker: order.ticker.clone(),
            side: order.side,
            quantity,
            price,
            commission,
        })
    }
}
