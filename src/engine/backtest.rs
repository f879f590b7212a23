use crate::config::{BacktestConfig, ConfigError};
use crate::data::{Bar, MarketData};
use crate::engine::execution::{ExecutionModel, Order, OrderSide};
use crate::metrics::{calculate_equity_curve, EquityPoint, SummaryMetrics};
use crate::portfolio::{Portfolio, TradeRecord};
use crate::strategy::{Signal, Strategy};
use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

//lifecycle of a single run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Finished,
    Aborted,
}

//result of a backtest, the sole artifact handed to any outer layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    pub initial_capital: f64,
    pub final_value: f64,
    pub total_return: f64,

    //false when the run was aborted; the partial curve is still valid
    pub completed: bool,

    pub summary: SummaryMetrics,
    pub equity_curve: Vec<EquityPoint>,
    pub trades: Vec<TradeRecord>,
}

//main backtest engine: replays the per-day loop over a read-only feed,
//owning the only mutable state of the run
pub struct BacktestEngine<'a> {
    config: BacktestConfig,
    data: &'a MarketData,
    execution: ExecutionModel,
    portfolio: Portfolio,
    state: RunState,
    abort: Option<Arc<AtomicBool>>,

    //closes carried forward so positions with a data gap still mark
    last_prices: IndexMap<String, f64>,

    equity_history: Vec<(NaiveDate, f64, f64)>,
}

impl<'a> BacktestEngine<'a> {
    //creates an engine after fail-fast validation of the configuration
    pub fn new(config: BacktestConfig, data: &'a MarketData) -> Result<Self, ConfigError> {
        config.validate()?;

        let portfolio = Portfolio::new(config.initial_capital);
        let execution = ExecutionModel::from_config(&config);

        Ok(BacktestEngine {
            config,
            data,
            execution,
            portfolio,
            state: RunState::Idle,
            abort: None,
            last_prices: IndexMap::new(),
            equity_history: Vec::new(),
        })
    }

    //installs an external cancellation signal, checked at day boundaries
    pub fn with_abort_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.abort = Some(flag);
        self
    }

    //runs the backtest with the given strategy
    pub fn run(&mut self, strategy: &dyn Strategy) -> BacktestResult {
        info!(strategy = strategy.name(), "starting backtest");
        self.state = RunState::Running;

        let start = self.config.start_date;
        let end = self.config.end_date;
        let calendar: Vec<NaiveDate> = self
            .data
            .calendar()
            .iter()
            .copied()
            .filter(|&d| {
                start.map(|s| d >= s).unwrap_or(true) && end.map(|e| d <= e).unwrap_or(true)
            })
            .collect();

        for day in calendar {
            if let Some(flag) = &self.abort {
                if flag.load(Ordering::Relaxed) {
                    warn!(%day, "abort requested, stopping at day boundary");
                    self.state = RunState::Aborted;
                    break;
                }
            }

            let prices = self.data.closes_on(day);
            if prices.is_empty() {
                continue;
            }

            for (ticker, &price) in &prices {
                self.last_prices.insert(ticker.clone(), price);
            }

            //pull signals from the strategy
            let window = self.data.window(day);
            let signals = strategy.signals(&window, &self.portfolio, &prices);

            //sells first so rebalance proceeds can fund the day's buys
            for pass in [Signal::Sell, Signal::Buy] {
                for (ticker, &signal) in &signals {
                    if signal != pass {
                        continue;
                    }

                    //a ticker with no bar today is skipped, not an error
                    let Some(bar) = self.data.bar(ticker, day) else {
                        debug!(%ticker, %day, "no bar for signal, skipping");
                        continue;
                    };

                    match signal {
                        Signal::Buy => self.execute_buy(day, bar),
                        Signal::Sell => self.execute_sell(day, bar),
                        Signal::Hold => {}
                    }
                }
            }

            //snapshot equity at the day's closes
            let equity = self.portfolio.mark_to_market(&self.last_prices);
            self.equity_history.push((day, equity, self.portfolio.cash));
        }

        if self.state == RunState::Running {
            self.state = RunState::Finished;
        }

        let result = self.build_result();
        info!(
            final_value = result.final_value,
            total_return = result.total_return,
            trades = result.trades.len(),
            completed = result.completed,
            "backtest finished"
        );
        result
    }

    //resolves a buy signal: size, slip, commit
    fn execute_buy(&mut self, day: NaiveDate, bar: &Bar) {
        let quantity =
            self.execution
                .propose_buy_quantity(self.portfolio.cash, bar.close, bar.volume);

        //a buy sized to zero is a hold
        if quantity == 0 {
            debug!(ticker = %bar.ticker, %day, "buy sized to zero, holding");
            return;
        }

        let order = Order::new(bar.ticker.clone(), OrderSide::Buy, quantity, bar.close);
        let Some(fill) = self
            .execution
            .execute(&order, day, bar.volume, self.portfolio.cash)
        else {
            debug!(ticker = %bar.ticker, %day, "buy unaffordable after slippage, holding");
            return;
        };

        if let Err(err) =
            self.portfolio
                .apply_buy(&fill.ticker, day, fill.quantity, fill.price, fill.commission)
        {
            warn!(ticker = %fill.ticker, %err, "buy fill rejected by ledger");
        }
    }

    //resolves a sell signal: full position at the slipped price
    fn execute_sell(&mut self, day: NaiveDate, bar: &Bar) {
        let Some(position) = self.portfolio.get_position(&bar.ticker) else {
            return;
        };

        let order = Order::new(
            bar.ticker.clone(),
            OrderSide::Sell,
            position.quantity,
            bar.close,
        );
        let Some(fill) = self.execution.execute(&order, day, bar.volume, 0.0) else {
            return;
        };

        if let Err(err) =
            self.portfolio
                .apply_sell(&fill.ticker, day, fill.quantity, fill.price, fill.commission)
        {
            warn!(ticker = %fill.ticker, %err, "sell fill rejected by ledger");
        }
    }

    fn build_result(&self) -> BacktestResult {
        let dates: Vec<NaiveDate> = self.equity_history.iter().map(|(d, _, _)| *d).collect();
        let equity_values: Vec<f64> = self.equity_history.iter().map(|(_, e, _)| *e).collect();
        let cash_values: Vec<f64> = self.equity_history.iter().map(|(_, _, c)| *c).collect();

        let equity_curve = calculate_equity_curve(
            &dates,
            &equity_values,
            &cash_values,
            self.config.initial_capital,
        );

        let trades = self.portfolio.trade_log.clone();
        let summary =
            SummaryMetrics::from_backtest(&equity_curve, &trades, self.config.initial_capital);

        let final_value = equity_values
            .last()
            .copied()
            .unwrap_or(self.config.initial_capital);

        BacktestResult {
            initial_capital: self.config.initial_capital,
            final_value,
            total_return: final_value / self.config.initial_capital - 1.0,
            completed: self.state == RunState::Finished,
            summary,
            equity_curve,
            trades,
        }
    }

    //returns a reference to the portfolio ledger
    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    //returns the run state
    pub fn state(&self) -> RunState {
        self.state
    }
}
