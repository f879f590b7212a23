//a Rust-based event-driven backtesting engine for daily equity bars

pub mod config;
pub mod data;
pub mod engine;
pub mod metrics;
pub mod portfolio;
pub mod strategy;

//prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{
        BacktestConfig, ConfigError, MaParams, MeanReversionParams, MomentumParams,
        RunConfiguration, StrategyParams, StrategyType,
    };
    pub use crate::data::{filter_by_ticker, load_csv, Bar, HistoryWindow, MarketData};
    pub use crate::engine::{
        run_batch, BacktestEngine, BacktestResult, ExecutionModel, Fill, Order, OrderSide,
        RunSpec, RunState,
    };
    pub use crate::metrics::{calculate_equity_curve, EquityPoint, SummaryMetrics};
    pub use crate::portfolio::{Portfolio, Position, TradeRecord};
    pub use crate::strategy::{
        buy_and_hold::BuyAndHoldStrategy, ma_crossover::MaCrossoverStrategy,
        mean_reversion::MeanReversionStrategy, momentum::MomentumStrategy, Signal, Strategy,
    };
}
