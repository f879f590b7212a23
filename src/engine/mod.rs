pub mod backtest;
pub mod execution;
pub mod sizer;
pub mod slippage;
pub mod sweep;

pub use backtest::{BacktestEngine, BacktestResult, RunState};
pub use execution::{ExecutionModel, Fill, Order, OrderSide};
pub use sizer::{affordable_shares, max_shares};
pub use slippage::{executed_price, slippage_amount};
pub use sweep::{run_batch, RunSpec};
