pub mod backtest_config;

pub use backtest_config::{
    BacktestConfig, ConfigError, MaParams, MeanReversionParams, MomentumParams, RunConfiguration,
    StrategyParams, StrategyType,
};
