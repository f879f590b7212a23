use crate::strategy::{
    buy_and_hold::BuyAndHoldStrategy, ma_crossover::MaCrossoverStrategy,
    mean_reversion::MeanReversionStrategy, momentum::MomentumStrategy, Strategy,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

//strategy type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrategyType {
    MaCrossover,
    Momentum,
    MeanReversion,
    BuyAndHold,
}

impl StrategyType {
    //parse strategy type from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "ma" | "ma_crossover" => Some(StrategyType::MaCrossover),
            "momentum" => Some(StrategyType::Momentum),
            "meanrev" | "mean_reversion" => Some(StrategyType::MeanReversion),
            "bah" | "buy_and_hold" => Some(StrategyType::BuyAndHold),
            _ => None,
        }
    }
}

//moving-average crossover parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaParams {
    pub short_window: usize,
    pub long_window: usize,
}

impl Default for MaParams {
    fn default() -> Self {
        MaParams {
            short_window: 20,
            long_window: 50,
        }
    }
}

//momentum parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MomentumParams {
    pub lookback: usize,
    pub top_n: usize,
}

impl Default for MomentumParams {
    fn default() -> Self {
        MomentumParams {
            lookback: 20,
            top_n: 5,
        }
    }
}

//mean reversion parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeanReversionParams {
    pub window: usize,
    pub num_std: f64,
}

impl Default for MeanReversionParams {
    fn default() -> Self {
        MeanReversionParams {
            window: 20,
            num_std: 2.0,
        }
    }
}

//strategy-specific parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StrategyParams {
    Ma(MaParams),
    Momentum(MomentumParams),
    MeanReversion(MeanReversionParams),
    BuyAndHold,
}

impl StrategyParams {
    //fail-fast validation before anything is simulated
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            StrategyParams::Ma(p) => {
                if p.short_window == 0 {
                    return Err(ConfigError::InvalidParameter(
                        "short_window must be positive".to_string(),
                    ));
                }
                if p.short_window >= p.long_window {
                    return Err(ConfigError::InvalidParameter(format!(
                        "short_window ({}) must be less than long_window ({})",
                        p.short_window, p.long_window
                    )));
                }
            }
            StrategyParams::Momentum(p) => {
                if p.lookback == 0 {
                    return Err(ConfigError::InvalidParameter(
                        "lookback must be positive".to_string(),
                    ));
                }
                if p.top_n == 0 {
                    return Err(ConfigError::InvalidParameter(
                        "top_n must be positive".to_string(),
                    ));
                }
            }
            StrategyParams::MeanReversion(p) => {
                if p.window < 2 {
                    return Err(ConfigError::InvalidParameter(
                        "window must be at least 2".to_string(),
                    ));
                }
                if p.num_std <= 0.0 {
                    return Err(ConfigError::InvalidParameter(
                        "num_std must be positive".to_string(),
                    ));
                }
            }
            StrategyParams::BuyAndHold => {}
        }
        Ok(())
    }

    //builds the strategy value after validating its parameters
    pub fn build(&self) -> Result<Box<dyn Strategy>, ConfigError> {
        self.validate()?;

        Ok(match self {
            StrategyParams::Ma(p) => {
                Box::new(MaCrossoverStrategy::new(p.short_window, p.long_window))
            }
            StrategyParams::Momentum(p) => Box::new(MomentumStrategy::new(p.lookback, p.top_n)),
            StrategyParams::MeanReversion(p) => {
                Box::new(MeanReversionStrategy::new(p.window, p.num_std))
            }
            StrategyParams::BuyAndHold => Box::new(BuyAndHoldStrategy::new()),
        })
    }
}

//per-run engine configuration: account terms, execution-realism flags
//and the simulated date range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    pub commission_rate: f64,
    pub use_slippage: bool,
    pub use_dynamic_sizing: bool,
    pub impact_coefficient: f64,
    pub max_pct_of_volume: f64,
    pub max_pct_of_capital: f64,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_capital: 100_000_000.0,
            commission_rate: 0.0015,
            use_slippage: true,
            use_dynamic_sizing: true,
            impact_coefficient: 0.1,
            max_pct_of_volume: 0.05,
            max_pct_of_capital: 0.2,
            start_date: None,
            end_date: None,
        }
    }
}

impl BacktestConfig {
    //fail-fast validation before the run starts
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_capital <= 0.0 {
            return Err(ConfigError::InvalidParameter(format!(
                "initial_capital must be positive, got {}",
                self.initial_capital
            )));
        }
        if self.commission_rate < 0.0 || self.commission_rate >= 1.0 {
            return Err(ConfigError::InvalidParameter(format!(
                "commission_rate must be in [0, 1), got {}",
                self.commission_rate
            )));
        }
        if self.impact_coefficient < 0.0 {
            return Err(ConfigError::InvalidParameter(format!(
                "impact_coefficient must be non-negative, got {}",
                self.impact_coefficient
            )));
        }
        if self.max_pct_of_volume <= 0.0 || self.max_pct_of_volume > 1.0 {
            return Err(ConfigError::InvalidParameter(format!(
                "max_pct_of_volume must be in (0, 1], got {}",
                self.max_pct_of_volume
            )));
        }
        if self.max_pct_of_capital <= 0.0 || self.max_pct_of_capital > 1.0 {
            return Err(ConfigError::InvalidParameter(format!(
                "max_pct_of_capital must be in (0, 1], got {}",
                self.max_pct_of_capital
            )));
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(ConfigError::InvalidParameter(format!(
                    "start_date ({}) is after end_date ({})",
                    start, end
                )));
            }
        }
        Ok(())
    }
}

//complete run configuration: data source, engine config, strategy and
//optional export paths
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfiguration {
    pub data_path: PathBuf,
    pub engine: BacktestConfig,
    pub strategy_type: StrategyType,
    pub strategy_params: StrategyParams,
    pub output_equity_csv: Option<PathBuf>,
    pub output_trades_csv: Option<PathBuf>,
}

impl RunConfiguration {
    //load configuration from a JSON file
    pub fn from_json_file(path: &PathBuf) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: RunConfiguration = serde_json::from_str(&contents)?;
        Ok(config)
    }

    //save configuration to a JSON file
    pub fn to_json_file(&self, path: &PathBuf) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(BacktestConfig::default().validate().is_ok());
    }

    #[test]
    fn non_positive_capital_is_rejected() {
        let config = BacktestConfig {
            initial_capital: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidParameter(_))
        ));
    }

    #[test]
    fn inverted_date_range_is_rejected() {
        let config = BacktestConfig {
            start_date: Some("2024-06-01".parse().unwrap()),
            end_date: Some("2024-01-01".parse().unwrap()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn short_window_must_be_below_long_window() {
        let params = StrategyParams::Ma(MaParams {
            short_window: 50,
            long_window: 20,
        });
        assert!(params.validate().is_err());
        assert!(params.build().is_err());
    }

    #[test]
    fn defaults_build_every_strategy() {
        for params in [
            StrategyParams::Ma(MaParams::default()),
            StrategyParams::Momentum(MomentumParams::default()),
            StrategyParams::MeanReversion(MeanReversionParams::default()),
            StrategyParams::BuyAndHold,
        ] {
            assert!(params.build().is_ok());
        }
    }

    #[test]
    fn run_configuration_file_round_trip() {
        let config = RunConfiguration {
            data_path: PathBuf::from("bars.csv"),
            engine: BacktestConfig::default(),
            strategy_type: StrategyType::Momentum,
            strategy_params: StrategyParams::Momentum(MomentumParams::default()),
            output_equity_csv: None,
            output_trades_csv: None,
        };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        config.to_json_file(&path).unwrap();

        let back = RunConfiguration::from_json_file(&path).unwrap();
        assert_eq!(back.strategy_type, StrategyType::Momentum);
        assert_eq!(back.data_path, config.data_path);
    }

    #[test]
    fn json_round_trip_preserves_config() {
        let config = BacktestConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: BacktestConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config.initial_capital, back.initial_capital);
        assert_eq!(config.use_slippage, back.use_slippage);
    }
}
