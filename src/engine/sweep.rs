use crate::config::{BacktestConfig, ConfigError};
use crate::data::MarketData;
use crate::engine::backtest::{BacktestEngine, BacktestResult};
use crate::strategy::Strategy;
use rayon::prelude::*;
use tracing::info;

//one labelled run in a batch: its own config and strategy, sharing the
//read-only feed with every other run
pub struct RunSpec {
    pub label: String,
    pub config: BacktestConfig,
    pub strategy: Box<dyn Strategy>,
}

//executes independent runs in parallel; each run owns its portfolio so
//there is no shared mutable state, and results come back in input order
pub fn run_batch(
    data: &MarketData,
    specs: Vec<RunSpec>,
) -> Vec<(String, Result<BacktestResult, ConfigError>)> {
    info!(runs = specs.len(), "running backtest batch");

    specs
        .into_par_iter()
        .map(|spec| {
            let result = BacktestEngine::new(spec.config, data)
                .map(|mut engine| engine.run(spec.strategy.as_ref()));
            (spec.label, result)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MaParams, StrategyParams};
    use crate::data::Bar;
    use chrono::NaiveDate;

    fn data() -> MarketData {
        let start: NaiveDate = "2023-01-02".parse().unwrap();
        let bars = (0..120u64)
            .map(|i| {
                let close = 1_000.0 + 200.0 * ((i as f64) / 15.0).sin();
                Bar::new_unchecked(
                    start + chrono::Days::new(i),
                    "FPT".to_string(),
                    close,
                    close,
                    close,
                    close,
                    1_000_000.0,
                )
            })
            .collect();
        MarketData::from_bars(bars).unwrap()
    }

    fn spec(label: &str, short: usize, long: usize) -> RunSpec {
        RunSpec {
            label: label.to_string(),
            config: BacktestConfig::default(),
            strategy: StrategyParams::Ma(MaParams {
                short_window: short,
                long_window: long,
            })
            .build()
            .unwrap(),
        }
    }

    #[test]
    fn batch_preserves_input_order_and_isolation() {
        let data = data();
        let results = run_batch(
            &data,
            vec![spec("5x20", 5, 20), spec("10x30", 10, 30), spec("3x10", 3, 10)],
        );

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].0, "5x20");
        assert_eq!(results[1].0, "10x30");
        assert_eq!(results[2].0, "3x10");
        for (_, result) in &results {
            assert!(result.as_ref().unwrap().completed);
        }
    }

    #[test]
    fn batch_matches_sequential_runs() {
        let data = data();
        let batch = run_batch(&data, vec![spec("a", 5, 20)]);

        let strategy = StrategyParams::Ma(MaParams {
            short_window: 5,
            long_window: 20,
        })
        .build()
        .unwrap();
        let sequential = BacktestEngine::new(BacktestConfig::default(), &data)
            .unwrap()
            .run(strategy.as_ref());

        let a = serde_json::to_string(batch[0].1.as_ref().unwrap()).unwrap();
        let b = serde_json::to_string(&sequential).unwrap();
        assert_eq!(a, b);
    }
}
