pub mod buy_and_hold;
pub mod ma_crossover;
pub mod mean_reversion;
pub mod momentum;

use crate::data::HistoryWindow;
use crate::portfolio::Portfolio;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

//per-ticker trading signal emitted by a strategy for one step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

//strategy contract: a pure function of the historical window, a read-only
//portfolio snapshot and the day's close prices
//implementations take &self and must not keep state across invocations;
//only the engine mutates the portfolio
pub trait Strategy: Send + Sync {
    //returns the strategy name
    fn name(&self) -> &str;

    //emits per-ticker signals for the current day
    fn signals(
        &self,
        window: &HistoryWindow,
        portfolio: &Portfolio,
        prices: &IndexMap<String, f64>,
    ) -> IndexMap<String, Signal>;
}

//helper function to calculate simple moving average
pub fn sma(prices: &[f64]) -> Option<f64> {
    if prices.is_empty() {
        return None;
    }
    Some(prices.iter().sum::<f64>() / prices.len() as f64)
}

//helper function to calculate sample standard deviation
pub fn std_dev(prices: &[f64]) -> Option<f64> {
    if prices.len() < 2 {
        return None;
    }

    let mean = prices.iter().sum::<f64>() / prices.len() as f64;
    let variance = prices
        .iter()
        .map(|p| (p - mean) * (p - mean))
        .sum::<f64>()
        / (prices.len() - 1) as f64;

    Some(variance.sqrt())
}

//trailing return over a lookback window, oldest-first closes
pub fn trailing_return(closes: &[f64], lookback: usize) -> Option<f64> {
    if closes.len() <= lookback {
        return None;
    }

    let current = closes[closes.len() - 1];
    let past = closes[closes.len() - 1 - lookback];

    if past <= 0.0 {
        return None;
    }

    Some((current - past) / past)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sma_of_empty_slice_is_none() {
        assert!(sma(&[]).is_none());
        assert_eq!(sma(&[2.0, 4.0, 6.0]), Some(4.0));
    }

    #[test]
    fn std_dev_needs_two_points() {
        assert!(std_dev(&[1.0]).is_none());
        let sd = std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((sd - 2.138).abs() < 0.001);
    }

    #[test]
    fn trailing_return_uses_lookback_offset() {
        let closes = vec![100.0, 105.0, 110.0, 120.0];
        let ret = trailing_return(&closes, 3).unwrap();
        assert!((ret - 0.2).abs() < 1e-12);
        assert!(trailing_return(&closes, 4).is_none());
    }
}
