use crate::data::HistoryWindow;
use crate::portfolio::Portfolio;
use crate::strategy::{trailing_return, Signal, Strategy};
use indexmap::IndexMap;

//cross-sectional momentum strategy
//ranks tickers by trailing return over a lookback window, holds the top n,
//rebalances by selling drop-outs and buying new entrants
#[derive(Debug, Clone)]
pub struct MomentumStrategy {
    lookback: usize,
    top_n: usize,
}

impl MomentumStrategy {
    pub fn new(lookback: usize, top_n: usize) -> Self {
        MomentumStrategy { lookback, top_n }
    }
}

impl Strategy for MomentumStrategy {
    fn name(&self) -> &str {
        "Momentum"
    }

    fn signals(
        &self,
        window: &HistoryWindow,
        portfolio: &Portfolio,
        prices: &IndexMap<String, f64>,
    ) -> IndexMap<String, Signal> {
        let mut signals = IndexMap::new();

        //score every ticker with enough history
        let mut scores: Vec<(&str, f64)> = Vec::new();
        for ticker in prices.keys() {
            let closes = window.closes(ticker);
            if let Some(momentum) = trailing_return(&closes, self.lookback) {
                scores.push((ticker.as_str(), momentum));
            }
        }

        if scores.is_empty() {
            return signals;
        }

        //rank by momentum, ties broken by ticker for a stable order
        scores.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(b.0))
        });

        let top: Vec<&str> = scores.iter().take(self.top_n).map(|(t, _)| *t).collect();

        //sell holdings that dropped out of the top n
        for ticker in portfolio.positions.keys() {
            if !top.contains(&ticker.as_str()) && prices.contains_key(ticker) {
                signals.insert(ticker.clone(), Signal::Sell);
            }
        }

        //buy entrants not already held
        for ticker in &top {
            if !portfolio.has_position(ticker) {
                signals.insert((*ticker).to_string(), Signal::Buy);
            }
        }

        signals
    }
}
