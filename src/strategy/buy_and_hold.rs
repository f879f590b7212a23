use crate::data::HistoryWindow;
use crate::portfolio::Portfolio;
use crate::strategy::{Signal, Strategy};
use indexmap::IndexMap;

//buy-and-hold baseline: buys every ticker on its first tradeable day and
//never sells
#[derive(Debug, Clone, Default)]
pub struct BuyAndHoldStrategy;

impl BuyAndHoldStrategy {
    pub fn new() -> Self {
        BuyAndHoldStrategy
    }
}

impl Strategy for BuyAndHoldStrategy {
    fn name(&self) -> &str {
        "Buy and Hold"
    }

    fn signals(
        &self,
        _window: &HistoryWindow,
        portfolio: &Portfolio,
        prices: &IndexMap<String, f64>,
    ) -> IndexMap<String, Signal> {
        let mut signals = IndexMap::new();

        for ticker in prices.keys() {
            if !portfolio.has_position(ticker) {
                signals.insert(ticker.clone(), Signal::Buy);
            }
        }

        signals
    }
}
