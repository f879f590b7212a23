use crate::data::HistoryWindow;
use crate::portfolio::Portfolio;
use crate::strategy::{sma, std_dev, Signal, Strategy};
use indexmap::IndexMap;

//mean reversion strategy using bollinger bands
//buys when the price falls more than num_std deviations below the rolling
//mean, sells on reversion back to or above the mean
#[derive(Debug, Clone)]
pub struct MeanReversionStrategy {
    window: usize,
    num_std: f64,
}

impl MeanReversionStrategy {
    pub fn new(window: usize, num_std: f64) -> Self {
        MeanReversionStrategy { window, num_std }
    }
}

impl Strategy for MeanReversionStrategy {
    fn name(&self) -> &str {
        "Mean Reversion"
    }

    fn signals(
        &self,
        window: &HistoryWindow,
        portfolio: &Portfolio,
        prices: &IndexMap<String, f64>,
    ) -> IndexMap<String, Signal> {
        let mut signals = IndexMap::new();

        for (ticker, &price) in prices {
            let closes = window.closes(ticker);
            if closes.len() < self.window {
                continue;
            }

            let recent = &closes[closes.len() - self.window..];
            let (mean, sd) = match (sma(recent), std_dev(recent)) {
                (Some(mean), Some(sd)) => (mean, sd),
                _ => continue,
            };

            //degenerate flat window has no band to revert from
            if sd == 0.0 {
                continue;
            }

            let lower_band = mean - self.num_std * sd;

            if !portfolio.has_position(ticker) && price < lower_band {
                signals.insert(ticker.clone(), Signal::Buy);
            } else if portfolio.has_position(ticker) && price >= mean {
                signals.insert(ticker.clone(), Signal::Sell);
            }
        }

        signals
    }
}
