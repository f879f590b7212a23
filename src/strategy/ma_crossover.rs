use crate::data::HistoryWindow;
use crate::portfolio::Portfolio;
use crate::strategy::{sma, Signal, Strategy};
use indexmap::IndexMap;

//moving-average crossover strategy
//buys when the short ma crosses above the long ma and no position is open
//sells when it crosses below and a position is open
#[derive(Debug, Clone)]
pub struct MaCrossoverStrategy {
    short_window: usize,
    long_window: usize,
}

impl MaCrossoverStrategy {
    pub fn new(short_window: usize, long_window: usize) -> Self {
        MaCrossoverStrategy {
            short_window,
            long_window,
        }
    }

    //crossover test against the previous day's averages
    fn crossover(&self, closes: &[f64]) -> Option<Signal> {
        //need one extra bar for yesterday's averages
        if closes.len() < self.long_window + 1 {
            return None;
        }

        let today = closes;
        let yesterday = &closes[..closes.len() - 1];

        let curr_short = sma(&today[today.len() - self.short_window..])?;
        let curr_long = sma(&today[today.len() - self.long_window..])?;
        let prev_short = sma(&yesterday[yesterday.len() - self.short_window..])?;
        let prev_long = sma(&yesterday[yesterday.len() - self.long_window..])?;

        //bullish crossover: short crosses above long
        if prev_short <= prev_long && curr_short > curr_long {
            return Some(Signal::Buy);
        }
        //bearish crossover: short crosses below long
        if prev_short >= prev_long && curr_short < curr_long {
            return Some(Signal::Sell);
        }

        None
    }
}

impl Strategy for MaCrossoverStrategy {
    fn name(&self) -> &str {
        "MA Crossover"
    }

    fn signals(
        &self,
        window: &HistoryWindow,
        portfolio: &Portfolio,
        prices: &IndexMap<String, f64>,
    ) -> IndexMap<String, Signal> {
        let mut signals = IndexMap::new();

        for ticker in prices.keys() {
            let closes = window.closes(ticker);

            match self.crossover(&closes) {
                Some(Signal::Buy) if !portfolio.has_position(ticker) => {
                    signals.insert(ticker.clone(), Signal::Buy);
                }
                Some(Signal::Sell) if portfolio.has_position(ticker) => {
                    signals.insert(ticker.clone(), Signal::Sell);
                }
                _ => {}
            }
        }

        signals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Bar, MarketData};
    use chrono::NaiveDate;

    fn data_from_closes(closes: &[f64]) -> MarketData {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                Bar::new_unchecked(
                    start + chrono::Days::new(i as u64),
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

    #[test]
    fn bullish_crossover_emits_buy_when_flat() {
        //short ma (2) below long ma (3), then price jumps so short crosses above
        let data = data_from_closes(&[10.0, 9.0, 8.0, 7.0, 12.0]);
        let last_day = *data.calendar().last().unwrap();

        let strategy = MaCrossoverStrategy::new(2, 3);
        let portfolio = Portfolio::new(1_000_000.0);
        let prices = data.closes_on(last_day);

        let signals = strategy.signals(&data.window(last_day), &portfolio, &prices);
        assert_eq!(signals.get("FPT"), Some(&Signal::Buy));
    }

    #[test]
    fn bearish_crossover_emits_sell_only_with_position() {
        //uptrend then a sharp drop so short crosses below long
        let data = data_from_closes(&[10.0, 11.0, 12.0, 13.0, 8.0]);
        let last_day = *data.calendar().last().unwrap();

        let strategy = MaCrossoverStrategy::new(2, 3);
        let prices = data.closes_on(last_day);

        let flat = Portfolio::new(1_000_000.0);
        let signals = strategy.signals(&data.window(last_day), &flat, &prices);
        assert!(signals.is_empty());

        let mut holding = Portfolio::new(1_000_000.0);
        holding
            .apply_buy("FPT", "2024-01-01".parse().unwrap(), 10, 10.0, 0.0)
            .unwrap();
        let signals = strategy.signals(&data.window(last_day), &holding, &prices);
        assert_eq!(signals.get("FPT"), Some(&Signal::Sell));
    }

    #[test]
    fn too_little_history_is_silent() {
        let data = data_from_closes(&[10.0, 11.0]);
        let last_day = *data.calendar().last().unwrap();

        let strategy = MaCrossoverStrategy::new(2, 3);
        let portfolio = Portfolio::new(1_000_000.0);
        let prices = data.closes_on(last_day);

        let signals = strategy.signals(&data.window(last_day), &portfolio, &prices);
        assert!(signals.is_empty());
    }
}
