use crate::data::bar::Bar;
use chrono::NaiveDate;
use indexmap::IndexMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("No bars supplied")]
    Empty,
    #[error("Duplicate bar for {ticker} on {date}")]
    DuplicateDate { ticker: String, date: NaiveDate },
}

//read-only market data feed: per-ticker series sorted by date plus the
//union calendar of trading days across all tickers
#[derive(Debug, Clone)]
pub struct MarketData {
    series: IndexMap<String, Vec<Bar>>,
    calendar: Vec<NaiveDate>,
}

impl MarketData {
    //builds the feed from a flat list of bars, grouping by ticker
    //tolerates missing days per ticker, rejects duplicate dates
    pub fn from_bars(bars: Vec<Bar>) -> Result<Self, FeedError> {
        if bars.is_empty() {
            return Err(FeedError::Empty);
        }

        let mut series: IndexMap<String, Vec<Bar>> = IndexMap::new();
        for bar in bars {
            series.entry(bar.ticker.clone()).or_default().push(bar);
        }

        let mut calendar = Vec::new();
        for (ticker, bars) in series.iter_mut() {
            bars.sort_by_key(|b| b.date);

            for pair in bars.windows(2) {
                if pair[0].date == pair[1].date {
                    return Err(FeedError::DuplicateDate {
                        ticker: ticker.clone(),
                        date: pair[0].date,
                    });
                }
            }

            calendar.extend(bars.iter().map(|b| b.date));
        }

        calendar.sort();
        calendar.dedup();

        Ok(MarketData { series, calendar })
    }

    //restricts the feed to [start, end] inclusive; open bounds pass None
    pub fn restrict(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        let keep = |d: NaiveDate| {
            start.map(|s| d >= s).unwrap_or(true) && end.map(|e| d <= e).unwrap_or(true)
        };

        let series: IndexMap<String, Vec<Bar>> = self
            .series
            .iter()
            .map(|(ticker, bars)| {
                let bars = bars.iter().filter(|b| keep(b.date)).cloned().collect();
                (ticker.clone(), bars)
            })
            .collect();

        let calendar = self
            .calendar
            .iter()
            .copied()
            .filter(|&d| keep(d))
            .collect();

        MarketData { series, calendar }
    }

    //ordered trading days across all tickers
    pub fn calendar(&self) -> &[NaiveDate] {
        &self.calendar
    }

    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(|s| s.as_str())
    }

    //looks up the bar for a ticker on an exact date
    pub fn bar(&self, ticker: &str, date: NaiveDate) -> Option<&Bar> {
        let bars = self.series.get(ticker)?;
        let idx = bars.binary_search_by_key(&date, |b| b.date).ok()?;
        Some(&bars[idx])
    }

    //close prices for every ticker that traded on the given date,
    //in feed insertion order
    pub fn closes_on(&self, date: NaiveDate) -> IndexMap<String, f64> {
        let mut prices = IndexMap::new();
        for (ticker, bars) in &self.series {
            if let Ok(idx) = bars.binary_search_by_key(&date, |b| b.date) {
                prices.insert(ticker.clone(), bars[idx].close);
            }
        }
        prices
    }

    //all bars for a ticker with date <= asof
    pub fn bars_through(&self, ticker: &str, asof: NaiveDate) -> &[Bar] {
        match self.series.get(ticker) {
            Some(bars) => {
                let end = bars.partition_point(|b| b.date <= asof);
                &bars[..end]
            }
            None => &[],
        }
    }

    //view of everything up to and including the given day
    pub fn window(&self, asof: NaiveDate) -> HistoryWindow<'_> {
        HistoryWindow { data: self, asof }
    }
}

//read-only historical window handed to strategies: all bars up to and
//including the current simulation day
#[derive(Debug, Clone, Copy)]
pub struct HistoryWindow<'a> {
    data: &'a MarketData,
    asof: NaiveDate,
}

impl<'a> HistoryWindow<'a> {
    pub fn asof(&self) -> NaiveDate {
        self.asof
    }

    pub fn bars(&self, ticker: &str) -> &'a [Bar] {
        self.data.bars_through(ticker, self.asof)
    }

    //close prices for a ticker, oldest first
    pub fn closes(&self, ticker: &str) -> Vec<f64> {
        self.bars(ticker).iter().map(|b| b.close).collect()
    }

    //number of bars available for a ticker
    pub fn bar_count(&self, ticker: &str) -> usize {
        self.bars(ticker).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(ticker: &str, date: &str, close: f64) -> Bar {
        Bar::new_unchecked(
            date.parse().unwrap(),
            ticker.to_string(),
            close,
            close,
            close,
            close,
            1_000.0,
        )
    }

    #[test]
    fn calendar_is_union_of_ticker_dates() {
        let data = MarketData::from_bars(vec![
            bar("FPT", "2024-01-02", 100.0),
            bar("FPT", "2024-01-04", 101.0),
            bar("VNM", "2024-01-03", 70.0),
        ])
        .unwrap();

        let days: Vec<String> = data.calendar().iter().map(|d| d.to_string()).collect();
        assert_eq!(days, vec!["2024-01-02", "2024-01-03", "2024-01-04"]);
    }

    #[test]
    fn duplicate_dates_are_rejected() {
        let result = MarketData::from_bars(vec![
            bar("FPT", "2024-01-02", 100.0),
            bar("FPT", "2024-01-02", 101.0),
        ]);
        assert!(matches!(result, Err(FeedError::DuplicateDate { .. })));
    }

    #[test]
    fn window_excludes_future_bars() {
        let data = MarketData::from_bars(vec![
            bar("FPT", "2024-01-02", 100.0),
            bar("FPT", "2024-01-03", 101.0),
            bar("FPT", "2024-01-04", 102.0),
        ])
        .unwrap();

        let window = data.window("2024-01-03".parse().unwrap());
        assert_eq!(window.closes("FPT"), vec![100.0, 101.0]);
    }

    #[test]
    fn missing_ticker_day_is_absent_from_closes() {
        let data = MarketData::from_bars(vec![
            bar("FPT", "2024-01-02", 100.0),
            bar("VNM", "2024-01-03", 70.0),
        ])
        .unwrap();

        let prices = data.closes_on("2024-01-02".parse().unwrap());
        assert_eq!(prices.len(), 1);
        assert!(prices.contains_key("FPT"));
    }

    #[test]
    fn restrict_trims_calendar_and_series() {
        let data = MarketData::from_bars(vec![
            bar("FPT", "2024-01-02", 100.0),
            bar("FPT", "2024-01-03", 101.0),
            bar("FPT", "2024-01-04", 102.0),
        ])
        .unwrap();

        let trimmed = data.restrict(
            Some("2024-01-03".parse().unwrap()),
            Some("2024-01-03".parse().unwrap()),
        );
        assert_eq!(trimmed.calendar().len(), 1);
        assert_eq!(trimmed.bars_through("FPT", "2024-12-31".parse().unwrap()).len(), 1);
    }
}
