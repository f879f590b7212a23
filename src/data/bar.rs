use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BarError {
    #[error("Invalid OHLC values: high ({high}) < low ({low})")]
    InvalidHighLow { high: f64, low: f64 },
    #[error("Invalid OHLC values: close ({close}) outside high-low range [{low}, {high}]")]
    InvalidClose { close: f64, high: f64, low: f64 },
    #[error("Invalid OHLC values: open ({open}) outside high-low range [{low}, {high}]")]
    InvalidOpen { open: f64, high: f64, low: f64 },
    #[error("Non-positive price: {0}")]
    NonPositivePrice(f64),
    #[error("Negative volume: {0}")]
    NegativeVolume(f64),
}

//represents a single ohlcv bar of daily market data for one ticker
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bar {
    pub date: NaiveDate,
    pub ticker: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    //creates a new Bar with validation
    pub fn new(
        date: NaiveDate,
        ticker: String,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Result<Self, BarError> {
        //validate high >= low
        if high < low {
            return Err(BarError::InvalidHighLow { high, low });
        }

        //validate close within [low, high]
        if close < low || close > high {
            return Err(BarError::InvalidClose { close, high, low });
        }

        //validate open within [low, high]
        if open < low || open > high {
            return Err(BarError::InvalidOpen { open, high, low });
        }

        //validate positive prices
        if low <= 0.0 {
            return Err(BarError::NonPositivePrice(low));
        }

        //validate non-negative volume
        if volume < 0.0 {
            return Err(BarError::NegativeVolume(volume));
        }

        Ok(Bar {
            date,
            ticker,
            open,
            high,
            low,
            close,
            volume,
        })
    }

    //creates a Bar without validation
    pub fn new_unchecked(
        date: NaiveDate,
        ticker: String,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Bar {
            date,
            ticker,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    //returns the typical price (HLC/3)
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    //returns the range (high - low)
    pub fn range(&self) -> f64 {
        self.high - self.low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn valid_bar_passes_validation() {
        let bar = Bar::new(
            date("2024-01-02"),
            "VNM".to_string(),
            100.0,
            105.0,
            99.0,
            104.0,
            1_000_000.0,
        );
        assert!(bar.is_ok());
    }

    #[test]
    fn high_below_low_is_rejected() {
        let bar = Bar::new(
            date("2024-01-02"),
            "VNM".to_string(),
            100.0,
            98.0,
            99.0,
            98.5,
            1_000.0,
        );
        assert!(matches!(bar, Err(BarError::InvalidHighLow { .. })));
    }

    #[test]
    fn close_outside_range_is_rejected() {
        let bar = Bar::new(
            date("2024-01-02"),
            "VNM".to_string(),
            100.0,
            105.0,
            99.0,
            110.0,
            1_000.0,
        );
        assert!(matches!(bar, Err(BarError::InvalidClose { .. })));
    }

    #[test]
    fn negative_volume_is_rejected() {
        let bar = Bar::new(
            date("2024-01-02"),
            "VNM".to_string(),
            100.0,
            105.0,
            99.0,
            104.0,
            -5.0,
        );
        assert!(matches!(bar, Err(BarError::NegativeVolume(_))));
    }
}
