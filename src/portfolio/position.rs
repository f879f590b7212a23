use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

//represents an open long position in one ticker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub ticker: String,

    //shares held
    pub quantity: u64,

    //quantity-weighted average entry price
    pub avg_cost: f64,

    //date of the fill that opened the position
    pub entry_date: NaiveDate,
}

impl Position {
    pub fn new(ticker: String, quantity: u64, avg_cost: f64, entry_date: NaiveDate) -> Self {
        Position {
            ticker,
            quantity,
            avg_cost,
            entry_date,
        }
    }

    //blends a new buy into the average cost
    pub fn add(&mut self, quantity: u64, price: f64) {
        let total_qty = self.quantity + quantity;
        let total_cost = self.avg_cost * self.quantity as f64 + price * quantity as f64;
        self.avg_cost = total_cost / total_qty as f64;
        self.quantity = total_qty;
    }

    //unrealized pnl at a given market price
    pub fn unrealized_pnl(&self, current_price: f64) -> f64 {
        (current_price - self.avg_cost) * self.quantity as f64
    }

    //mark-to-market value of the position
    pub fn market_value(&self, current_price: f64) -> f64 {
        current_price * self.quantity as f64
    }
}

//a completed (fully or partially closed) round trip
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TradeRecord {
    pub ticker: String,
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub exit_date: NaiveDate,
    pub exit_price: f64,
    pub quantity: u64,
    pub pnl: f64,
    pub holding_days: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn add_blends_average_cost() {
        let mut position = Position::new("FPT".to_string(), 100, 50.0, date("2024-01-02"));
        position.add(100, 60.0);
        assert_eq!(position.quantity, 200);
        assert!((position.avg_cost - 55.0).abs() < 1e-12);
    }

    #[test]
    fn unrealized_pnl_tracks_price() {
        let position = Position::new("FPT".to_string(), 100, 50.0, date("2024-01-02"));
        assert!((position.unrealized_pnl(55.0) - 500.0).abs() < 1e-12);
        assert!((position.unrealized_pnl(45.0) + 500.0).abs() < 1e-12);
    }
}
