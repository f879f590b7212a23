use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

//a point in the equity curve, appended once per trading day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
    pub cash: f64,
    pub drawdown: f64,
    pub returns: f64,
}

impl EquityPoint {
    pub fn new(date: NaiveDate, equity: f64, cash: f64, drawdown: f64, returns: f64) -> Self {
        EquityPoint {
            date,
            equity,
            cash,
            drawdown,
            returns,
        }
    }
}

//calculates the equity curve with running-peak drawdowns and daily returns
pub fn calculate_equity_curve(
    dates: &[NaiveDate],
    equity_values: &[f64],
    cash_values: &[f64],
    initial_capital: f64,
) -> Vec<EquityPoint> {
    let mut curve = Vec::with_capacity(dates.len());
    let mut peak = initial_capital;
    let mut prev_equity = initial_capital;

    for (i, (&date, (&equity, &cash))) in dates
        .iter()
        .zip(equity_values.iter().zip(cash_values.iter()))
        .enumerate()
    {
        //update peak
        if equity > peak {
            peak = equity;
        }

        //calculate drawdown
        let drawdown = if peak > 0.0 { (peak - equity) / peak } else { 0.0 };

        //calculate returns
        let returns = if i == 0 {
            0.0
        } else {
            (equity - prev_equity) / prev_equity
        };

        curve.push(EquityPoint::new(date, equity, cash, drawdown, returns));
        prev_equity = equity;
    }

    curve
}

//calculates maximum drawdown from equity curve
pub fn max_drawdown(equity_curve: &[EquityPoint]) -> f64 {
    equity_curve
        .iter()
        .map(|point| point.drawdown)
        .fold(0.0, f64::max)
}

//calculates daily returns from equity values
pub fn calculate_returns(equity_values: &[f64]) -> Vec<f64> {
    if equity_values.len() < 2 {
        return vec![];
    }

    let mut returns = Vec::with_capacity(equity_values.len() - 1);
    for i in 1..equity_values.len() {
        let ret = (equity_values[i] - equity_values[i - 1]) / equity_values[i - 1];
        returns.push(ret);
    }
    returns
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dates(n: usize) -> Vec<NaiveDate> {
        let start: NaiveDate = "2024-01-01".parse().unwrap();
        (0..n)
            .map(|i| start + chrono::Days::new(i as u64))
            .collect()
    }

    #[test]
    fn drawdown_tracks_running_peak() {
        let equity = vec![100.0, 120.0, 90.0, 110.0];
        let cash = vec![0.0; 4];
        let curve = calculate_equity_curve(&dates(4), &equity, &cash, 100.0);

        assert_eq!(curve[0].drawdown, 0.0);
        assert_eq!(curve[1].drawdown, 0.0);
        assert!((curve[2].drawdown - 0.25).abs() < 1e-12);
        assert!((max_drawdown(&curve) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn returns_are_consecutive_ratios() {
        let equity = vec![100.0, 110.0, 99.0];
        let cash = vec![0.0; 3];
        let curve = calculate_equity_curve(&dates(3), &equity, &cash, 100.0);

        assert_eq!(curve[0].returns, 0.0);
        assert!((curve[1].returns - 0.1).abs() < 1e-12);
        assert!((curve[2].returns + 0.1).abs() < 1e-12);

        let returns = calculate_returns(&equity);
        assert_eq!(returns.len(), 2);
    }

    #[test]
    fn short_series_yields_no_returns() {
        assert!(calculate_returns(&[100.0]).is_empty());
        assert!(calculate_returns(&[]).is_empty());
    }
}
