use crate::metrics::timeseries::{calculate_returns, max_drawdown, EquityPoint};
use crate::portfolio::TradeRecord;
use prettytable::{Cell, Row, Table};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

//summary metrics for a backtest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryMetrics {
    pub initial_capital: f64,
    pub final_value: f64,
    pub total_return: f64,
    pub cagr: f64,
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub total_trades: usize,
    pub num_winning_trades: usize,
    pub num_losing_trades: usize,
    pub win_rate: f64,
    pub avg_pnl: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    pub profit_factor: f64,
}

impl SummaryMetrics {
    //calculate summary metrics from equity curve and trade log
    pub fn from_backtest(
        equity_curve: &[EquityPoint],
        trades: &[TradeRecord],
        initial_capital: f64,
    ) -> Self {
        let final_value = equity_curve
            .last()
            .map(|p| p.equity)
            .unwrap_or(initial_capital);

        let total_return = final_value / initial_capital - 1.0;

        //calculate cagr
        let cagr = if equity_curve.len() >= 2 {
            let start = equity_curve.first().map(|p| p.date);
            let end = equity_curve.last().map(|p| p.date);
            match (start, end) {
                (Some(start), Some(end)) => {
                    let years = (end - start).num_days() as f64 / 365.25;
                    if years > 0.0 && final_value > 0.0 {
                        (final_value / initial_capital).powf(1.0 / years) - 1.0
                    } else {
                        0.0
                    }
                }
                _ => 0.0,
            }
        } else {
            0.0
        };

        //max drawdown
        let max_dd = max_drawdown(equity_curve);

        //daily returns for sharpe and sortino
        let equity_values: Vec<f64> = equity_curve.iter().map(|p| p.equity).collect();
        let returns = calculate_returns(&equity_values);

        let sharpe = calculate_sharpe_ratio(&returns);
        let sortino = calculate_sortino_ratio(&returns);

        let trade_stats = calculate_trade_statistics(trades);

        SummaryMetrics {
            initial_capital,
            final_value,
            total_return,
            cagr,
            max_drawdown: max_dd,
            sharpe_ratio: sharpe,
            sortino_ratio: sortino,
            total_trades: trade_stats.total_trades,
            num_winning_trades: trade_stats.num_winning_trades,
            num_losing_trades: trade_stats.num_losing_trades,
            win_rate: trade_stats.win_rate,
            avg_pnl: trade_stats.avg_pnl,
            avg_win: trade_stats.avg_win,
            avg_loss: trade_stats.avg_loss,
            largest_win: trade_stats.largest_win,
            largest_loss: trade_stats.largest_loss,
            profit_factor: trade_stats.profit_factor,
        }
    }

    //prints metrics in a formatted table
    pub fn pretty_print_table(&self) {
        let mut table = Table::new();

        table.add_row(Row::new(vec![Cell::new("Metric"), Cell::new("Value")]));

        table.add_row(Row::new(vec![
            Cell::new("Initial Capital"),
            Cell::new(&format!("{:.2}", self.initial_capital)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Final Value"),
            Cell::new(&format!("{:.2}", self.final_value)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Total Return"),
            Cell::new(&format!("{:.2}%", self.total_return * 100.0)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("CAGR"),
            Cell::new(&format!("{:.2}%", self.cagr * 100.0)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Max Drawdown"),
            Cell::new(&format!("{:.2}%", self.max_drawdown * 100.0)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Sharpe Ratio"),
            Cell::new(&format!("{:.3}", self.sharpe_ratio)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Sortino Ratio"),
            Cell::new(&format!("{:.3}", self.sortino_ratio)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Total Trades"),
            Cell::new(&format!("{}", self.total_trades)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Win Rate"),
            Cell::new(&format!("{:.2}%", self.win_rate * 100.0)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Avg PnL"),
            Cell::new(&format!("{:.2}", self.avg_pnl)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Avg Win"),
            Cell::new(&format!("{:.2}", self.avg_win)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Avg Loss"),
            Cell::new(&format!("{:.2}", self.avg_loss)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Largest Win"),
            Cell::new(&format!("{:.2}", self.largest_win)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Largest Loss"),
            Cell::new(&format!("{:.2}", self.largest_loss)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Profit Factor"),
            Cell::new(&format!("{:.3}", self.profit_factor)),
        ]));

        table.printstd();
    }
}

struct TradeStats {
    total_trades: usize,
    num_winning_trades: usize,
    num_losing_trades: usize,
    win_rate: f64,
    avg_pnl: f64,
    avg_win: f64,
    avg_loss: f64,
    profit_factor: f64,
    largest_win: f64,
    largest_loss: f64,
}

fn calculate_trade_statistics(trades: &[TradeRecord]) -> TradeStats {
    if trades.is_empty() {
        return TradeStats {
            total_trades: 0,
            num_winning_trades: 0,
            num_losing_trades: 0,
            win_rate: 0.0,
            avg_pnl: 0.0,
            avg_win: 0.0,
            avg_loss: 0.0,
            profit_factor: 0.0,
            largest_win: 0.0,
            largest_loss: 0.0,
        };
    }

    let pnls: Vec<f64> = trades.iter().map(|t| t.pnl).collect();
    let winning: Vec<f64> = pnls.iter().filter(|&&p| p > 0.0).copied().collect();
    let losing: Vec<f64> = pnls.iter().filter(|&&p| p < 0.0).copied().collect();

    let total = pnls.len();
    let num_winning = winning.len();
    let num_losing = losing.len();

    let win_rate = num_winning as f64 / total as f64;
    let avg_pnl = pnls.iter().sum::<f64>() / total as f64;

    let avg_win = if num_winning > 0 {
        winning.iter().sum::<f64>() / num_winning as f64
    } else {
        0.0
    };

    let avg_loss = if num_losing > 0 {
        losing.iter().sum::<f64>() / num_losing as f64
    } else {
        0.0
    };

    let total_wins: f64 = winning.iter().sum();
    let total_losses: f64 = losing.iter().sum::<f64>().abs();

    //explicit sentinel on a zero denominator: infinite with wins and no
    //losses, zero when there is nothing on either side
    let profit_factor = if total_losses > 0.0 {
        total_wins / total_losses
    } else if total_wins > 0.0 {
        f64::INFINITY
    } else {
        0.0
    };

    let largest_win = winning.iter().fold(0.0f64, |a, &b| a.max(b));
    let largest_loss = losing.iter().fold(0.0f64, |a, &b| a.min(b));

    TradeStats {
        total_trades: total,
        num_winning_trades: num_winning,
        num_losing_trades: num_losing,
        win_rate,
        avg_pnl,
        avg_win,
        avg_loss,
        profit_factor,
        largest_win,
        largest_loss,
    }
}

fn calculate_sharpe_ratio(returns: &[f64]) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }

    let mean = returns.mean();
    let std_dev = returns.std_dev();

    if std_dev == 0.0 || !std_dev.is_finite() {
        return 0.0;
    }

    //annualize assuming daily returns over 252 trading days
    (mean / std_dev) * (252.0_f64).sqrt()
}

fn calculate_sortino_ratio(returns: &[f64]) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }

    let mean = returns.mean();

    //downside deviation over negative returns only; without at least two
    //of them the deviation is undefined and the ratio reports zero
    let negative_returns: Vec<f64> = returns.iter().filter(|&&r| r < 0.0).copied().collect();

    if negative_returns.len() < 2 {
        return 0.0;
    }

    let downside_dev = negative_returns.std_dev();

    if downside_dev == 0.0 || !downside_dev.is_finite() {
        return 0.0;
    }

    //annualize
    (mean / downside_dev) * (252.0_f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::timeseries::calculate_equity_curve;
    use chrono::NaiveDate;

    fn curve_from(equity: &[f64]) -> Vec<EquityPoint> {
        let start: NaiveDate = "2024-01-01".parse().unwrap();
        let dates: Vec<NaiveDate> = (0..equity.len())
            .map(|i| start + chrono::Days::new(i as u64))
            .collect();
        let cash = vec![0.0; equity.len()];
        calculate_equity_curve(&dates, equity, &cash, equity[0])
    }

    fn trade(pnl: f64) -> TradeRecord {
        TradeRecord {
            ticker: "FPT".to_string(),
            entry_date: "2024-01-02".parse().unwrap(),
            entry_price: 100.0,
            exit_date: "2024-02-02".parse().unwrap(),
            exit_price: 100.0 + pnl / 10.0,
            quantity: 10,
            pnl,
            holding_days: 31,
        }
    }

    #[test]
    fn zero_trades_report_sentinels_not_panics() {
        let curve = curve_from(&[100.0, 100.0, 100.0]);
        let summary = SummaryMetrics::from_backtest(&curve, &[], 100.0);

        assert_eq!(summary.total_trades, 0);
        assert_eq!(summary.win_rate, 0.0);
        assert_eq!(summary.profit_factor, 0.0);
        assert_eq!(summary.avg_pnl, 0.0);
        assert_eq!(summary.sharpe_ratio, 0.0);
        assert_eq!(summary.sortino_ratio, 0.0);
    }

    #[test]
    fn flat_equity_has_zero_sharpe_not_nan() {
        let curve = curve_from(&[100.0, 100.0, 100.0, 100.0]);
        let summary = SummaryMetrics::from_backtest(&curve, &[], 100.0);
        assert_eq!(summary.sharpe_ratio, 0.0);
        assert!(!summary.sharpe_ratio.is_nan());
    }

    #[test]
    fn sortino_is_zero_without_negative_returns() {
        let curve = curve_from(&[100.0, 101.0, 102.0, 103.0]);
        let summary = SummaryMetrics::from_backtest(&curve, &[], 100.0);
        assert_eq!(summary.sortino_ratio, 0.0);
    }

    #[test]
    fn trade_statistics_split_wins_and_losses() {
        let curve = curve_from(&[100.0, 105.0, 103.0]);
        let trades = vec![trade(500.0), trade(-200.0), trade(300.0)];
        let summary = SummaryMetrics::from_backtest(&curve, &trades, 100.0);

        assert_eq!(summary.total_trades, 3);
        assert_eq!(summary.num_winning_trades, 2);
        assert_eq!(summary.num_losing_trades, 1);
        assert!((summary.win_rate - 2.0 / 3.0).abs() < 1e-12);
        assert!((summary.avg_pnl - 200.0).abs() < 1e-12);
        assert!((summary.profit_factor - 4.0).abs() < 1e-12);
        assert_eq!(summary.largest_win, 500.0);
        assert_eq!(summary.largest_loss, -200.0);
    }

    #[test]
    fn all_winning_trades_report_infinite_profit_factor() {
        let curve = curve_from(&[100.0, 105.0]);
        let trades = vec![trade(500.0), trade(300.0)];
        let summary = SummaryMetrics::from_backtest(&curve, &trades, 100.0);
        assert!(summary.profit_factor.is_infinite());
    }

    #[test]
    fn total_return_is_final_over_initial() {
        let curve = curve_from(&[100.0, 110.0, 120.0]);
        let summary = SummaryMetrics::from_backtest(&curve, &[], 100.0);
        assert!((summary.total_return - 0.2).abs() < 1e-12);
    }
}
