use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use dalat::prelude::*;
use prettytable::{Cell, Row, Table};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dalat")]
#[command(about = "An event-driven backtesting engine for daily equity bars", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    //run a single backtest
    Run {
        //path to csv data file (ticker,date,open,high,low,close,volume)
        #[arg(long)]
        data: PathBuf,

        //strategy type (ma, momentum, meanrev, bah)
        #[arg(long)]
        strategy: String,

        //comma-separated ticker filter (default: all tickers in the file)
        #[arg(long)]
        tickers: Option<String>,

        //start of the simulated date range (yyyy-mm-dd)
        #[arg(long)]
        start: Option<NaiveDate>,

        //end of the simulated date range (yyyy-mm-dd)
        #[arg(long)]
        end: Option<NaiveDate>,

        //initial account capital
        #[arg(long, default_value = "100000000")]
        initial_capital: f64,

        //commission rate as a fraction of notional
        #[arg(long, default_value = "0.0015")]
        commission: f64,

        //disable the market-impact slippage model
        #[arg(long)]
        no_slippage: bool,

        //disable liquidity/concentration position sizing
        #[arg(long)]
        no_sizing: bool,

        //market impact coefficient for the slippage model
        #[arg(long, default_value = "0.1")]
        impact_coefficient: f64,

        //volume cap as a fraction of daily volume
        #[arg(long, default_value = "0.05")]
        max_pct_volume: f64,

        //capital cap as a fraction of available cash
        #[arg(long, default_value = "0.2")]
        max_pct_capital: f64,

        //ma strategy parameters
        //short moving-average window
        #[arg(long)]
        short: Option<usize>,

        //long moving-average window
        #[arg(long)]
        long: Option<usize>,

        //momentum strategy parameters
        //momentum lookback period
        #[arg(long)]
        lookback: Option<usize>,

        //number of top tickers to hold
        #[arg(long)]
        top_n: Option<usize>,

        //mean reversion strategy parameters
        //rolling window for the bands
        #[arg(long)]
        window: Option<usize>,

        //band width in standard deviations
        #[arg(long)]
        num_std: Option<f64>,

        //output options
        //output path for equity curve csv
        #[arg(long)]
        output_equity_csv: Option<PathBuf>,

        //output path for trades csv
        #[arg(long)]
        output_trades_csv: Option<PathBuf>,

        //output path for the full result as json
        #[arg(long)]
        output_json: Option<PathBuf>,
    },

    //grid-search ma crossover windows in parallel
    Sweep {
        //path to csv data file
        #[arg(long)]
        data: PathBuf,

        //comma-separated short windows, eg 5,10,20
        #[arg(long, default_value = "5,10,20")]
        short_windows: String,

        //comma-separated long windows, eg 50,100
        #[arg(long, default_value = "50,100")]
        long_windows: String,

        //start of the simulated date range (yyyy-mm-dd)
        #[arg(long)]
        start: Option<NaiveDate>,

        //end of the simulated date range (yyyy-mm-dd)
        #[arg(long)]
        end: Option<NaiveDate>,

        //initial account capital
        #[arg(long, default_value = "100000000")]
        initial_capital: f64,

        //commission rate as a fraction of notional
        #[arg(long, default_value = "0.0015")]
        commission: f64,

        //disable the market-impact slippage model
        #[arg(long)]
        no_slippage: bool,

        //disable liquidity/concentration position sizing
        #[arg(long)]
        no_sizing: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            data,
            strategy,
            tickers,
            start,
            end,
            initial_capital,
            commission,
            no_slippage,
            no_sizing,
            impact_coefficient,
            max_pct_volume,
            max_pct_capital,
            short,
            long,
            lookback,
            top_n,
            window,
            num_std,
            output_equity_csv,
            output_trades_csv,
            output_json,
        } => {
            let config = BacktestConfig {
                initial_capital,
                commission_rate: commission,
                use_slippage: !no_slippage,
                use_dynamic_sizing: !no_sizing,
                impact_coefficient,
                max_pct_of_volume: max_pct_volume,
                max_pct_of_capital: max_pct_capital,
                start_date: start,
                end_date: end,
            };

            let params = build_strategy_params(&strategy, short, long, lookback, top_n, window, num_std)?;

            run_backtest(
                data,
                tickers,
                config,
                params,
                output_equity_csv,
                output_trades_csv,
                output_json,
            )?;
        }
        Commands::Sweep {
            data,
            short_windows,
            long_windows,
            start,
            end,
            initial_capital,
            commission,
            no_slippage,
            no_sizing,
        } => {
            let config = BacktestConfig {
                initial_capital,
                commission_rate: commission,
                use_slippage: !no_slippage,
                use_dynamic_sizing: !no_sizing,
                start_date: start,
                end_date: end,
                ..Default::default()
            };

            run_sweep(data, config, &short_windows, &long_windows)?;
        }
    }

    Ok(())
}

fn build_strategy_params(
    name: &str,
    short: Option<usize>,
    long: Option<usize>,
    lookback: Option<usize>,
    top_n: Option<usize>,
    window: Option<usize>,
    num_std: Option<f64>,
) -> Result<StrategyParams> {
    let strategy_type = StrategyType::parse(name)
        .ok_or_else(|| anyhow::anyhow!("Unknown strategy: {}", name))?;

    Ok(match strategy_type {
        StrategyType::MaCrossover => {
            let defaults = MaParams::default();
            StrategyParams::Ma(MaParams {
                short_window: short.unwrap_or(defaults.short_window),
                long_window: long.unwrap_or(defaults.long_window),
            })
        }
        StrategyType::Momentum => {
            let defaults = MomentumParams::default();
            StrategyParams::Momentum(MomentumParams {
                lookback: lookback.unwrap_or(defaults.lookback),
                top_n: top_n.unwrap_or(defaults.top_n),
            })
        }
        StrategyType::MeanReversion => {
            let defaults = MeanReversionParams::default();
            StrategyParams::MeanReversion(MeanReversionParams {
                window: window.unwrap_or(defaults.window),
                num_std: num_std.unwrap_or(defaults.num_std),
            })
        }
        StrategyType::BuyAndHold => StrategyParams::BuyAndHold,
    })
}

fn load_market_data(data_path: &PathBuf, tickers: Option<&str>) -> Result<MarketData> {
    println!("Loading data from {:?}...", data_path);
    let mut bars =
        load_csv(data_path).context(format!("Failed to load data from {:?}", data_path))?;

    if let Some(tickers) = tickers {
        let wanted: Vec<&str> = tickers.split(',').map(|t| t.trim()).collect();
        bars.retain(|bar| wanted.contains(&bar.ticker.as_str()));
    }

    if bars.is_empty() {
        anyhow::bail!("No bars left after filtering");
    }

    println!("Loaded {} bars", bars.len());

    let data = MarketData::from_bars(bars)?;
    println!(
        "Date range: {} to {} ({} trading days)\n",
        data.calendar().first().unwrap(),
        data.calendar().last().unwrap(),
        data.calendar().len()
    );

    Ok(data)
}

fn run_backtest(
    data_path: PathBuf,
    tickers: Option<String>,
    config: BacktestConfig,
    params: StrategyParams,
    output_equity_csv: Option<PathBuf>,
    output_trades_csv: Option<PathBuf>,
    output_json: Option<PathBuf>,
) -> Result<()> {
    println!("Dalat Backtesting Engine");
    println!("========================\n");

    let data = load_market_data(&data_path, tickers.as_deref())?;

    let strategy = params.build()?;
    println!("Strategy: {}", strategy.name());
    println!("Initial capital: {:.2}", config.initial_capital);
    println!("Commission rate: {:.4}", config.commission_rate);
    println!(
        "Slippage: {}, dynamic sizing: {}\n",
        config.use_slippage, config.use_dynamic_sizing
    );

    println!("Running backtest...\n");
    let mut engine = BacktestEngine::new(config, &data)?;
    let result = engine.run(strategy.as_ref());

    println!("Backtest Results");
    println!("================\n");
    result.summary.pretty_print_table();

    if !result.completed {
        println!("\nNote: run was aborted; results cover a partial range.");
    }

    if let Some(equity_path) = output_equity_csv {
        save_equity_csv(&result.equity_curve, &equity_path)?;
        println!("\nEquity curve saved to {:?}", equity_path);
    }

    if let Some(trades_path) = output_trades_csv {
        save_trades_csv(&result.trades, &trades_path)?;
        println!("Trades saved to {:?}", trades_path);
    }

    if let Some(json_path) = output_json {
        std::fs::write(&json_path, serde_json::to_string_pretty(&result)?)?;
        println!("Full result saved to {:?}", json_path);
    }

    Ok(())
}

fn run_sweep(
    data_path: PathBuf,
    config: BacktestConfig,
    short_windows: &str,
    long_windows: &str,
) -> Result<()> {
    println!("Dalat Backtesting Engine: MA sweep");
    println!("==================================\n");

    let data = load_market_data(&data_path, None)?;

    let shorts = parse_window_list(short_windows)?;
    let longs = parse_window_list(long_windows)?;

    let mut specs = Vec::new();
    for &short in &shorts {
        for &long in &longs {
            if short >= long {
                continue;
            }
            specs.push(RunSpec {
                label: format!("ma {}x{}", short, long),
                config: config.clone(),
                strategy: StrategyParams::Ma(MaParams {
                    short_window: short,
                    long_window: long,
                })
                .build()?,
            });
        }
    }

    if specs.is_empty() {
        anyhow::bail!("No valid short/long window combinations");
    }

    println!("Running {} backtests...\n", specs.len());
    let mut results: Vec<(String, BacktestResult)> = run_batch(&data, specs)
        .into_iter()
        .map(|(label, result)| result.map(|r| (label, r)))
        .collect::<Result<_, _>>()?;

    //leaderboard, best return first
    results.sort_by(|a, b| {
        b.1.total_return
            .partial_cmp(&a.1.total_return)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("Strategy"),
        Cell::new("Total Return"),
        Cell::new("Sharpe"),
        Cell::new("Max DD"),
        Cell::new("Trades"),
    ]));

    for (label, result) in &results {
        table.add_row(Row::new(vec![
            Cell::new(label),
            Cell::new(&format!("{:.2}%", result.total_return * 100.0)),
            Cell::new(&format!("{:.3}", result.summary.sharpe_ratio)),
            Cell::new(&format!("{:.2}%", result.summary.max_drawdown * 100.0)),
            Cell::new(&format!("{}", result.summary.total_trades)),
        ]));
    }

    table.printstd();
    Ok(())
}

fn parse_window_list(s: &str) -> Result<Vec<usize>> {
    s.split(',')
        .map(|w| {
            w.trim()
                .parse::<usize>()
                .context(format!("Invalid window value '{}'", w))
        })
        .collect()
}

fn save_equity_csv(equity_curve: &[EquityPoint], path: &PathBuf) -> Result<()> {
    use std::io::Write;

    let mut file = std::fs::File::create(path)?;
    writeln!(file, "date,equity,cash,drawdown,returns")?;

    for point in equity_curve {
        writeln!(
            file,
            "{},{},{},{},{}",
            point.date, point.equity, point.cash, point.drawdown, point.returns
        )?;
    }

    Ok(())
}

fn save_trades_csv(trades: &[TradeRecord], path: &PathBuf) -> Result<()> {
    use std::io::Write;

    let mut file = std::fs::File::create(path)?;
    writeln!(
        file,
        "ticker,entry_date,entry_price,exit_date,exit_price,quantity,pnl,holding_days"
    )?;

    for trade in trades {
        writeln!(
            file,
            "{},{},{},{},{},{},{},{}",
            trade.ticker,
            trade.entry_date,
            trade.entry_price,
            trade.exit_date,
            trade.exit_price,
            trade.quantity,
            trade.pnl,
            trade.holding_days
        )?;
    }

    Ok(())
}
