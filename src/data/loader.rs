use crate::data::bar::Bar;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use csv::ReaderBuilder;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct CsvRecord {
    ticker: String,
    date: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

//loads bars from a csv file with columns ticker,date,open,high,low,close,volume
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Bar>> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .context(format!("Failed to open CSV file: {:?}", path))?;

    let mut bars = Vec::new();

    for (index, result) in reader.deserialize().enumerate() {
        let record: CsvRecord =
            result.context(format!("Failed to parse CSV record at line {}", index + 2))?;

        //parse date (yyyy-mm-dd)
        let date = NaiveDate::parse_from_str(&record.date, "%Y-%m-%d").context(format!(
            "Failed to parse date '{}' at line {}",
            record.date,
            index + 2
        ))?;

        let bar = Bar::new(
            date,
            record.ticker,
            record.open,
            record.high,
            record.low,
            record.close,
            record.volume,
        )
        .context(format!("Invalid bar at line {}", index + 2))?;

        bars.push(bar);
    }

    //sort by date to ensure chronological order
    bars.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.ticker.cmp(&b.ticker)));

    Ok(bars)
}

//filters bars by ticker
pub fn filter_by_ticker(bars: &[Bar], ticker: &str) -> Vec<Bar> {
    bars.iter()
        .filter(|bar| bar.ticker == ticker)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_and_sorts_csv() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "ticker,date,open,high,low,close,volume").unwrap();
        writeln!(file, "FPT,2024-01-03,100,101,99,100.5,2000000").unwrap();
        writeln!(file, "FPT,2024-01-02,99,100,98,99.5,1500000").unwrap();
        writeln!(file, "VNM,2024-01-02,70,71,69,70.5,900000").unwrap();

        let bars = load_csv(file.path()).unwrap();
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].date.to_string(), "2024-01-02");
        assert_eq!(bars[0].ticker, "FPT");
        assert_eq!(bars[1].ticker, "VNM");
        assert_eq!(bars[2].date.to_string(), "2024-01-03");
    }

    #[test]
    fn bad_date_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "ticker,date,open,high,low,close,volume").unwrap();
        writeln!(file, "FPT,03/01/2024,100,101,99,100.5,2000000").unwrap();

        assert!(load_csv(file.path()).is_err());
    }

    #[test]
    fn filter_keeps_only_requested_ticker() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "ticker,date,open,high,low,close,volume").unwrap();
        writeln!(file, "FPT,2024-01-02,100,101,99,100.5,2000000").unwrap();
        writeln!(file, "VNM,2024-01-02,70,71,69,70.5,900000").unwrap();

        let bars = load_csv(file.path()).unwrap();
        let fpt = filter_by_ticker(&bars, "FPT");
        assert_eq!(fpt.len(), 1);
        assert_eq!(fpt[0].ticker, "FPT");
    }
}
