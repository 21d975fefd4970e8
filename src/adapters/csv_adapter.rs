//! CSV file data adapter.
//!
//! One file holds every instrument, one row per bar:
//! `symbol,date,open,high,low,close` (extra columns are ignored). Rows for
//! other symbols, rows missing a date, open or close, and rows that fail to
//! parse are skipped.

use crate::domain::error::SimError;
use crate::domain::news::NewsBook;
use crate::domain::ohlcv::Bar;
use crate::ports::data_port::SeriesSource;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize)]
struct PriceRow {
    symbol: Option<String>,
    date: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    open: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    high: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    low: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    close: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct NewsRow {
    date: Option<String>,
    message: Option<String>,
}

pub struct CsvAdapter {
    path: PathBuf,
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read a `date,message` file into a news book.
    pub fn load_news(path: &Path) -> Result<NewsBook, SimError> {
        let content = read(path)?;
        let mut rdr = reader(&content);
        let mut book = NewsBook::new();

        for (line, row) in rdr.deserialize::<NewsRow>().enumerate() {
            let parsed = row.ok().and_then(|r| {
                let date = parse_date(r.date.as_deref()?)?;
                let message = r.message.filter(|m| !m.trim().is_empty())?;
                Some((date, message))
            });
            match parsed {
                Some((date, message)) => book.insert(date, message),
                None => debug!(line = line + 2, path = %path.display(), "skipping news row"),
            }
        }

        Ok(book)
    }

    fn rows(&self) -> Result<Vec<PriceRow>, SimError> {
        let content = read(&self.path)?;
        let mut rdr = reader(&content);
        let mut rows = Vec::new();
        for (line, row) in rdr.deserialize::<PriceRow>().enumerate() {
            match row {
                Ok(r) => rows.push(r),
                Err(e) => debug!(line = line + 2, error = %e, "skipping unreadable row"),
            }
        }
        Ok(rows)
    }
}

impl SeriesSource for CsvAdapter {
    fn load_series(&self, symbol: &str) -> Result<Vec<Bar>, SimError> {
        let mut bars: Vec<Bar> = self
            .rows()?
            .into_iter()
            .filter(|r| r.symbol.as_deref().map(str::trim) == Some(symbol))
            .filter_map(|r| {
                let bar = to_bar(&r);
                if bar.is_none() {
                    debug!(symbol, date = ?r.date, "skipping incomplete row");
                }
                bar
            })
            .collect();

        bars.sort_by_key(|b| b.date);
        debug!(symbol, bars = bars.len(), "loaded series");
        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, SimError> {
        let symbols: BTreeSet<String> = self
            .rows()?
            .into_iter()
            .filter_map(|r| r.symbol)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        Ok(symbols.into_iter().collect())
    }
}

fn read(path: &Path) -> Result<String, SimError> {
    fs::read_to_string(path).map_err(|e| SimError::Data {
        reason: format!("failed to read {}: {}", path.display(), e),
    })
}

fn reader(content: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes())
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y/%m/%d"))
        .ok()
}

/// Zero open or close counts as missing. Absent high/low fall back to the
/// body of the candle.
fn to_bar(row: &PriceRow) -> Option<Bar> {
    let date = parse_date(row.date.as_deref()?)?;
    let open = row.open.filter(|v| *v != 0.0)?;
    let close = row.close.filter(|v| *v != 0.0)?;
    Some(Bar {
        date,
        open,
        high: row.high.unwrap_or(open.max(close)),
        low: row.low.unwrap_or(open.min(close)),
        close,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_data(content: &str) -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prices.csv");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    const PRICES: &str = "symbol,date,open,high,low,close,volume\n\
        TOYOTA,2023-08-02,2410.0,2430.0,2390.0,2420.0,100\n\
        TOYOTA,2023-08-01,2400.0,2420.0,2380.0,2405.0,100\n\
        SONY,2023-08-01,12000.0,12100.0,11900.0,12050.0,100\n\
        TOYOTA,2023-08-03,,2440.0,2400.0,2430.0,100\n\
        TOYOTA,not-a-date,2400.0,2420.0,2380.0,2405.0,100\n\
        TOYOTA,2023-08-04,2430.0,abc,2410.0,2425.0,100\n";

    #[test]
    fn load_series_filters_and_sorts() {
        let (_dir, path) = setup_test_data(PRICES);
        let adapter = CsvAdapter::new(path);
        let bars = adapter.load_series("TOYOTA").unwrap();

        let dates: Vec<String> = bars.iter().map(Bar::date_key).collect();
        assert_eq!(dates, vec!["2023-08-01", "2023-08-02", "2023-08-04"]);
        assert_eq!(bars[0].open, 2400.0);
        assert_eq!(bars[0].high, 2420.0);
        assert_eq!(bars[0].low, 2380.0);
        assert_eq!(bars[0].close, 2405.0);
    }

    #[test]
    fn unparseable_high_falls_back_to_body() {
        let (_dir, path) = setup_test_data(PRICES);
        let bars = CsvAdapter::new(path).load_series("TOYOTA").unwrap();
        let last = bars.last().unwrap();
        assert_eq!(last.high, 2430.0);
        assert_eq!(last.low, 2410.0);
    }

    #[test]
    fn missing_high_low_columns() {
        let (_dir, path) =
            setup_test_data("symbol,date,open,close\nX,2024-01-04,10.0,12.0\nX,2024-01-05,12.0,9.0\n");
        let bars = CsvAdapter::new(path).load_series("X").unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!((bars[0].low, bars[0].high), (10.0, 12.0));
        assert_eq!((bars[1].low, bars[1].high), (9.0, 12.0));
    }

    #[test]
    fn zero_close_is_skipped() {
        let (_dir, path) = setup_test_data("symbol,date,open,close\nX,2024-01-04,10.0,0\n");
        assert!(CsvAdapter::new(path).load_series("X").unwrap().is_empty());
    }

    #[test]
    fn short_rows_are_tolerated() {
        let (_dir, path) = setup_test_data(
            "symbol,date,open,high,low,close\nX,2024-01-04\nX,2024-01-05,1,2,0.5,1.5\n",
        );
        let bars = CsvAdapter::new(path).load_series("X").unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].date_key(), "2024-01-05");
    }

    #[test]
    fn unknown_symbol_is_empty() {
        let (_dir, path) = setup_test_data(PRICES);
        assert!(CsvAdapter::new(path).load_series("HONDA").unwrap().is_empty());
    }

    #[test]
    fn missing_file_is_data_error() {
        let adapter = CsvAdapter::new(PathBuf::from("/nonexistent/prices.csv"));
        let err = adapter.load_series("TOYOTA").unwrap_err();
        assert!(matches!(err, SimError::Data { .. }));
    }

    #[test]
    fn list_symbols_sorted_and_unique() {
        let (_dir, path) = setup_test_data(PRICES);
        let symbols = CsvAdapter::new(path).list_symbols().unwrap();
        assert_eq!(symbols, vec!["SONY".to_string(), "TOYOTA".to_string()]);
    }

    #[test]
    fn load_news_reads_quoted_messages() {
        let (_dir, path) = setup_test_data(
            "date,message\n\
             2023-08-01,\"Battery breakthrough, shares jump\"\n\
             2024-02-06,New model announced\n\
             bad-date,ignored\n\
             2024-03-01,\n",
        );
        let book = CsvAdapter::load_news(&path).unwrap();
        assert_eq!(book.len(), 2);
        assert_eq!(
            book.get(NaiveDate::from_ymd_opt(2023, 8, 1).unwrap()),
            Some("Battery breakthrough, shares jump")
        );
    }
}
