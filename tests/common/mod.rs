#![allow(dead_code)]

use chrono::NaiveDate;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use stocksim::domain::arcade::GameState;
use stocksim::domain::error::SimError;
use stocksim::domain::market::{MarketFrame, Notice};
pub use stocksim::domain::ohlcv::Bar;
use stocksim::ports::data_port::SeriesSource;
use stocksim::ports::display_port::Display;
use tempfile::TempDir;

pub struct MockSeriesSource {
    pub data: HashMap<String, Vec<Bar>>,
    pub errors: HashMap<String, String>,
}

impl MockSeriesSource {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<Bar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl SeriesSource for MockSeriesSource {
    fn load_series(&self, symbol: &str) -> Result<Vec<Bar>, SimError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(SimError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(symbol).cloned().unwrap_or_default())
    }

    fn list_symbols(&self) -> Result<Vec<String>, SimError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

/// Display that keeps everything it is shown.
#[derive(Default)]
pub struct RecordingDisplay {
    pub frames: Vec<FrameRecord>,
    pub notices: Vec<Notice>,
    pub arcade_frames: Vec<(u64, u32)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameRecord {
    pub symbol: String,
    pub index: usize,
    pub running: bool,
    pub price: f64,
    pub shares: u64,
}

impl Display for RecordingDisplay {
    fn market_frame(&mut self, frame: &MarketFrame<'_>) -> Result<(), SimError> {
        self.frames.push(FrameRecord {
            symbol: frame.symbol.to_string(),
            index: frame.index,
            running: frame.running,
            price: frame.price,
            shares: frame.portfolio.shares,
        });
        Ok(())
    }

    fn notice(&mut self, notice: &Notice) -> Result<(), SimError> {
        self.notices.push(notice.clone());
        Ok(())
    }

    fn arcade_frame(&mut self, state: &GameState) -> Result<(), SimError> {
        self.arcade_frames.push((state.ticks, state.score));
        Ok(())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(date: NaiveDate, close: f64) -> Bar {
    Bar {
        date,
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
    }
}

/// Daily bars from `start` with the given closes.
pub fn bars_from(start: NaiveDate, closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| make_bar(start + chrono::Duration::days(i as i64), close))
        .collect()
}

/// Falls from 130 to 101 over 30 bars, then climbs by 3 a bar for 30 more.
pub fn valley_closes() -> Vec<f64> {
    let mut closes: Vec<f64> = (0..30).map(|i| 130.0 - i as f64).collect();
    closes.extend((0..30).map(|i| 101.0 + 3.0 * (i + 1) as f64));
    closes
}

pub fn valley_bars() -> Vec<Bar> {
    bars_from(date(2024, 1, 1), &valley_closes())
}

/// Data file, news file and INI written into a temporary directory.
pub struct Fixture {
    pub dir: TempDir,
    pub config_path: PathBuf,
}

pub fn prices_csv(symbols: &[(&str, Vec<Bar>)]) -> String {
    let mut out = String::from("symbol,date,open,high,low,close,volume\n");
    for (symbol, bars) in symbols {
        for b in bars {
            out.push_str(&format!(
                "{},{},{},{},{},{},1000\n",
                symbol,
                b.date_key(),
                b.open,
                b.high,
                b.low,
                b.close
            ));
        }
    }
    out
}

pub fn write_fixture(prices: &str, news: &str, ini: &str) -> Fixture {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("prices.csv"), prices).unwrap();
    fs::write(dir.path().join("news.csv"), news).unwrap();
    let config_path = dir.path().join("stocksim.ini");
    fs::write(&config_path, ini).unwrap();
    Fixture { dir, config_path }
}
