//! Daily OHLC bar representation.

use chrono::NaiveDate;

/// One trading day. Immutable once loaded; series are ordered by date.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Bar {
    /// Unix timestamp (seconds) of UTC midnight on the bar's date.
    pub fn time(&self) -> i64 {
        date_to_time(self.date)
    }

    /// `YYYY-MM-DD`, the key used by the news book.
    pub fn date_key(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

pub fn date_to_time(date: NaiveDate) -> i64 {
    date.and_time(chrono::NaiveTime::MIN).and_utc().timestamp()
}
