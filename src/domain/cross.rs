//! Moving-average cross detection.
//!
//! Compares a short and a long SMA over the closing prices. For each pair of
//! adjacent bars where both averages are valid, `d = short - long` moving from
//! `<= 0` to `> 0` is a golden cross and from `>= 0` to `< 0` a dead cross.
//! A spread that sits at zero on both bars is not a cross.
//! Fewer bars than the long period yields no events.

use std::fmt;

use crate::domain::indicator::sma::calculate_sma;
use crate::domain::ohlcv::Bar;

pub const SHORT_PERIOD: usize = 5;
pub const LONG_PERIOD: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrossKind {
    Golden,
    Dead,
}

impl fmt::Display for CrossKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrossKind::Golden => write!(f, "golden cross"),
            CrossKind::Dead => write!(f, "dead cross"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CrossEvent {
    pub time: i64,
    pub price: f64,
    pub kind: CrossKind,
    pub message: String,
}

pub fn detect_crosses(bars: &[Bar], short: usize, long: usize) -> Vec<CrossEvent> {
    if short == 0 || long == 0 || bars.len() < long.max(short) {
        return Vec::new();
    }

    let short_sma = calculate_sma(bars, short);
    let long_sma = calculate_sma(bars, long);
    let mut events = Vec::new();
    let mut prev: Option<f64> = None;

    for i in 0..bars.len() {
        let (Some(s), Some(l)) = (short_sma.value_at(i), long_sma.value_at(i)) else {
            continue;
        };
        let d = s - l;
        let kind = match prev.replace(d) {
            Some(p) if p <= 0.0 && d > 0.0 => CrossKind::Golden,
            Some(p) if p >= 0.0 && d < 0.0 => CrossKind::Dead,
            _ => continue,
        };

        let bar = &bars[i];
        let direction = match kind {
            CrossKind::Golden => "above",
            CrossKind::Dead => "below",
        };
        events.push(CrossEvent {
            time: bar.time(),
            price: bar.close,
            kind,
            message: format!(
                "{} on {}: SMA({}) crossed {} SMA({}) at {:.2}",
                capitalize(&kind.to_string()),
                bar.date_key(),
                short,
                direction,
                long,
                bar.close
            ),
        });
    }

    events
}

/// The most recent event at or before `time`. `events` must be chronological.
pub fn latest_at(events: &[CrossEvent], time: i64) -> Option<&CrossEvent> {
    let idx = events.partition_point(|e| e.time <= time);
    idx.checked_sub(1).map(|i| &events[i])
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
