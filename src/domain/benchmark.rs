//! Monthly-investment benchmark.
//!
//! Invests a fixed amount at the close of the first bar of every calendar
//! month (fractional units) and tracks the profit of that plan bar by bar, so
//! a player's P/L curve can be compared with steady monthly investing.

use chrono::Datelike;

use super::ohlcv::Bar;
use super::portfolio::PnlPoint;

pub const DEFAULT_MONTHLY_AMOUNT: f64 = 100_000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkPoint {
    pub time: i64,
    pub invested: f64,
    pub value: f64,
    pub profit: f64,
}

/// One row of "you vs benchmark" at a shared timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub time: i64,
    pub player: f64,
    pub benchmark: f64,
}

impl Comparison {
    pub fn lead(&self) -> f64 {
        self.player - self.benchmark
    }
}

pub fn monthly_investment(bars: &[Bar], amount: f64) -> Vec<BenchmarkPoint> {
    let mut points = Vec::with_capacity(bars.len());
    let mut units = 0.0;
    let mut invested = 0.0;
    let mut last_month: Option<(i32, u32)> = None;

    for bar in bars {
        let month = (bar.date.year(), bar.date.month());
        if last_month != Some(month) && bar.close > 0.0 {
            units += amount / bar.close;
            invested += amount;
            last_month = Some(month);
        }
        let value = units * bar.close;
        points.push(BenchmarkPoint {
            time: bar.time(),
            invested,
            value,
            profit: value - invested,
        });
    }

    points
}

/// Pair the player's P/L with the benchmark's profit wherever both have a
/// point for the same time.
pub fn compare(pnl_curve: &[PnlPoint], benchmark: &[BenchmarkPoint]) -> Vec<Comparison> {
    let mut out = Vec::new();
    let mut j = 0;
    for p in pnl_curve {
        while j < benchmark.len() && benchmark[j].time < p.time {
            j += 1;
        }
        match benchmark.get(j) {
            Some(b) if b.time == p.time => out.push(Comparison {
                time: p.time,
                player: p.profit,
                benchmark: b.profit,
            }),
            Some(_) => {}
            None => break,
        }
    }
    out
}
