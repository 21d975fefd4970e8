//! Portfolio state and profit tracking.

use super::position::Position;

#[derive(Debug, Clone, PartialEq)]
pub struct PnlPoint {
    pub time: i64,
    pub profit: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub initial_capital: f64,
    pub position: Position,
    pub pnl_curve: Vec<PnlPoint>,
}

/// Read-only view handed to the display layer.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioSnapshot {
    pub cash: f64,
    pub shares: u64,
    pub average_cost: f64,
    pub realized_profit: f64,
    pub unrealized_pnl: f64,
    pub total_profit: f64,
    pub equity: f64,
}

impl Portfolio {
    pub fn new(initial_capital: f64) -> Self {
        Portfolio {
            initial_capital,
            position: Position::new(initial_capital),
            pnl_curve: Vec::new(),
        }
    }

    /// Append total profit at `price` for the bar at `time`. A second record
    /// for the same time replaces the first.
    pub fn record_pnl(&mut self, time: i64, price: f64) {
        let profit = self.position.total_profit(price);
        match self.pnl_curve.last_mut() {
            Some(last) if last.time == time => last.profit = profit,
            _ => self.pnl_curve.push(PnlPoint { time, profit }),
        }
    }

    pub fn snapshot(&self, price: f64) -> PortfolioSnapshot {
        let pos = &self.position;
        PortfolioSnapshot {
            cash: pos.cash,
            shares: pos.shares,
            average_cost: pos.average_cost,
            realized_profit: pos.realized_profit,
            unrealized_pnl: pos.unrealized_pnl(price),
            total_profit: pos.total_profit(price),
            equity: pos.equity(price),
        }
    }

    /// Final equity relative to the starting capital, as a fraction.
    pub fn return_pct(&self, price: f64) -> f64 {
        if self.initial_capital == 0.0 {
            return 0.0;
        }
        (self.position.equity(price) - self.initial_capital) / self.initial_capital
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_portfolio() {
        let portfolio = Portfolio::new(10_000_000.0);
        assert_eq!(portfolio.initial_capital, 10_000_000.0);
        assert_eq!(portfolio.position.cash, 10_000_000.0);
        assert!(portfolio.pnl_curve.is_empty());
    }

    #[test]
    fn record_pnl_appends_per_time() {
        let mut portfolio = Portfolio::new(1_000_000.0);
        portfolio.position.buy(100, 1_000.0).unwrap();

        portfolio.record_pnl(100, 1_000.0);
        portfolio.record_pnl(200, 1_050.0);

        assert_eq!(
            portfolio.pnl_curve,
            vec![
                PnlPoint {
                    time: 100,
                    profit: 0.0
                },
                PnlPoint {
                    time: 200,
                    profit: 5_000.0
                },
            ]
        );
    }

    #[test]
    fn record_pnl_same_time_replaces() {
        let mut portfolio = Portfolio::new(1_000_000.0);
        portfolio.position.buy(100, 1_000.0).unwrap();
        portfolio.record_pnl(100, 1_000.0);
        portfolio.position.sell(100, 1_100.0).unwrap();
        portfolio.record_pnl(100, 1_100.0);

        assert_eq!(portfolio.pnl_curve.len(), 1);
        assert_eq!(portfolio.pnl_curve[0].profit, 10_000.0);
    }

    #[test]
    fn snapshot_reflects_position() {
        let mut portfolio = Portfolio::new(1_000_000.0);
        portfolio.position.buy(100, 1_000.0).unwrap();
        let snap = portfolio.snapshot(1_200.0);

        assert_eq!(snap.cash, 900_000.0);
        assert_eq!(snap.shares, 100);
        assert_eq!(snap.average_cost, 1_000.0);
        assert_eq!(snap.realized_profit, 0.0);
        assert_eq!(snap.unrealized_pnl, 20_000.0);
        assert_eq!(snap.total_profit, 20_000.0);
        assert_eq!(snap.equity, 1_020_000.0);
    }

    #[test]
    fn return_pct_uses_equity() {
        let mut portfolio = Portfolio::new(1_000_000.0);
        portfolio.position.buy(100, 1_000.0).unwrap();
        assert!((portfolio.return_pct(2_000.0) - 0.1).abs() < f64::EPSILON);
        assert_eq!(Portfolio::new(0.0).return_pct(10.0), 0.0);
    }
}
