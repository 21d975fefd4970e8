//! Single-instrument position ledger.
//!
//! Cash, share count, weighted average cost and realized profit for one
//! paper-trading session. Mutated only by [`Position::buy`] and
//! [`Position::sell`]; a rejected order leaves every field untouched.

use crate::domain::error::TradeError;

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub cash: f64,
    pub shares: u64,
    pub average_cost: f64,
    pub realized_profit: f64,
}

/// Outcome of an accepted order.
#[derive(Debug, Clone, PartialEq)]
pub struct Fill {
    pub quantity: u64,
    pub price: f64,
    pub value: f64,
    /// Profit booked by this fill; always zero for buys.
    pub realized: f64,
}

impl Position {
    pub fn new(cash: f64) -> Self {
        Position {
            cash,
            shares: 0,
            average_cost: 0.0,
            realized_profit: 0.0,
        }
    }

    pub fn is_flat(&self) -> bool {
        self.shares == 0
    }

    /// Buy `quantity` shares at `price`.
    ///
    /// Rejected when the order costs more than the available cash. The new
    /// average cost is the share-weighted mean of the old holding and the
    /// purchase.
    pub fn buy(&mut self, quantity: u64, price: f64) -> Result<Fill, TradeError> {
        let cost = quantity as f64 * price;
        if cost > self.cash {
            return Err(TradeError::InsufficientFunds {
                cost,
                cash: self.cash,
            });
        }

        let new_shares = self.shares + quantity;
        if new_shares > 0 {
            self.average_cost = (self.average_cost * self.shares as f64
                + price * quantity as f64)
                / new_shares as f64;
        }
        self.shares = new_shares;
        self.cash -= cost;

        Ok(Fill {
            quantity,
            price,
            value: cost,
            realized: 0.0,
        })
    }

    /// Sell `quantity` shares at `price`, booking `(price - average_cost)`
    /// per share. Average cost resets to zero once the position is flat.
    pub fn sell(&mut self, quantity: u64, price: f64) -> Result<Fill, TradeError> {
        if quantity > self.shares {
            return Err(TradeError::InsufficientHoldings {
                requested: quantity,
                held: self.shares,
            });
        }

        let realized = (price - self.average_cost) * quantity as f64;
        let proceeds = quantity as f64 * price;
        self.realized_profit += realized;
        self.cash += proceeds;
        self.shares -= quantity;
        if self.shares == 0 {
            self.average_cost = 0.0;
        }

        Ok(Fill {
            quantity,
            price,
            value: proceeds,
            realized,
        })
    }

    pub fn market_value(&self, price: f64) -> f64 {
        self.shares as f64 * price
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        if self.shares == 0 {
            return 0.0;
        }
        (price - self.average_cost) * self.shares as f64
    }

    /// Realized plus unrealized profit at `price`.
    pub fn total_profit(&self, price: f64) -> f64 {
        self.realized_profit + self.unrealized_pnl(price)
    }

    pub fn equity(&self, price: f64) -> f64 {
        self.cash + self.market_value(price)
    }
}
