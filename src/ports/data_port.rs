//! Price series access port trait.

use crate::domain::error::SimError;
use crate::domain::ohlcv::Bar;

pub trait SeriesSource {
    /// Bars for `symbol`, oldest first. An unknown symbol yields an empty
    /// series rather than an error.
    fn load_series(&self, symbol: &str) -> Result<Vec<Bar>, SimError>;

    fn list_symbols(&self) -> Result<Vec<String>, SimError>;
}
