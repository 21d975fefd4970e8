//! Rendering port trait.

use crate::domain::arcade::GameState;
use crate::domain::error::SimError;
use crate::domain::market::{MarketFrame, Notice};

/// Receives everything the user should see. Implementations decide how much
/// of each frame to draw.
pub trait Display {
    fn market_frame(&mut self, frame: &MarketFrame<'_>) -> Result<(), SimError>;

    fn notice(&mut self, notice: &Notice) -> Result<(), SimError>;

    fn arcade_frame(&mut self, state: &GameState) -> Result<(), SimError>;
}
