//! Core domain types and logic.

pub mod ohlcv;
pub mod position;
pub mod portfolio;
pub mod indicator;
pub mod cross;
pub mod playback;
pub mod news;
pub mod market;
pub mod benchmark;
pub mod arcade;
pub mod config_validation;
pub mod error;
