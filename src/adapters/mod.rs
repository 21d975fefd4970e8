//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod driver;
pub mod file_config_adapter;
pub mod text_display;
