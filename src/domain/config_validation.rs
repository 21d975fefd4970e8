//! Configuration validation.
//!
//! Checks every field before a session starts so that bad input fails fast
//! with the offending section and key.

use crate::domain::error::SimError;
use crate::ports::config_port::ConfigPort;

pub fn validate_market_config(config: &dyn ConfigPort) -> Result<(), SimError> {
    validate_required(config, "market", "data_path")?;
    validate_required(config, "market", "symbol")?;
    validate_initial_capital(config)?;
    validate_lot_size(config)?;
    validate_periods(config)?;
    validate_positive_ms(config, "market", "tick_ms", 1000)?;
    validate_positive_ms(config, "market", "news_pause_ms", 10_000)?;
    Ok(())
}

pub fn validate_benchmark_config(config: &dyn ConfigPort) -> Result<(), SimError> {
    validate_required(config, "benchmark", "symbol")?;
    let amount = config.get_double("benchmark", "monthly_amount", 100_000.0);
    if amount <= 0.0 {
        return Err(SimError::invalid(
            "benchmark",
            "monthly_amount",
            "monthly_amount must be positive",
        ));
    }
    Ok(())
}

pub fn validate_arcade_config(config: &dyn ConfigPort) -> Result<(), SimError> {
    validate_positive_ms(config, "arcade", "tick_ms", 16)
}

fn validate_required(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), SimError> {
    match config.get_string(section, key) {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(SimError::missing(section, key)),
    }
}

fn validate_initial_capital(config: &dyn ConfigPort) -> Result<(), SimError> {
    let value = config.get_double("market", "initial_capital", 10_000_000.0);
    if value <= 0.0 {
        return Err(SimError::invalid(
            "market",
            "initial_capital",
            "initial_capital must be positive",
        ));
    }
    Ok(())
}

fn validate_lot_size(config: &dyn ConfigPort) -> Result<(), SimError> {
    if config.get_int("market", "lot_size", 100) < 1 {
        return Err(SimError::invalid(
            "market",
            "lot_size",
            "lot_size must be at least 1",
        ));
    }
    if config.get_int("market", "initial_quantity", 100) < 0 {
        return Err(SimError::invalid(
            "market",
            "initial_quantity",
            "initial_quantity must be non-negative",
        ));
    }
    Ok(())
}

fn validate_periods(config: &dyn ConfigPort) -> Result<(), SimError> {
    let short = config.get_int("market", "short_period", 5);
    let long = config.get_int("market", "long_period", 25);
    if short < 1 {
        return Err(SimError::invalid(
            "market",
            "short_period",
            "short_period must be at least 1",
        ));
    }
    if long < 1 {
        return Err(SimError::invalid(
            "market",
            "long_period",
            "long_period must be at least 1",
        ));
    }
    if short >= long {
        return Err(SimError::invalid(
            "market",
            "short_period",
            "short_period must be less than long_period",
        ));
    }
    Ok(())
}

fn validate_positive_ms(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<(), SimError> {
    if config.get_int(section, key, default) < 1 {
        return Err(SimError::invalid(
            section,
            key,
            format!("{key} must be a positive number of milliseconds"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn valid_market_config_passes() {
        let config = make_config(
            r#"
[market]
data_path = prices.csv
symbol = TOYOTA
news_path = news.csv
initial_capital = 10000000
lot_size = 100
initial_quantity = 100
short_period = 5
long_period = 25
tick_ms = 1000
news_pause_ms = 10000
"#,
        );
        assert!(validate_market_config(&config).is_ok());
    }

    #[test]
    fn defaults_are_valid() {
        let config = make_config("[market]\ndata_path = p.csv\nsymbol = X\n");
        assert!(validate_market_config(&config).is_ok());
    }

    #[test]
    fn missing_data_path_fails() {
        let config = make_config("[market]\nsymbol = TOYOTA\n");
        let err = validate_market_config(&config).unwrap_err();
        assert!(matches!(err, SimError::ConfigMissing { key, .. } if key == "data_path"));
    }

    #[test]
    fn blank_symbol_fails() {
        let config = make_config("[market]\ndata_path = p.csv\nsymbol =   \n");
        let err = validate_market_config(&config).unwrap_err();
        assert!(matches!(err, SimError::ConfigMissing { key, .. } if key == "symbol"));
    }

    #[test]
    fn initial_capital_zero_fails() {
        let config = make_config("[market]\ndata_path = p.csv\nsymbol = X\ninitial_capital = 0\n");
        let err = validate_market_config(&config).unwrap_err();
        assert!(matches!(err, SimError::ConfigInvalid { key, .. } if key == "initial_capital"));
    }

    #[test]
    fn lot_size_zero_fails() {
        let config = make_config("[market]\ndata_path = p.csv\nsymbol = X\nlot_size = 0\n");
        let err = validate_market_config(&config).unwrap_err();
        assert!(matches!(err, SimError::ConfigInvalid { key, .. } if key == "lot_size"));
    }

    #[test]
    fn negative_initial_quantity_fails() {
        let config =
            make_config("[market]\ndata_path = p.csv\nsymbol = X\ninitial_quantity = -100\n");
        let err = validate_market_config(&config).unwrap_err();
        assert!(matches!(err, SimError::ConfigInvalid { key, .. } if key == "initial_quantity"));
    }

    #[test]
    fn short_period_must_be_below_long() {
        let config = make_config(
            "[market]\ndata_path = p.csv\nsymbol = X\nshort_period = 25\nlong_period = 25\n",
        );
        let err = validate_market_config(&config).unwrap_err();
        assert!(matches!(err, SimError::ConfigInvalid { key, .. } if key == "short_period"));
    }

    #[test]
    fn zero_long_period_fails() {
        let config = make_config("[market]\ndata_path = p.csv\nsymbol = X\nlong_period = 0\n");
        let err = validate_market_config(&config).unwrap_err();
        assert!(matches!(err, SimError::ConfigInvalid { key, .. } if key == "long_period"));
    }

    #[test]
    fn zero_tick_fails() {
        let config = make_config("[market]\ndata_path = p.csv\nsymbol = X\ntick_ms = 0\n");
        let err = validate_market_config(&config).unwrap_err();
        assert!(matches!(err, SimError::ConfigInvalid { key, .. } if key == "tick_ms"));
    }

    #[test]
    fn benchmark_requires_symbol() {
        let config = make_config("[benchmark]\nmonthly_amount = 1000\n");
        let err = validate_benchmark_config(&config).unwrap_err();
        assert!(matches!(err, SimError::ConfigMissing { key, .. } if key == "symbol"));
    }

    #[test]
    fn benchmark_amount_must_be_positive() {
        let config = make_config("[benchmark]\nsymbol = NIKKEI\nmonthly_amount = -1\n");
        let err = validate_benchmark_config(&config).unwrap_err();
        assert!(matches!(err, SimError::ConfigInvalid { key, .. } if key == "monthly_amount"));
    }

    #[test]
    fn arcade_tick_defaults_and_rejects_zero() {
        assert!(validate_arcade_config(&make_config("[arcade]\n")).is_ok());
        let err = validate_arcade_config(&make_config("[arcade]\ntick_ms = 0\n")).unwrap_err();
        assert!(matches!(err, SimError::ConfigInvalid { section, .. } if section == "arcade"));
    }
}
