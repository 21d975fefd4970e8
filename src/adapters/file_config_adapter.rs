//! INI file configuration adapter.

use crate::domain::error::SimError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SimError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config.load(path).map_err(|reason| SimError::ConfigParse {
            file: path.display().to_string(),
            reason,
        })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, SimError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| SimError::ConfigParse {
                file: "<string>".to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.config
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.config
            .get(section, key)
            .as_deref()
            .and_then(Self::parse_bool)
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
[market]
data_path = data/prices.csv
symbol = TOYOTA
initial_capital = 10000000.0
lot_size = 100
tick_ms = 250

[benchmark]
symbol = NIKKEI
monthly_amount = 100000

[arcade]
tick_ms = 16
"#;

    #[test]
    fn reads_all_sections() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(
            adapter.get_string("market", "data_path"),
            Some("data/prices.csv".to_string())
        );
        assert_eq!(
            adapter.get_string("benchmark", "symbol"),
            Some("NIKKEI".to_string())
        );
        assert_eq!(adapter.get_double("market", "initial_capital", 0.0), 10_000_000.0);
        assert_eq!(adapter.get_int("arcade", "tick_ms", 0), 16);
    }

    #[test]
    fn missing_keys_and_sections() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_string("market", "news_path"), None);
        assert_eq!(adapter.get_string("nowhere", "symbol"), None);
        assert_eq!(adapter.get_int("market", "short_period", 5), 5);
        assert_eq!(adapter.get_double("benchmark", "missing", 1.5), 1.5);
    }

    #[test]
    fn non_numeric_falls_back_to_default() {
        let adapter =
            FileConfigAdapter::from_string("[market]\nlot_size = lots\ninitial_capital = rich\n")
                .unwrap();
        assert_eq!(adapter.get_int("market", "lot_size", 100), 100);
        assert_eq!(adapter.get_double("market", "initial_capital", 1.0), 1.0);
    }

    #[test]
    fn bool_spellings() {
        let adapter = FileConfigAdapter::from_string(
            "[flags]\na = true\nb = Yes\nc = on\nd = 0\ne = off\nf = maybe\n",
        )
        .unwrap();
        assert!(adapter.get_bool("flags", "a", false));
        assert!(adapter.get_bool("flags", "b", false));
        assert!(adapter.get_bool("flags", "c", false));
        assert!(!adapter.get_bool("flags", "d", true));
        assert!(!adapter.get_bool("flags", "e", true));
        assert!(adapter.get_bool("flags", "f", true));
    }

    #[test]
    fn durations_in_milliseconds() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(
            adapter.get_duration_ms("market", "tick_ms", Duration::from_secs(1)),
            Duration::from_millis(250)
        );
        assert_eq!(
            adapter.get_duration_ms("market", "news_pause_ms", Duration::from_secs(10)),
            Duration::from_secs(10)
        );
    }

    #[test]
    fn negative_duration_uses_default() {
        let adapter = FileConfigAdapter::from_string("[arcade]\ntick_ms = -5\n").unwrap();
        assert_eq!(
            adapter.get_duration_ms("arcade", "tick_ms", Duration::from_millis(16)),
            Duration::from_millis(16)
        );
    }

    #[test]
    fn from_file_reads_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "[market]\nsymbol = SONY\n").unwrap();
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(adapter.get_string("market", "symbol"), Some("SONY".to_string()));
    }

    #[test]
    fn from_file_missing_is_parse_error() {
        let err = FileConfigAdapter::from_file("/nonexistent/path/stocksim.ini")
            .err()
            .unwrap();
        assert!(
            matches!(err, SimError::ConfigParse { file, .. } if file.contains("stocksim.ini"))
        );
    }
}
