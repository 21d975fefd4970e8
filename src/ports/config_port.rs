//! Configuration access port trait.

use std::time::Duration;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;
    fn get_double(&self, section: &str, key: &str, default: f64) -> f64;
    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool;

    /// Millisecond value as a `Duration`; negative values read as the default.
    fn get_duration_ms(&self, section: &str, key: &str, default: Duration) -> Duration {
        let default_ms = default.as_millis() as i64;
        match self.get_int(section, key, default_ms) {
            ms if ms >= 0 => Duration::from_millis(ms as u64),
            _ => default,
        }
    }
}
