//! Runtime configuration
//!
//! Dispatch flags and LAN server coordinates are looked up through a
//! [`ConfigProvider`] every time they are needed, so a flag flipped in the
//! environment takes effect on the next request. Startup-only options live
//! in [`cli::RelayArgs`].

pub mod cli;

pub use cli::{RadioMode, RelayArgs};

use parking_lot::RwLock;
use relay_shared::keys;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing configuration value: {0}")]
    Missing(&'static str),
}

/// Source of configuration values
pub trait ConfigProvider: Send + Sync {
    /// Look up a raw value
    fn get(&self, key: &str) -> Option<String>;

    /// Interpret a value as a boolean flag; absent means false
    fn flag(&self, key: &str) -> bool {
        self.get(key).as_deref().is_some_and(is_truthy)
    }

    /// Look up a value that must be present
    fn require(&self, key: &'static str) -> Result<String, ConfigError> {
        self.get(key).ok_or(ConfigError::Missing(key))
    }

    fn radio_enabled(&self) -> bool {
        self.flag(keys::ENABLE_RADIO_TRANSMISSION)
    }

    fn internet_enabled(&self) -> bool {
        self.flag(keys::ENABLE_INTERNET_TRANSMISSION)
    }
}

/// Reads the process environment on every lookup
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvConfig;

impl ConfigProvider for EnvConfig {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// In-memory configuration that can be changed while the relay is running
#[derive(Debug, Default)]
pub struct MapConfig {
    values: RwLock<HashMap<String, String>>,
}

impl MapConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.values.write().insert(key.into(), value.into());
    }

    pub fn remove(&self, key: &str) {
        self.values.write().remove(key);
    }
}

impl ConfigProvider for MapConfig {
    fn get(&self, key: &str) -> Option<String> {
        self.values.read().get(key).cloned()
    }
}

/// A flag is set by any non-empty value except `0`, `false`, `no` and `off`
pub fn is_truthy(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty()
        && !["0", "false", "no", "off"]
            .iter()
            .any(|falsy| value.eq_ignore_ascii_case(falsy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_truthy_values() {
        for value in ["True", "true", "1", "yes", "on", "anything"] {
            assert!(is_truthy(value), "{value} should be truthy");
        }
        for value in ["", "  ", "False", "false", "0", "no", "OFF"] {
            assert!(!is_truthy(value), "{value:?} should be falsy");
        }
    }

    #[test]
    fn test_map_config_flags() {
        let config = MapConfig::new().with(keys::ENABLE_RADIO_TRANSMISSION, "True");
        assert!(config.radio_enabled());
        assert!(!config.internet_enabled());

        config.set(keys::ENABLE_RADIO_TRANSMISSION, "");
        config.set(keys::ENABLE_INTERNET_TRANSMISSION, "True");
        assert!(!config.radio_enabled());
        assert!(config.internet_enabled());
    }

    #[test]
    fn test_require_missing() {
        let config = MapConfig::new();
        assert_eq!(
            config.require(keys::LAN_SERVER_IP),
            Err(ConfigError::Missing(keys::LAN_SERVER_IP))
        );
    }

    #[test]
    #[serial]
    fn test_env_config_reads_at_call_time() {
        let config = EnvConfig;
        std::env::remove_var(keys::ENABLE_INTERNET_TRANSMISSION);
        assert!(!config.internet_enabled());

        std::env::set_var(keys::ENABLE_INTERNET_TRANSMISSION, "True");
        assert!(config.internet_enabled());

        std::env::remove_var(keys::ENABLE_INTERNET_TRANSMISSION);
        assert!(!config.internet_enabled());
    }
}
