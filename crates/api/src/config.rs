//! Server configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! `focus-monitor.toml` (path overridable with `FOCUS_CONFIG`), then
//! `FOCUS__SECTION__KEY` environment variables.

use attention::MonitorConfig;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

/// Default config file base name, any format the `config` crate knows
pub const DEFAULT_CONFIG_FILE: &str = "focus-monitor";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub monitor: MonitorConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address
    pub addr: String,
    /// Emit logs as JSON lines
    pub json_logs: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:5000".to_string(),
            json_logs: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Settings document written after every settings or mode change
    pub settings_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            settings_path: PathBuf::from("focus_settings.json"),
        }
    }
}

impl AppConfig {
    /// Load from `FOCUS_CONFIG` (or the default file) plus environment
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("FOCUS_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(&path)
    }

    /// Load from a specific file; a missing file is not an error
    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("FOCUS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = AppConfig::load_from("/nonexistent/focus-monitor").unwrap();
        assert_eq!(config.server.addr, "127.0.0.1:5000");
        assert!(!config.server.json_logs);
        assert_eq!(config.storage.settings_path, PathBuf::from("focus_settings.json"));
        assert_eq!(config.monitor.calibration_frames, 60);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("focus.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[server]\naddr = \"0.0.0.0:9000\"\n\n[monitor]\ncalibration_frames = 30\nhistory_len = 5"
        )
        .unwrap();

        let config = AppConfig::load_from(path.to_str().unwrap()).unwrap();
        assert_eq!(config.server.addr, "0.0.0.0:9000");
        assert_eq!(config.monitor.calibration_frames, 30);
        assert_eq!(config.monitor.history_len, 5);
        assert_eq!(config.monitor.blink_frames_threshold, 3);
        assert_eq!(config.storage.settings_path, PathBuf::from("focus_settings.json"));
    }
}
