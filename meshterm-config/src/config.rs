//! Workspace configuration and its persistence.
//!
//! Covers:
//! - `load` / `save` (YAML file I/O with atomic write)
//! - XDG-style path helpers (`config_path`, `config_dir`, `state_dir`, `login_names_path`)
//! - Defaults for the directory client, session-open timeout and login prefill

use crate::error::ConfigError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Application directory name used under the config and data roots.
const APP_DIR: &str = "meshterm";

/// Log level configuration.
///
/// Controls the verbosity of log output written to the debug log file.
/// Environment variable `RUST_LOG` and the `--log-level` CLI flag take precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// No logging (log file not created)
    Off,
    /// Errors only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages
    #[default]
    Info,
    /// Debug messages
    Debug,
    /// Most verbose
    Trace,
}

impl LogLevel {
    /// Convert to `log::LevelFilter`
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Workspace configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Device directory endpoint queried by every tab's picker.
    pub directory_url: String,
    /// Timeout for a single directory request.
    pub directory_timeout_secs: u64,
    /// Maximum accepted directory response body size.
    pub max_directory_response_bytes: u64,
    /// Timeout handed to the session-open primitive.
    pub session_timeout_secs: u64,
    /// Delay before the deferred login trigger fires. Zero means "next tick".
    pub login_debounce_ms: u64,
    /// Default login name per device OS tag (lowercase), used when no
    /// login has been remembered for a device.
    pub default_login_names: HashMap<String, String>,
    /// Log file verbosity.
    pub log_level: LogLevel,
}

impl Default for Config {
    fn default() -> Self {
        let default_login_names = [
            ("linux", "root"),
            ("freebsd", "root"),
            ("openbsd", "root"),
            ("windows", "Administrator"),
        ]
        .into_iter()
        .map(|(os, login)| (os.to_string(), login.to_string()))
        .collect();

        Self {
            directory_url: "http://127.0.0.1:8080/api/devices".to_string(),
            directory_timeout_secs: 15,
            max_directory_response_bytes: 10 * 1024 * 1024,
            session_timeout_secs: 30,
            login_debounce_ms: 0,
            default_login_names,
            log_level: LogLevel::Info,
        }
    }
}

impl Config {
    /// Load configuration from file or create default
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();
        log::info!("Config path: {:?}", config_path);

        if config_path.exists() {
            let config = Self::load_from(&config_path)?;
            log::info!("Loaded config from {:?}", config_path);
            Ok(config)
        } else {
            log::info!(
                "Config file not found, creating default at {:?}",
                config_path
            );
            let config = Self::default();
            if let Err(e) = config.save_to(&config_path) {
                log::error!("Failed to save default config: {}", e);
                return Err(e);
            }
            Ok(config)
        }
    }

    /// Load and validate configuration from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
        let config: Config = serde_yaml_ng::from_str(&contents).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default config path
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(ConfigError::Io)?;
        }

        let yaml = serde_yaml_ng::to_string(self).map_err(ConfigError::Parse)?;

        // Atomic save: write to temp file then rename to prevent corruption on crash
        let temp_path = path.with_extension("yaml.tmp");
        fs::write(&temp_path, &yaml).map_err(ConfigError::Io)?;
        fs::rename(&temp_path, path).map_err(ConfigError::Io)?;

        log::debug!("Saved config to {:?}", path);
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.directory_url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "directory_url must not be empty".to_string(),
            ));
        }
        if self.directory_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "directory_timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Default login name for a device OS tag, if one is configured.
    pub fn default_login_for_os(&self, os: &str) -> Option<&str> {
        self.default_login_names
            .get(&os.trim().to_lowercase())
            .map(String::as_str)
            .filter(|login| !login.is_empty())
    }

    /// Get the configuration file path (`~/.config/meshterm/config.yaml`)
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.yaml")
    }

    /// Get the configuration directory path
    pub fn config_dir() -> PathBuf {
        #[cfg(target_os = "windows")]
        {
            if let Some(config_dir) = dirs::config_dir() {
                config_dir.join(APP_DIR)
            } else {
                PathBuf::from(".")
            }
        }
        #[cfg(not(target_os = "windows"))]
        {
            if let Some(home_dir) = dirs::home_dir() {
                home_dir.join(".config").join(APP_DIR)
            } else {
                PathBuf::from(".")
            }
        }
    }

    /// Directory for persisted runtime state (login names).
    pub fn state_dir() -> PathBuf {
        if let Some(data_dir) = dirs::data_local_dir() {
            data_dir.join(APP_DIR)
        } else {
            PathBuf::from(".")
        }
    }

    /// Path of the persisted login-name store.
    pub fn login_names_path() -> PathBuf {
        Self::state_dir().join("login_names.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn save_then_load_preserves_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let mut config = Config::default();
        config.directory_url = "https://directory.example.net/devices".to_string();
        config.session_timeout_secs = 5;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert!(!path.with_extension("yaml.tmp").exists());
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "directory_url: https://dir.example.net/api\n").unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.directory_url, "https://dir.example.net/api");
        assert_eq!(loaded.session_timeout_secs, 30);
        assert_eq!(loaded.log_level, LogLevel::Info);
    }

    #[test]
    fn empty_directory_url_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "directory_url: '  '\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn default_login_lookup_is_case_insensitive() {
        let config = Config::default();
        assert_eq!(config.default_login_for_os("Linux"), Some("root"));
        assert_eq!(config.default_login_for_os("windows"), Some("Administrator"));
        assert_eq!(config.default_login_for_os("macOS"), None);
    }
}
