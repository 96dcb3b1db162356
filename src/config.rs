//! Configuration management for watchlog
//!
//! Defaults, optional `watchlog.toml` loading, and environment-variable
//! overlays for the watcher and the event store.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "watchlog.toml";

/// Global configuration for watchlog
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchlogConfig {
    /// File watcher configuration
    pub watcher: WatcherConfig,
    /// Event store configuration
    pub store: StoreConfig,
}

/// Configuration for file watching
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatcherConfig {
    /// Minimum gap between two accepted Changed events for one path, in
    /// milliseconds
    pub debounce_ms: u64,
    /// Extension to watch; empty watches all files
    pub extension: String,
}

/// Configuration for event persistence
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Location of the embedded event database
    pub db_path: PathBuf,
}

impl Default for WatchlogConfig {
    fn default() -> Self {
        Self {
            watcher: WatcherConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 1000,
            extension: String::new(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("watchlog.db"),
        }
    }
}

impl WatcherConfig {
    /// Get the debounce window duration
    pub fn debounce_duration(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Configuration loading and management
impl WatchlogConfig {
    /// Load configuration from a toml file
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Load configuration from `watchlog.toml` in the working directory, or
    /// use the defaults when the file is absent or unreadable.
    pub fn load_or_default() -> Self {
        let path = Path::new(DEFAULT_CONFIG_FILE);
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!("ignoring {}: {err:#}", path.display());
                Self::default()
            }
        }
    }

    /// Override with environment variables if present
    pub fn overlay_env(mut self) -> Self {
        if let Ok(val) = std::env::var("WATCHLOG_DEBOUNCE_MS") {
            if let Ok(ms) = val.parse::<u64>() {
                self.watcher.debounce_ms = ms;
            }
        }

        if let Ok(val) = std::env::var("WATCHLOG_EXTENSION") {
            self.watcher.extension = val;
        }

        if let Ok(val) = std::env::var("WATCHLOG_DB_PATH") {
            self.store.db_path = PathBuf::from(val);
        }

        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.watcher.debounce_ms == 0 {
            return Err("debounce_ms must be greater than 0".to_string());
        }

        if self.store.db_path.as_os_str().is_empty() {
            return Err("db_path must not be empty".to_string());
        }

        Ok(())
    }
}
