//! Configuration module for the watch service.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file
//! - Environment variable overrides
//! - CLI argument overrides (applied by the `run` command)
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `FTPW_` and use double underscores
//! to separate nested levels:
//! - `FTPW_SOURCE_DIR=/srv/ftp/in` sets `source_dir`
//! - `FTPW_SERVICE__GRACE_PERIOD_MS=2000` sets `service.grace_period_ms`
//! - `FTPW_CRYPTO__PASSPHRASE=secret` sets `crypto.passphrase`
//! - `FTPW_MODES='["compress=archive"]'` sets `modes`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::mode::{ModeConfig, ModeEntry};

/// Directory holding the settings file.
pub const CONFIG_DIR: &str = ".ftp-watcher";
/// Settings file name inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "settings.toml";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Directory watched for new files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_dir: Option<PathBuf>,

    /// Directory receiving outputs and error artifacts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_dir: Option<PathBuf>,

    /// Active modes as `mode=parameter`, run in this order
    #[serde(default)]
    pub modes: Vec<ModeEntry>,

    /// Service runtime settings
    #[serde(default)]
    pub service: ServiceConfig,

    /// Encryption settings
    #[serde(default)]
    pub crypto: CryptoConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServiceConfig {
    /// How long stop waits for in-flight files, in milliseconds
    #[serde(default = "default_grace_period_ms")]
    pub grace_period_ms: u64,

    /// Window for dropping repeated creation events, in milliseconds
    #[serde(default = "default_dedup_window_ms")]
    pub dedup_window_ms: u64,

    /// Optional cap on files processed at once (unbounded when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_concurrent_tasks: Option<usize>,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct CryptoConfig {
    /// Passphrase for encrypt, decrypt and compress-and-encrypt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passphrase: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Default level: error, warn, info, debug or trace
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Per-module overrides, e.g. `dispatch = "debug"`
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

// Default value functions
fn default_version() -> u32 {
    1
}
fn default_grace_period_ms() -> u64 {
    1000
}
fn default_dedup_window_ms() -> u64 {
    200
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            source_dir: None,
            target_dir: None,
            modes: Vec::new(),
            service: ServiceConfig::default(),
            crypto: CryptoConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            grace_period_ms: default_grace_period_ms(),
            dedup_window_ms: default_dedup_window_ms(),
            max_concurrent_tasks: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: HashMap::new(),
        }
    }
}

impl Settings {
    /// Load configuration from all sources
    pub fn load() -> Result<Self, Box<figment::Error>> {
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join(CONFIG_FILE));
        Self::load_from(config_path)
    }

    /// Load configuration from a specific file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        Figment::new()
            // Start with defaults
            .merge(Serialized::defaults(Settings::default()))
            // Layer in config file if it exists
            .merge(Toml::file(path.as_ref()))
            // Double underscore separates nested levels
            .merge(Env::prefixed("FTPW_").map(|key| {
                key.as_str()
                    .to_lowercase()
                    .replace("__", ".")
                    .into()
            }))
            .extract()
            .map_err(Box::new)
    }

    /// Find the settings file by looking for the config directory
    /// from the current directory up to root
    fn find_workspace_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        for ancestor in current.ancestors() {
            let config_dir = ancestor.join(CONFIG_DIR);
            if config_dir.is_dir() {
                return Some(config_dir.join(CONFIG_FILE));
            }
        }

        None
    }

    /// Active modes in configured order
    pub fn mode_config(&self) -> ModeConfig {
        self.modes.iter().cloned().collect()
    }

    /// Save current configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        let parent = path.as_ref().parent().ok_or("Invalid path")?;
        std::fs::create_dir_all(parent)?;

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }

    /// Create a default settings file under `dir`
    pub fn init_config_file(dir: &Path, force: bool) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let config_path = dir.join(CONFIG_DIR).join(CONFIG_FILE);

        if !force && config_path.exists() {
            return Err("Configuration file already exists. Use --force to overwrite".into());
        }

        Settings::default().save(&config_path)?;
        Ok(config_path)
    }
}
