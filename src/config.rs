//! # Configuration Module
//!
//! Handles loading and validating the optional `ps5ctrl.toml` file.
//!
//! Every field has a default, so a missing file, an empty file and a file
//! with only some sections all produce a complete configuration.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{Ps5CtrlError, Result};

/// Configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "ps5ctrl.toml";

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub controller: ControllerConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Controller configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ControllerConfig {
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_cycle_force")]
    pub cycle_force: u8,

    #[serde(default = "default_cycle_on_buttons")]
    pub cycle_on_buttons: bool,
}

/// State output configuration
#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_output_format")]
    pub format: String,

    #[serde(default)]
    pub changes_only: bool,
}

/// Diagnostic logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub log_dir: String,
}

// Default value functions
fn default_read_timeout_ms() -> u64 { 10 }
fn default_poll_interval_ms() -> u64 { 20 }
fn default_cycle_force() -> u8 { 255 }
fn default_cycle_on_buttons() -> bool { true }

fn default_output_format() -> String { "text".to_string() }

fn default_log_level() -> String { "info".to_string() }

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            read_timeout_ms: default_read_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            cycle_force: default_cycle_force(),
            cycle_on_buttons: default_cycle_on_buttons(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_output_format(),
            changes_only: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_dir: String::new(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use ps5ctrl::config::Config;
    ///
    /// let config = Config::load("ps5ctrl.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `path`, or use defaults if it does not exist
    ///
    /// # Returns
    ///
    /// * `Result<(Config, bool)>` - The configuration and whether the file was found
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<(Self, bool)> {
        if path.as_ref().exists() {
            Ok((Self::load(path)?, true))
        } else {
            Ok((Self::default(), false))
        }
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        if self.controller.read_timeout_ms == 0 || self.controller.read_timeout_ms > 1000 {
            return Err(Ps5CtrlError::Config(
                toml::de::Error::custom("read_timeout_ms must be between 1 and 1000")
            ));
        }

        if self.controller.poll_interval_ms == 0 || self.controller.poll_interval_ms > 10000 {
            return Err(Ps5CtrlError::Config(
                toml::de::Error::custom("poll_interval_ms must be between 1 and 10000")
            ));
        }

        if !["text", "jsonl"].contains(&self.output.format.as_str()) {
            return Err(Ps5CtrlError::Config(
                toml::de::Error::custom("output format must be 'text' or 'jsonl'")
            ));
        }

        if !["trace", "debug", "info", "warn", "error"].contains(&self.logging.level.as_str()) {
            return Err(Ps5CtrlError::Config(
                toml::de::Error::custom("log level must be one of: trace, debug, info, warn, error")
            ));
        }

        Ok(())
    }
}
