//! # Logging
//!
//! Diagnostic logging setup. Logs go to stderr, and optionally to a daily
//! rolling file, so stdout only ever carries controller state lines.

use std::str::FromStr;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;

/// File name prefix for rolling log files
pub const LOG_FILE_PREFIX: &str = "ps5ctrl.log";

/// Build the level filter from `RUST_LOG`, falling back to the configured level
pub fn build_filter(config: &LoggingConfig) -> EnvFilter {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default();
    filter_from_directives(config, &directives)
}

/// Build the level filter from explicit directives
///
/// The configured level only applies when `directives` is empty. Invalid
/// directives are ignored.
pub fn filter_from_directives(config: &LoggingConfig, directives: &str) -> EnvFilter {
    let level = Level::from_str(&config.level).unwrap_or(Level::INFO);
    EnvFilter::builder()
        .with_default_directive(level.into())
        .parse_lossy(directives)
}

/// Install the global subscriber
///
/// # Returns
///
/// The file writer guard when file logging is enabled. It must be kept alive
/// for the life of the process or buffered lines are lost.
///
/// # Panics
///
/// Panics if a global subscriber was already installed.
pub fn init(config: &LoggingConfig) -> Option<WorkerGuard> {
    let (file_layer, guard) = if config.log_dir.is_empty() {
        (None, None)
    } else {
        let appender = tracing_appender::rolling::daily(&config.log_dir, LOG_FILE_PREFIX);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        (
            Some(fmt::layer().with_writer(writer).with_ansi(false)),
            Some(guard),
        )
    };

    tracing_subscriber::registry()
        .with(build_filter(config))
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    guard
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;

    fn logging_config(level: &str) -> LoggingConfig {
        LoggingConfig {
            level: level.to_string(),
            log_dir: String::new(),
        }
    }

    #[test]
    fn test_filter_uses_configured_level() {
        let filter = filter_from_directives(&logging_config("debug"), "");
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn test_filter_falls_back_to_info() {
        let filter = filter_from_directives(&logging_config("loud"), "");
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn test_env_directives_raise_level() {
        let filter = filter_from_directives(&logging_config("info"), "debug");
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn test_env_directives_lower_level() {
        let filter = filter_from_directives(&logging_config("debug"), "warn");
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn test_build_filter_reads_rust_log() {
        // Only test touching RUST_LOG
        std::env::set_var(EnvFilter::DEFAULT_ENV, "debug");
        let filter = build_filter(&logging_config("info"));
        std::env::remove_var(EnvFilter::DEFAULT_ENV);

        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn test_env_target_directive() {
        let filter = filter_from_directives(&logging_config("info"), "ps5ctrl=trace");
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));
    }
}
