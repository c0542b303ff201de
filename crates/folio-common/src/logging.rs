//! Logging setup.
//!
//! The engine itself only emits `tracing` events; installing a subscriber is
//! left to the host. [`init_logging`] is the convenience used by tests and
//! small tools.

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable consulted before `RUST_LOG`.
pub const LOG_ENV_VAR: &str = "FOLIO_LOG";

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level used when neither a filter nor the environment gives one.
    pub level: Level,
    /// Filter directives (e.g., "`folio_layout=debug`"); overrides the
    /// environment.
    pub filter: Option<String>,
    /// Write through the test writer so `cargo test` captures output.
    pub test_writer: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            filter: None,
            test_writer: false,
        }
    }
}

impl LogConfig {
    /// Configuration for test binaries.
    #[must_use]
    pub fn test() -> Self {
        Self {
            level: Level::DEBUG,
            test_writer: true,
            ..Self::default()
        }
    }

    /// Set filter directives.
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// The filter this configuration resolves to: explicit directives, then
    /// [`LOG_ENV_VAR`], then `RUST_LOG`, then `level`.
    #[must_use]
    pub fn env_filter(&self) -> EnvFilter {
        let fallback = || EnvFilter::new(self.level.to_string());
        match self.filter {
            Some(ref custom) => EnvFilter::try_new(custom).unwrap_or_else(|_| fallback()),
            None => EnvFilter::try_from_env(LOG_ENV_VAR)
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| fallback()),
        }
    }
}

/// Errors from [`init_logging`].
#[derive(Debug, Error)]
pub enum LoggingError {
    /// Another global subscriber was installed first.
    #[error("a global tracing subscriber is already installed")]
    AlreadyInstalled(#[from] tracing_subscriber::util::TryInitError),
}

/// Install a compact `fmt` subscriber for `config`.
///
/// # Errors
///
/// Returns [`LoggingError::AlreadyInstalled`] if a global subscriber was
/// already set. Test binaries that initialize more than once can ignore it.
pub fn init_logging(config: &LogConfig) -> Result<(), LoggingError> {
    let registry = tracing_subscriber::registry().with(config.env_filter());
    let layer = fmt::layer().compact().with_target(true);
    if config.test_writer {
        registry.with(layer.with_test_writer()).try_init()?;
    } else {
        registry.with(layer).try_init()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_config_default() {
        let config = LogConfig::default();
        assert_eq!(config.level, Level::INFO);
        assert!(config.filter.is_none());
        assert!(!config.test_writer);
    }

    #[test]
    fn test_explicit_filter_wins() {
        let config = LogConfig::test().with_filter("folio_layout=trace");
        assert_eq!(config.env_filter().to_string(), "folio_layout=trace");
    }

    #[test]
    fn test_bad_filter_falls_back_to_level() {
        let config = LogConfig::default().with_filter("folio_layout=loud");
        assert_eq!(config.env_filter().to_string(), "info");
    }

    #[test]
    fn test_second_init_reports_already_installed() {
        let _ = init_logging(&LogConfig::test());
        let second = init_logging(&LogConfig::test());
        assert!(matches!(second, Err(LoggingError::AlreadyInstalled(_))));
    }
}
