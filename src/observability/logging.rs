//! Logging configuration.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::errors::{PluralKitError, PluralKitResult};

/// Target used by every event this crate emits.
const CRATE_TARGET: &str = "pluralkit_client";

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Trace-level logging.
    Trace,
    /// Debug-level logging; includes rate limiter adjustments when the
    /// limiter's `debug` flag is on.
    Debug,
    /// Info-level logging.
    #[default]
    Info,
    /// Warning-level logging.
    Warn,
    /// Error-level logging.
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable, multi-line output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
    /// Single-line output.
    Compact,
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Level applied to this crate's events.
    pub level: LogLevel,
    /// Output format.
    pub format: LogFormat,
    /// Whether to print event targets.
    pub include_target: bool,
    /// Whether to print source file and line.
    pub include_file_line: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Pretty,
            include_target: true,
            include_file_line: false,
        }
    }
}

impl LoggingConfig {
    /// Creates a new logging configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the log level.
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Sets the log format.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets whether to include the event target.
    pub fn with_target(mut self, include: bool) -> Self {
        self.include_target = include;
        self
    }

    /// Sets whether to include file and line number.
    pub fn with_file_line(mut self, include: bool) -> Self {
        self.include_file_line = include;
        self
    }

    /// The filter directive for this crate, e.g. `pluralkit_client=debug`.
    pub fn directive(&self) -> String {
        format!(
            "{}={}",
            CRATE_TARGET,
            LevelFilter::from(self.level).to_string().to_lowercase()
        )
    }

    /// Installs a global subscriber.
    ///
    /// `RUST_LOG` is honoured for other targets; this crate's level comes
    /// from the configuration.
    ///
    /// ```no_run
    /// use pluralkit_client::observability::{LogFormat, LogLevel, LoggingConfig};
    ///
    /// LoggingConfig::new()
    ///     .with_level(LogLevel::Debug)
    ///     .with_format(LogFormat::Json)
    ///     .init()
    ///     .expect("logging already initialised");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a global subscriber is already set.
    pub fn init(self) -> PluralKitResult<()> {
        let directive = self
            .directive()
            .parse()
            .map_err(|e| PluralKitError::configuration(format!("Invalid log directive: {e}")))?;
        let filter = EnvFilter::from_default_env().add_directive(directive);

        let result = match self.format {
            LogFormat::Pretty => tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .pretty()
                        .with_target(self.include_target)
                        .with_file(self.include_file_line)
                        .with_line_number(self.include_file_line),
                )
                .try_init(),
            LogFormat::Json => tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_target(self.include_target)
                        .with_current_span(true),
                )
                .try_init(),
            LogFormat::Compact => tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().compact().with_target(self.include_target))
                .try_init(),
        };

        result.map_err(|e| PluralKitError::configuration(format!("Logging already initialised: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_config_default() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, LogLevel::Info);
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.include_target);
        assert!(!config.include_file_line);
    }

    #[test]
    fn test_logging_config_builder_chain() {
        let config = LoggingConfig::new()
            .with_level(LogLevel::Trace)
            .with_format(LogFormat::Compact)
            .with_target(false)
            .with_file_line(true);

        assert_eq!(config.level, LogLevel::Trace);
        assert_eq!(config.format, LogFormat::Compact);
        assert!(!config.include_target);
        assert!(config.include_file_line);
    }

    #[test]
    fn test_directive_targets_this_crate() {
        assert_eq!(
            LoggingConfig::new().with_level(LogLevel::Debug).directive(),
            "pluralkit_client=debug"
        );
        assert_eq!(LoggingConfig::new().directive(), "pluralkit_client=info");
    }

    #[test]
    fn test_second_init_fails() {
        let _ = LoggingConfig::new().with_format(LogFormat::Compact).init();
        assert!(LoggingConfig::new().init().is_err());
    }
}
