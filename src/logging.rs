//! Logging setup built on the `tracing` crate.
//!
//! The compiler itself only emits events; binaries decide where they go.

use std::path::Path;
use tracing::Level;
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{fmt, EnvFilter};

/// Log output destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOutput {
    /// Standard error.
    Stderr,
    /// File with daily rotation.
    File { directory: String, prefix: String },
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level.
    pub level: Level,
    /// Output destination.
    pub output: LogOutput,
    /// Custom filter directives (e.g., "apimark=debug").
    pub filter: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            output: LogOutput::Stderr,
            filter: None,
        }
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }
}

fn build_filter(config: &LogConfig) -> EnvFilter {
    let base = EnvFilter::from_default_env().add_directive(config.level.into());
    match &config.filter {
        Some(directives) => directives.split(',').fold(base, |filter, directive| {
            filter.add_directive(directive.parse().unwrap_or_else(|_| config.level.into()))
        }),
        None => base,
    }
}

/// Initialize the global logging system.
///
/// Returns a `WorkerGuard` that must be kept alive for the duration of the
/// program so buffered events are flushed.
pub fn init_logging(config: LogConfig) -> Option<WorkerGuard> {
    let filter = build_filter(&config);
    match config.output {
        LogOutput::Stderr => {
            let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());
            fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_target(false)
                .compact()
                .init();
            Some(guard)
        }
        LogOutput::File { directory, prefix } => {
            let appender = rolling::daily(&directory, &prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
    }
}

/// Initialize logging with defaults for development.
pub fn init_dev_logging() -> Option<WorkerGuard> {
    init_logging(LogConfig::new().with_level(Level::DEBUG).with_filter("apimark=debug"))
}

/// Initialize logging writing to a rotating file in a directory.
pub fn init_file_logging(log_dir: impl AsRef<Path>) -> Option<WorkerGuard> {
    init_logging(LogConfig::new().with_output(LogOutput::File {
        directory: log_dir.as_ref().to_string_lossy().to_string(),
        prefix: "apimark".to_string(),
    }))
}
