//! Structured logging for bimfuse.
//!
//! Installs a global `tracing` subscriber in one of four formats, writing to
//! stdout or, through a non-blocking appender, to a file. The filter starts
//! at the configured level and can be overridden with the `BIMFUSE_LOG`
//! environment variable using the usual `EnvFilter` directive syntax.


use crate::config::{LogFormat, LogLevel, LoggingConfig};
use std::path::Path;
use tracing::Level;
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

/// Environment variable holding filter directives
pub const LOG_ENV_VAR: &str = "BIMFUSE_LOG";

/// Error type for logging operations
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// IO error occurred
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error parsing log level
    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),

    /// Error in subscriber setup
    #[error("Subscriber error: {0}")]
    SubscriberError(String),
}

/// Result type for logging operations
pub type Result<T> = std::result::Result<T, LogError>;

/// Keeps the file writer alive; drop it to flush buffered lines
#[derive(Debug, Default)]
#[must_use = "dropping the guard stops the background log writer"]
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

/// Initialize the logging system with the given configuration.
///
/// Returns without error if a global subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<LogGuard> {
    if tracing::dispatcher::has_been_set() {
        return Ok(LogGuard::default());
    }

    let (writer, guard) = match (&config.file, config.stdout) {
        (Some(path), false) => {
            let (writer, guard) = create_non_blocking_file(path)?;
            (BoxMakeWriter::new(writer), Some(guard))
        }
        (_, true) => (BoxMakeWriter::new(std::io::stdout), None),
        (None, false) => return Ok(LogGuard::default()),
    };

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(to_tracing_level(config.level)).into())
        .with_env_var(LOG_ENV_VAR)
        .from_env_lossy();

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(true)
        .with_line_number(true);

    let result = match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Default => builder.try_init(),
    };
    result.map_err(|e| LogError::SubscriberError(e.to_string()))?;

    if config.file.is_some() && config.stdout {
        tracing::warn!("Both stdout and a log file are configured; logging to stdout only");
    }

    Ok(LogGuard { _file: guard })
}

/// Create a non-blocking file writer.
fn create_non_blocking_file(path: impl AsRef<Path>) -> Result<(NonBlocking, WorkerGuard)> {
    let path = path.as_ref();
    let file_name = path
        .file_name()
        .ok_or_else(|| LogError::SubscriberError(format!("{} is not a file", path.display())))?;
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(directory)?;

    let file_appender = tracing_appender::rolling::never(directory, file_name);
    Ok(tracing_appender::non_blocking(file_appender))
}

/// Parse a log level string into a LogLevel enum.
pub fn parse_log_level(level: &str) -> Result<LogLevel> {
    level.parse().map_err(LogError::InvalidLogLevel)
}

/// Convert a tracing::Level to a LogLevel enum.
pub fn level_to_log_level(level: Level) -> LogLevel {
    match level {
        Level::TRACE => LogLevel::Trace,
        Level::DEBUG => LogLevel::Debug,
        Level::INFO => LogLevel::Info,
        Level::WARN => LogLevel::Warn,
        Level::ERROR => LogLevel::Error,
    }
}

/// Convert a LogLevel to a tracing::Level.
pub fn to_tracing_level(level: LogLevel) -> Level {
    match level {
        LogLevel::Trace => Level::TRACE,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Info => Level::INFO,
        LogLevel::Warn => Level::WARN,
        LogLevel::Error => Level::ERROR,
    }
}
