use std::fs;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LoggingConfig;
use crate::utils::error::{AppError, Result};

/// Build the filter from `RUST_LOG`, falling back to the configured level.
pub fn env_filter(level: &str) -> Result<EnvFilter> {
    let directive: Directive = level
        .parse()
        .map_err(|e| AppError::Validation(format!("invalid log level '{}': {}", level, e)))?;
    Ok(EnvFilter::builder()
        .with_default_directive(directive)
        .from_env_lossy())
}

/// Install console and file logging.
///
/// The active log file is truncated on startup; older files are left for
/// [`LogJanitor`](crate::housekeeping::LogJanitor). Keep the returned guard
/// alive for the lifetime of the process so buffered lines get flushed.
pub fn init(config: &LoggingConfig) -> Result<WorkerGuard> {
    fs::create_dir_all(&config.directory)?;
    fs::File::create(config.current_file())?;

    let file_appender = tracing_appender::rolling::never(&config.directory, &config.file_name);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(env_filter(&config.level)?)
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(file_writer),
        )
        .try_init()
        .map_err(|e| AppError::Internal(format!("failed to install logger: {}", e)))?;

    Ok(guard)
}
