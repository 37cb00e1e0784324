use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::constants::LOG_FILE_NAME;

/// Initialize the logging system from the logging configuration.
/// When file logging is enabled, logs are also written to daily rotating
/// files in the configured directory.
///
/// # Arguments
///
/// * `config` - Filter directive, file toggle and log directory
///
/// # Example
///
/// ```ignore
/// init_logging(&LoggingConfig::default());
/// ```
pub fn init_logging(config: &LoggingConfig) {
    let filter = match EnvFilter::try_new(&config.level) {
        Ok(f) => f,
        Err(_) => {
            eprintln!("Invalid log level '{}', defaulting to 'info'", config.level);
            EnvFilter::new("info")
        }
    };

    let stdout_layer = fmt::layer().with_line_number(true);

    if config.file {
        let file_appender =
            RollingFileAppender::new(Rotation::DAILY, &config.directory, LOG_FILE_NAME);

        let file_layer = fmt::layer()
            .with_line_number(true)
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(filter)
            .with(stdout_layer)
            .with(file_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(stdout_layer)
            .init();
    }
}
