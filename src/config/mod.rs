mod parser;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::cli::Cli;
use crate::constants::{DEFAULT_HOST, DEFAULT_LOG_DIRECTORY, DEFAULT_PORT, DEFAULT_PREFIX};
use crate::errors::{Error, Result};

pub use parser::load_service_config;

/// Main configuration structure for the service
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ServiceConfig {
    /// HTTP listener and routing settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Configuration for the HTTP server
#[derive(Debug, Deserialize, Clone, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// URL prefix the SQL routes are mounted under
    pub prefix: String,
    /// Whether to allow cross-origin requests from anywhere
    pub cors: bool,
    /// Per-request timeout, in humantime format (e.g. "30s")
    pub request_timeout: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            prefix: DEFAULT_PREFIX.to_string(),
            cors: true,
            request_timeout: "30s".to_string(),
        }
    }
}

impl ServerConfig {
    /// Address string suitable for binding a listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn timeout(&self) -> Result<Duration> {
        humantime::parse_duration(&self.request_timeout).map_err(|e| {
            Error::Unexpected(format!(
                "Invalid request_timeout '{}': {}",
                self.request_timeout, e
            ))
        })
    }
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, e.g. "info" or "sqlbreeze=debug"
    pub level: String,
    /// Whether to also write to a daily rolling file
    pub file: bool,
    /// Directory for the rolling log files
    pub directory: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            file: false,
            directory: DEFAULT_LOG_DIRECTORY.to_string(),
        }
    }
}

impl ServiceConfig {
    /// Applies command line overrides on top of the file configuration.
    pub fn with_overrides(mut self, cli: &Cli) -> Self {
        if let Some(host) = &cli.host {
            self.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            self.server.port = port;
        }
        if let Some(prefix) = &cli.prefix {
            self.server.prefix = prefix.clone();
        }
        if let Some(level) = &cli.logging_level {
            self.logging.level = level.clone();
        }
        if cli.log_file {
            self.logging.file = true;
        }
        self.server.prefix = normalize_prefix(&self.server.prefix);
        self
    }
}

/// Ensures a leading slash and no trailing slash; blank means the root.
pub fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}
