/// Body of the greeting returned by `GET /`
pub const WELCOME_MESSAGE: &str = "Welcome to the SQLBreeze API Service";

/// URL prefix the SQL endpoints are mounted under unless configured otherwise
pub const DEFAULT_PREFIX: &str = "/sqlbreeze";

pub const DEFAULT_HOST: &str = "0.0.0.0";

pub const DEFAULT_PORT: u16 = 8000;

/// Directory for rolling log files
pub const DEFAULT_LOG_DIRECTORY: &str = "logs";

/// File name prefix for rolling log files
pub const LOG_FILE_NAME: &str = "sqlbreeze.log";
