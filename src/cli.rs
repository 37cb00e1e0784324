use clap::Parser;

/// Command line interface for the application
#[derive(Parser, Debug)]
#[command(name = "sqlbreeze", about = "HTTP service for transpiling, formatting and inspecting SQL")]
pub struct Cli {
    /// Path to a YAML file with server and logging settings
    #[arg(short, long, env = "SQLBREEZE_CONFIG")]
    pub config: Option<String>,

    /// Address to bind the HTTP server to
    #[arg(long, env = "SQLBREEZE_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "SQLBREEZE_PORT")]
    pub port: Option<u16>,

    /// URL prefix for the SQL endpoints
    #[arg(long, env = "SQLBREEZE_PREFIX")]
    pub prefix: Option<String>,

    /// Sets the logging verbosity level for the application
    /// Possible values: "error", "warn", "info", "debug", "trace"
    /// Overrides the configuration file; defaults to "info"
    #[arg(long)]
    pub logging_level: Option<String>,

    /// Also write logs to a daily rotating file
    #[arg(long)]
    pub log_file: bool,
}
