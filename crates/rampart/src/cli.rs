//! Command-line arguments.

use clap::Parser;

/// Rampart - form submission gatekeeper
#[derive(Parser, Debug)]
#[command(name = "rampart")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/rampart.toml")]
    pub config: String,

    /// Listen address (overrides config)
    #[arg(short, long, env = "LISTEN_ADDR")]
    pub listen: Option<String>,

    /// Local store file (overrides config)
    #[arg(long, env = "RAMPART_STORAGE_PATH")]
    pub storage_path: Option<String>,

    /// Keep submission records in memory only
    #[arg(long, default_value = "false")]
    pub ephemeral: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "LOG_LEVEL")]
    pub log_level: String,

    /// Enable JSON logging output
    #[arg(long, default_value = "false")]
    pub json_logs: bool,
}
