//! Diagnostic logging.
//!
//! Nothing is installed unless the front end asks for it, so library code and
//! tests emit into an inert `tracing` dispatcher by default.

mod init;
pub use init::{init_logging, parse_level};
use std::path::PathBuf;
use tracing::Level;

/// Configuration for the logging system.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: Level,
    pub json_format: bool,
    /// Extra sink next to stderr; written without ANSI colours.
    pub log_file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::DEBUG,
            json_format: false,
            log_file: None,
        }
    }
}
