//! CLI command implementations

pub mod config;
pub mod inspect;
pub mod logs;
pub mod parse;

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use eehistory_core::config::{parse_cutoff, Config};
use eehistory_core::{LogEvent, LoggingService};

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<LoggingService> {
    let data_dir = get_data_dir().ok()?;
    std::fs::create_dir_all(&data_dir).ok()?;
    LoggingService::new(&data_dir, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Get the data directory from environment or default
pub fn get_data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("EEHISTORY_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".eehistory"))
        .ok_or_else(|| anyhow!("Could not find home directory, set EEHISTORY_DIR"))
}

/// Load settings and apply command-line overrides
pub fn resolve_config(sheet: Option<String>, cutoff: Option<&str>) -> Result<Config> {
    let data_dir = get_data_dir()?;
    let mut config = Config::load(&data_dir)
        .with_context(|| format!("Failed to load settings from {}", data_dir.display()))?;

    if let Some(sheet) = sheet {
        config.sheet_name = sheet;
    }
    if let Some(cutoff) = cutoff {
        config.cutoff_date = parse_cutoff(cutoff)?;
    }
    Ok(config)
}
