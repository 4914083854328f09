//! EasyEquities history core - turn a transaction history export into
//! structured trade and recurring purchase records
//!
//! This crate follows hexagonal architecture:
//!
//! - **domain**: Rows, categories, fees and transaction records
//! - **ports**: Trait definitions for external dependencies (RowSource)
//! - **services**: Group assembly, history parsing and event logging
//! - **adapters**: Concrete row sources (xlsx, csv, in-memory)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

mod log_migrations;

use std::path::Path;

use config::Config;
use domain::result::Result;

// Re-export commonly used types at crate root
pub use domain::result::{Error, OperationResult};
pub use domain::{
    Fee, FeeKind, FeeName, RowCategory, SchemaEra, Trade, TradeAction, TradeFees,
    TransactionRecord,
};
pub use ports::{RowSource, SheetRows};
pub use services::{
    HistoryService, LogEntry, LogEvent, LoggingService, ParseOptions, ParseReport,
    ParsedHistory, RowInspection,
};

/// Parse an export file using the configured sheet and cutoff date
pub fn parse_file(path: &Path, config: &Config) -> Result<ParsedHistory> {
    let source = adapters::open_source(path, config)?;
    HistoryService::new(config.parse_options()).parse(source.as_ref())
}
