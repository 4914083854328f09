//! Adapter implementations
//!
//! Adapters implement the RowSource port with concrete file formats:
//! - calamine for `.xlsx` workbooks
//! - csv for sheets saved as CSV
//! - in-memory rows for tests and embedding

pub mod csv;
pub mod memory;
pub mod xlsx;

use std::path::Path;

use crate::config::Config;
use crate::domain::result::{Error, Result};
use crate::ports::RowSource;

/// Pick a row source from the file extension
pub fn open_source(path: &Path, config: &Config) -> Result<Box<dyn RowSource>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "xlsx" | "xlsm" => Ok(Box::new(
            self::xlsx::XlsxRowSource::new(path).with_sheet(config.sheet_name.clone()),
        )),
        "csv" => Ok(Box::new(self::csv::CsvRowSource::new(path))),
        other => Err(Error::config(format!(
            "unsupported export format '{}' for {}",
            other,
            path.display()
        ))),
    }
}
