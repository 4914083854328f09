//! In-memory row source
//!
//! Holds rows that were already read elsewhere. Used by tests and by callers
//! that embed the parser behind their own spreadsheet reader.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::domain::result::Result;
use crate::domain::{RawRow, EXPECTED_HEADER};
use crate::ports::{RowSource, SheetRows};

#[derive(Debug, Clone)]
pub struct InMemoryRowSource {
    header: Vec<String>,
    rows: Vec<RawRow>,
}

impl Default for InMemoryRowSource {
    fn default() -> Self {
        Self {
            header: EXPECTED_HEADER.iter().map(|s| s.to_string()).collect(),
            rows: Vec::new(),
        }
    }
}

impl InMemoryRowSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header(mut self, header: &[&str]) -> Self {
        self.header = header.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Append a row, numbering lines after the header
    pub fn push(&mut self, date: Option<NaiveDate>, comment: &str, amount: Decimal) -> &mut Self {
        let line = self.rows.len() + 2;
        self.rows.push(RawRow::new(line, date, comment, amount));
        self
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl RowSource for InMemoryRowSource {
    fn name(&self) -> &str {
        "memory"
    }

    fn read_rows(&self) -> Result<SheetRows> {
        Ok(SheetRows {
            header: self.header.clone(),
            rows: self.rows.clone(),
        })
    }
}
