//! CSV row source for transaction history sheets saved as CSV

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use crate::domain::result::{Error, Result};
use crate::domain::RawRow;
use crate::ports::{RowSource, SheetRows};

pub struct CsvRowSource {
    path: PathBuf,
}

impl CsvRowSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RowSource for CsvRowSource {
    fn name(&self) -> &str {
        "csv"
    }

    fn read_rows(&self) -> Result<SheetRows> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&self.path)?;

        let mut records = reader.records();
        let header = match records.next() {
            Some(record) => record?
                .iter()
                .map(|cell| cell.trim_start_matches('\u{feff}').to_string())
                .collect(),
            None => return Ok(SheetRows::default()),
        };

        let mut rows = Vec::new();
        for (idx, record) in records.enumerate() {
            let record = record?;
            // Sheet line of the record start; blank lines are skipped by the reader
            let line = record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(idx + 2);
            rows.push(raw_row_from_text(
                line,
                record.get(0).unwrap_or(""),
                record.get(1).unwrap_or(""),
                record.get(2).unwrap_or(""),
            )?);
        }

        Ok(SheetRows { header, rows })
    }
}

/// Build a raw row from text cells.
///
/// An empty date marks a structurally empty row; its other cells are ignored.
pub(crate) fn raw_row_from_text(
    line: usize,
    date: &str,
    comment: &str,
    amount: &str,
) -> Result<RawRow> {
    if date.trim().is_empty() {
        return Ok(RawRow::new(line, None, comment, Decimal::ZERO));
    }

    let date = parse_date(date).ok_or_else(|| Error::InvalidCell {
        line,
        column: "date",
        detail: format!("{:?}", date),
    })?;
    let amount = parse_amount(amount).ok_or_else(|| Error::InvalidCell {
        line,
        column: "amount",
        detail: format!("{:?}", amount),
    })?;

    Ok(RawRow::new(line, Some(date), comment, amount))
}

pub(crate) fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();

    let datetime_formats = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y/%m/%d %H:%M:%S"];
    for fmt in &datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    let formats = [
        "%Y-%m-%d",
        "%Y/%m/%d",
        "%d/%m/%Y",
        "%d-%m-%Y",
        "%d %b %Y",
        "%d %B %Y",
    ];
    for fmt in &formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }
    None
}

pub(crate) fn parse_amount(s: &str) -> Option<Decimal> {
    let s = s.trim();

    // Parentheses notation for negative numbers: (100.00) -> -100.00
    let (is_negative, s) = if s.starts_with('(') && s.ends_with(')') {
        (true, &s[1..s.len() - 1])
    } else {
        (false, s)
    };

    // Drop currency symbols, thousands separators and whitespace
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    let mut amount: Decimal = cleaned.parse().ok()?;

    if is_negative && amount > Decimal::ZERO {
        amount = -amount;
    }

    Some(amount)
}
