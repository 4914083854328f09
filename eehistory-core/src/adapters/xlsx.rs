//! XLSX row source for transaction history workbooks

use std::path::{Path, PathBuf};

use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use chrono::{Duration, NaiveDate};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use super::csv::{parse_amount, parse_date};
use crate::domain::result::{Error, Result};
use crate::domain::RawRow;
use crate::ports::{RowSource, SheetRows};

/// Worksheet name used by transaction history exports
pub const DEFAULT_SHEET_NAME: &str = "Transaction History";

pub struct XlsxRowSource {
    path: PathBuf,
    sheet_name: String,
}

impl XlsxRowSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
        }
    }

    pub fn with_sheet(mut self, sheet_name: impl Into<String>) -> Self {
        self.sheet_name = sheet_name.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }
}

impl RowSource for XlsxRowSource {
    fn name(&self) -> &str {
        "xlsx"
    }

    fn read_rows(&self) -> Result<SheetRows> {
        let mut workbook: Xlsx<_> = open_workbook(&self.path).map_err(|e| {
            Error::workbook(format!("cannot open {}: {}", self.path.display(), e))
        })?;

        let range = workbook.worksheet_range(&self.sheet_name).map_err(|e| {
            Error::workbook(format!("sheet '{}' not readable: {}", self.sheet_name, e))
        })?;

        sheet_rows_from_range(&range)
    }
}

/// Convert a worksheet range into sheet rows. The first row is the header.
pub fn sheet_rows_from_range(range: &Range<Data>) -> Result<SheetRows> {
    // Line numbers follow the sheet, not the used range
    let first_line = range.start().map(|(row, _)| row as usize + 1).unwrap_or(1);
    let mut rows_iter = range.rows();

    let header = match rows_iter.next() {
        Some(cells) => cells.iter().map(|c| cell_str(Some(c)).unwrap_or_default()).collect(),
        None => return Ok(SheetRows::default()),
    };

    let mut rows = Vec::new();
    for (idx, cells) in rows_iter.enumerate() {
        let line = first_line + idx + 1;
        rows.push(raw_row_from_cells(line, cells)?);
    }

    Ok(SheetRows { header, rows })
}

fn raw_row_from_cells(line: usize, cells: &[Data]) -> Result<RawRow> {
    let date = parse_excel_date(cells.first()).map_err(|detail| Error::InvalidCell {
        line,
        column: "date",
        detail,
    })?;
    let comment = cell_str(cells.get(1)).unwrap_or_default();

    let Some(date) = date else {
        return Ok(RawRow::new(line, None, &comment, Decimal::ZERO));
    };

    let amount = cell_decimal(cells.get(2)).ok_or_else(|| Error::InvalidCell {
        line,
        column: "amount",
        detail: "missing or not a number".to_string(),
    })?;

    Ok(RawRow::new(line, Some(date), &comment, amount))
}

fn cell_str(cell: Option<&Data>) -> Option<String> {
    let c = cell?;
    match c {
        Data::String(s) => Some(s.clone()),
        Data::Float(f) => Some(f.to_string()),
        Data::Int(i) => Some(i.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        Data::Empty => None,
        _ => Some(c.to_string()),
    }
}

/// `Ok(None)` for an empty date cell.
///
/// Dates may come as Excel date-times, serial numbers or date strings.
fn parse_excel_date(cell: Option<&Data>) -> std::result::Result<Option<NaiveDate>, String> {
    let Some(c) = cell else {
        return Ok(None);
    };

    match c {
        Data::Empty => Ok(None),
        Data::String(s) if s.trim().is_empty() => Ok(None),
        Data::Float(f) => excel_serial_to_date(*f).map(Some),
        Data::Int(i) => excel_serial_to_date(*i as f64).map(Some),
        Data::DateTime(dt) => excel_serial_to_date(dt.as_f64()).map(Some),
        Data::String(s) | Data::DateTimeIso(s) => parse_date(s)
            .map(Some)
            .ok_or_else(|| format!("unsupported date {:?}", s)),
        other => Err(format!("unsupported date cell {:?}", other)),
    }
}

/// Excel serial date conversion using the 1899-12-30 base
fn excel_serial_to_date(v: f64) -> std::result::Result<NaiveDate, String> {
    if !v.is_finite() {
        return Err("non-finite excel date".to_string());
    }
    let base = NaiveDate::from_ymd_opt(1899, 12, 30).ok_or("bad base date")?;
    Duration::try_days(v.floor() as i64)
        .and_then(|offset| base.checked_add_signed(offset))
        .ok_or_else(|| format!("excel date {} out of range", v))
}

fn cell_decimal(cell: Option<&Data>) -> Option<Decimal> {
    match cell? {
        Data::Float(f) => Decimal::from_f64(*f),
        Data::Int(i) => Some(Decimal::from(*i)),
        Data::String(s) => parse_amount(s),
        _ => None,
    }
}
