//! History service - parse a transaction history export into records

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::assembler::{Assembler, RowCursor, Step};
use crate::domain::extract;
use crate::domain::result::Result;
use crate::domain::{
    default_cutoff_date, validate_header, ClassifiedRow, RowCategory, TradeAction,
    TransactionRecord,
};
use crate::ports::RowSource;

/// Options for one parse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Recurring purchases dated on or after this carry a recurring fee row
    pub cutoff_date: NaiveDate,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            cutoff_date: default_cutoff_date(),
        }
    }
}

/// Counters describing a completed parse
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParseReport {
    /// Row source kind ("xlsx", "csv", ...)
    pub source: String,
    /// Data rows read, empty rows included
    pub rows_read: usize,
    /// Rows dropped for having no date
    pub empty_rows: usize,
    /// Lines of rows that opened no group and were discarded
    pub skipped_lines: Vec<usize>,
    /// Records emitted
    pub records: usize,
}

/// Records in export order plus the parse report
#[derive(Debug, Clone, Serialize)]
pub struct ParsedHistory {
    pub records: Vec<TransactionRecord>,
    pub report: ParseReport,
}

/// One row as seen by the classifier and extractors
#[derive(Debug, Clone, Serialize)]
pub struct RowInspection {
    pub line: usize,
    pub date: NaiveDate,
    pub comment: String,
    pub amount: Decimal,
    pub category: Option<RowCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<TradeAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units_delta: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fund_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commission_rate: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instruction_id: Option<u64>,
    /// First extraction failure, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem: Option<String>,
}

/// Stream driver over a row source
pub struct HistoryService {
    options: ParseOptions,
}

impl Default for HistoryService {
    fn default() -> Self {
        Self::new(ParseOptions::default())
    }
}

impl HistoryService {
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parse every transaction group in the source
    ///
    /// Any malformed group aborts the whole parse.
    pub fn parse(&self, source: &dyn RowSource) -> Result<ParsedHistory> {
        let sheet = source.read_rows()?;
        validate_header(&sheet.header)?;

        let rows_read = sheet.rows.len();
        let classified: Vec<ClassifiedRow> = sheet
            .rows
            .into_iter()
            .filter_map(ClassifiedRow::from_raw)
            .collect();

        let mut report = ParseReport {
            source: source.name().to_string(),
            rows_read,
            empty_rows: rows_read - classified.len(),
            ..Default::default()
        };

        let assembler = Assembler::new(self.options.cutoff_date);
        let mut cursor = RowCursor::new(classified);
        let mut records = Vec::new();

        loop {
            match assembler.step(&mut cursor)? {
                Step::Record(record) => records.push(record),
                Step::Skipped(line) => report.skipped_lines.push(line),
                Step::End => break,
            }
        }

        report.records = records.len();
        Ok(ParsedHistory { records, report })
    }

    /// Classify every non-empty row and run the matching extractors
    pub fn inspect(&self, source: &dyn RowSource) -> Result<Vec<RowInspection>> {
        let sheet = source.read_rows()?;
        validate_header(&sheet.header)?;

        Ok(sheet
            .rows
            .into_iter()
            .filter_map(ClassifiedRow::from_raw)
            .map(|row| inspect_row(&row))
            .collect())
    }
}

fn inspect_row(row: &ClassifiedRow) -> RowInspection {
    let mut inspection = RowInspection {
        line: row.line,
        date: row.date,
        comment: row.comment.clone(),
        amount: row.amount,
        category: row.category,
        action: None,
        units_delta: None,
        price: None,
        fund_name: None,
        commission_rate: None,
        instruction_id: None,
        problem: None,
    };

    let mut problems = Vec::new();
    match row.category {
        Some(RowCategory::BuyOrSell) => {
            inspection.action = collect(&mut problems, extract::action(row));
            inspection.units_delta = collect(&mut problems, extract::units_delta(row));
            inspection.price = collect(&mut problems, extract::price(row));
            inspection.fund_name = collect(&mut problems, extract::fund_name(row));
        }
        Some(RowCategory::BrokerCommission) => {
            inspection.commission_rate =
                collect(&mut problems, extract::broker_commission_rate(row));
            inspection.fund_name =
                collect(&mut problems, extract::broker_commission_fund_name(row));
        }
        Some(RowCategory::RecurringRelease) => {
            inspection.instruction_id =
                collect(&mut problems, extract::recurring_instruction_id(row));
        }
        _ => {}
    }

    inspection.problem = problems.into_iter().next();
    inspection
}

/// Keep the value, or remember why extraction failed
fn collect<T>(problems: &mut Vec<String>, result: Result<T>) -> Option<T> {
    result.map_err(|e| problems.push(e.to_string())).ok()
}
