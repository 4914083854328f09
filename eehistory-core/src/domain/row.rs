//! Raw and classified export rows

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::category::{classify, RowCategory};
use super::result::{Error, Result};

/// Header labels every transaction history export starts with
pub const EXPECTED_HEADER: [&str; 3] = ["Date", "Comment", "Debit/Credit"];

/// One spreadsheet line as exposed by a row source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    /// 1-based line number in the source sheet (the header is line 1)
    pub line: usize,
    /// `None` marks a structurally empty row
    pub date: Option<NaiveDate>,
    pub comment: String,
    pub amount: Decimal,
}

impl RawRow {
    pub fn new(line: usize, date: Option<NaiveDate>, comment: &str, amount: Decimal) -> Self {
        Self {
            line,
            date,
            comment: normalize_text(comment),
            amount,
        }
    }

    /// Whether the row is structurally empty and never reaches the classifier
    pub fn is_empty(&self) -> bool {
        self.date.is_none()
    }
}

/// A non-empty row with its category computed once
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedRow {
    pub line: usize,
    pub date: NaiveDate,
    pub comment: String,
    pub amount: Decimal,
    pub category: Option<RowCategory>,
}

impl ClassifiedRow {
    /// Classify a raw row. Returns `None` for structurally empty rows.
    pub fn from_raw(raw: RawRow) -> Option<Self> {
        let date = raw.date?;
        let category = classify(&raw.comment);
        Some(Self {
            line: raw.line,
            date,
            comment: raw.comment,
            amount: raw.amount,
            category,
        })
    }

    pub fn is(&self, category: RowCategory) -> bool {
        self.category == Some(category)
    }

    /// Fail unless the row carries `expected`
    pub fn require(&self, expected: RowCategory) -> Result<&Self> {
        if self.is(expected) {
            Ok(self)
        } else {
            Err(Error::text_pattern(
                self.line,
                &self.comment,
                format!("not a {} row", expected),
            ))
        }
    }

    /// Comment split on whitespace
    pub fn tokens(&self) -> Vec<&str> {
        self.comment.split_whitespace().collect()
    }

    /// Category name for messages, including the unrecognized case
    pub fn category_name(&self) -> String {
        self.category
            .map(|c| c.to_string())
            .unwrap_or_else(|| "unrecognized".to_string())
    }
}

/// Replace non-breaking spaces with ordinary spaces
pub fn normalize_text(text: &str) -> String {
    text.replace('\u{a0}', " ")
}

/// Check the first three header cells against [`EXPECTED_HEADER`]
pub fn validate_header(header: &[String]) -> Result<()> {
    let matches = header.len() >= EXPECTED_HEADER.len()
        && header
            .iter()
            .zip(EXPECTED_HEADER.iter())
            .all(|(found, expected)| found.trim() == *expected);

    if matches {
        Ok(())
    } else {
        Err(Error::HeaderMismatch {
            expected: EXPECTED_HEADER.iter().map(|s| s.to_string()).collect(),
            found: header.iter().take(EXPECTED_HEADER.len()).cloned().collect(),
        })
    }
}
