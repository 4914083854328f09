//! Result and error types for the core library

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::category::RowCategory;

/// Core library error type
///
/// Every variant is fatal to a parse. There is no partial-result mode.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Row {line}: invalid {column} cell: {detail}")]
    InvalidCell {
        line: usize,
        column: &'static str,
        detail: String,
    },

    #[error("Header mismatch: expected {expected:?}, found {found:?}")]
    HeaderMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("Row {line}: expected a {expected} row, found {found}")]
    UnexpectedRow {
        line: usize,
        expected: RowCategory,
        found: String,
    },

    #[error(
        "Input ended inside the {template} group starting at row {start_line}: missing {expected} row"
    )]
    UnexpectedEnd {
        start_line: usize,
        template: &'static str,
        expected: RowCategory,
    },

    #[error("Row {line}: {message} in {comment:?}")]
    TextPattern {
        line: usize,
        message: String,
        comment: String,
    },

    #[error("Row {line}: date {found} differs from {expected} of the group starting at row {start_line}")]
    DateMismatch {
        start_line: usize,
        line: usize,
        expected: NaiveDate,
        found: NaiveDate,
    },

    #[error("Workbook error: {0}")]
    Workbook(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a text pattern error for a row comment
    pub fn text_pattern(line: usize, comment: &str, msg: impl Into<String>) -> Self {
        Self::TextPattern {
            line,
            message: msg.into(),
            comment: comment.to_string(),
        }
    }

    /// Create a workbook error
    pub fn workbook(msg: impl Into<String>) -> Self {
        Self::Workbook(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Short stable name of the error family, used by the event log
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidCell { .. }
            | Error::HeaderMismatch { .. }
            | Error::UnexpectedRow { .. }
            | Error::UnexpectedEnd { .. } => "schema",
            Error::TextPattern { .. } => "text_pattern",
            Error::DateMismatch { .. } => "date_consistency",
            Error::Workbook(_) | Error::Io(_) | Error::Csv(_) | Error::Json(_) => "source",
            Error::Config(_) => "config",
        }
    }

    /// Message safe for the event log
    ///
    /// Keeps line numbers and categories. Comments and cell values are dropped,
    /// they can hold amounts and fund names.
    pub fn log_message(&self) -> String {
        match self {
            Error::InvalidCell { line, column, .. } => {
                format!("Row {}: invalid {} cell", line, column)
            }
            Error::TextPattern { line, .. } => format!("Row {}: unexpected comment text", line),
            Error::HeaderMismatch { .. }
            | Error::UnexpectedRow { .. }
            | Error::UnexpectedEnd { .. }
            | Error::DateMismatch { .. } => self.to_string(),
            Error::Workbook(_) | Error::Io(_) | Error::Csv(_) | Error::Json(_) => {
                "Could not read the export".to_string()
            }
            Error::Config(_) => self.to_string(),
        }
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

/// Operation result with optional context (for JSON output)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub context: Option<HashMap<String, serde_json::Value>>,
}

impl<T> OperationResult<T> {
    /// Create a successful result
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            context: None,
        }
    }

    /// Create a successful result with context
    pub fn ok_with_context(data: T, context: HashMap<String, serde_json::Value>) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            context: Some(context),
        }
    }

    /// Create a failed result
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            context: None,
        }
    }

    /// Create a failed result with context
    pub fn fail_with_context(
        error: impl Into<String>,
        context: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            context: Some(context),
        }
    }
}

impl<T> From<Result<T>> for OperationResult<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => {
                let mut context = HashMap::new();
                context.insert("kind".to_string(), serde_json::Value::from(e.kind()));
                Self::fail_with_context(e.to_string(), context)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_result_ok() {
        let result: OperationResult<i32> = OperationResult::ok(42);
        assert!(result.success);
        assert_eq!(result.data, Some(42));
        assert!(result.error.is_none());
    }

    #[test]
    fn test_operation_result_fail() {
        let result: OperationResult<i32> = OperationResult::fail("Something went wrong");
        assert!(!result.success);
        assert!(result.data.is_none());
        assert_eq!(result.error, Some("Something went wrong".to_string()));
    }

    #[test]
    fn test_from_result_carries_error_kind() {
        let ok: Result<i32> = Ok(42);
        let result: OperationResult<i32> = ok.into();
        assert!(result.success);

        let err: Result<i32> = Err(Error::text_pattern(7, "Bought FUND", "missing '@'"));
        let result: OperationResult<i32> = err.into();
        assert!(!result.success);
        assert!(result.error.as_deref().unwrap().contains("Row 7"));
        let context = result.context.unwrap();
        assert_eq!(context["kind"], serde_json::json!("text_pattern"));
    }

    #[test]
    fn test_log_message_drops_comment_text() {
        let err = Error::text_pattern(2, "Bought Secret Fund 1 @ ten", "invalid price \"ten\"");
        assert!(err.to_string().contains("Secret Fund"));

        let logged = err.log_message();
        assert_eq!(logged, "Row 2: unexpected comment text");
        assert!(!logged.contains("ten"));

        let cell = Error::InvalidCell {
            line: 5,
            column: "amount",
            detail: "\"1,234.56 ZAR\"".to_string(),
        };
        assert_eq!(cell.kind(), "schema");
        assert_eq!(cell.log_message(), "Row 5: invalid amount cell");
    }

    #[test]
    fn test_error_kinds() {
        let date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let mismatch = Error::DateMismatch {
            start_line: 2,
            line: 4,
            expected: date,
            found: date.succ_opt().unwrap(),
        };
        assert_eq!(mismatch.kind(), "date_consistency");
        assert_eq!(
            Error::InvalidCell {
                line: 3,
                column: "date",
                detail: "\"soon\"".to_string(),
            }
            .kind(),
            "schema"
        );
        assert_eq!(
            Error::UnexpectedEnd {
                start_line: 1,
                template: "trade",
                expected: RowCategory::VatOnCosts,
            }
            .kind(),
            "schema"
        );
        assert_eq!(Error::workbook("missing sheet").kind(), "source");
    }
}
