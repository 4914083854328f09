//! Core domain entities
//!
//! Rows, categories, fees and reconstructed records, plus the pure
//! classification and extraction logic. No I/O happens here.

mod category;
pub mod extract;
mod fee;
mod row;
mod transaction;
pub mod result;

pub use category::{classify, RowCategory};
pub use fee::{Fee, FeeKind, FeeName, TradeFees};
pub use row::{normalize_text, validate_header, ClassifiedRow, RawRow, EXPECTED_HEADER};
pub use transaction::{
    default_cutoff_date, SchemaEra, Trade, TradeAction, TransactionRecord, SCHEMA_CUTOFF_DATE,
};
