//! Row source port
//!
//! Defines the interface for reading an exported transaction history sheet
//! (xlsx workbook, CSV export, in-memory fixtures, etc.)

use crate::domain::result::Result;
use crate::domain::RawRow;

/// Rows of one transaction history sheet
#[derive(Debug, Clone, Default)]
pub struct SheetRows {
    /// Header cells as found in the first line
    pub header: Vec<String>,
    /// Data rows in source order, empty rows included
    pub rows: Vec<RawRow>,
}

/// Ordered, finite source of export rows
///
/// Implementations only convert cells. Header checks, empty-row filtering
/// and grouping all happen in the history service.
pub trait RowSource {
    /// Source kind (e.g., "xlsx", "csv")
    fn name(&self) -> &str;

    /// Read the header and every data row
    fn read_rows(&self) -> Result<SheetRows>;
}
