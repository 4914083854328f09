//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case or feature area.

mod assembler;
mod history;
pub mod logging;

pub use assembler::{Assembler, RowCursor, Step};
pub use history::{HistoryService, ParseOptions, ParseReport, ParsedHistory, RowInspection};
pub use logging::{LogEntry, LogEvent, LoggingService};
