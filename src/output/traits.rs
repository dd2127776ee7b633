//! Output sink trait and error types
//!
//! This module defines the interface shared by every product sink.

use crate::product::ProductRecord;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to serialize products: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Destination for harvested product records
///
/// Sinks receive the complete, immutable result set once crawling has ended.
pub trait ProductSink {
    /// Writes every record to the sink
    ///
    /// # Arguments
    ///
    /// * `records` - The harvested records, in collection order
    fn write_products(&mut self, records: &[ProductRecord]) -> OutputResult<()>;
}
