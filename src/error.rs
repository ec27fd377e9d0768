//! Error types for price_tracker
//!
//! Only structural failures live here. Unparseable prices, dates and
//! promotions degrade to `None`/`0.0` inside the parsers, and rejected
//! listings are counted by the ingestor instead of being raised.

use thiserror::Error;

/// Unified error type for snapshot and source operations
#[derive(Debug, Error)]
pub enum PriceError {
    /// File could not be opened, written or renamed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Malformed delimited data (bad quoting, invalid UTF-8, ...)
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// Header row does not match the fixed snapshot columns
    #[error("schema mismatch: expected header [{expected}], found [{found}]")]
    SchemaMismatch { expected: String, found: String },
    /// A source adapter task panicked or was cancelled
    #[error("source '{source_name}' failed: {reason}")]
    SourceTask { source_name: String, reason: String },
}

/// Result alias for price_tracker operations
pub type Result<T> = std::result::Result<T, PriceError>;
