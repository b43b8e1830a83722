//! Error types for nutrisync
//!
//! Only structural failures surface as errors: a byte buffer that is not
//! valid UTF-8, or a CSV stream the reader cannot make sense of. Malformed
//! data inside a readable file (bad dates, non-numeric nutrition values)
//! is degraded row-by-row and field-by-field instead, never raised.

use thiserror::Error;

/// Errors that can occur while ingesting an export file
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Export file is not valid UTF-8: {0}")]
    Decode(#[from] std::str::Utf8Error),

    #[error("Unreadable CSV stream: {0}")]
    Csv(#[from] csv::Error),
}
