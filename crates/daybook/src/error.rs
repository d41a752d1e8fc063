//! Error types for the Journal.

use daybook_core::{DateKey, ValidationError};
use daybook_store::StoreError;
use thiserror::Error;

/// Errors that can occur during Journal operations.
#[derive(Debug, Error)]
pub enum JournalError {
    /// Validation error.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// The record is past its freeze boundary and cannot change.
    #[error("record {0} is finalized and cannot be modified")]
    RecordFrozen(DateKey),

    /// No record exists for the date.
    #[error("no record for {0}")]
    RecordNotFound(DateKey),
}

/// Result type for Journal operations.
pub type Result<T> = std::result::Result<T, JournalError>;
