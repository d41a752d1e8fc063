//! Error types for Daybook Core.

use thiserror::Error;

/// Core errors that can occur while working with records and digests.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid date key: {0}")]
    InvalidDateKey(String),

    #[error("invalid digest: {0}")]
    InvalidDigest(String),

    #[error("encoding error: {0}")]
    EncodingError(String),
}

/// Validation errors for record structure.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("note exceeds {max} characters (got {len})")]
    NoteTooLong { len: usize, max: usize },

    #[error("record has {count} photos, maximum is {max}")]
    TooManyPhotos { count: usize, max: usize },

    #[error("invalid date key: {0}")]
    InvalidDateKey(String),

    #[error("photo {id} has an invalid sha256 digest")]
    InvalidPhotoDigest { id: String },

    #[error("photo {id} has unsupported mime type {mime}")]
    UnsupportedMimeType { id: String, mime: String },

    #[error("duplicate photo id: {0}")]
    DuplicatePhotoId(String),

    #[error("structural error: {0}")]
    StructuralError(String),
}

impl From<CoreError> for ValidationError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::InvalidDateKey(s) => ValidationError::InvalidDateKey(s),
            CoreError::InvalidDigest(s) => {
                ValidationError::StructuralError(format!("invalid digest: {}", s))
            }
            CoreError::EncodingError(s) => ValidationError::StructuralError(s),
        }
    }
}
