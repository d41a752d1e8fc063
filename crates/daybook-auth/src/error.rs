//! Error types for the auth module.

use thiserror::Error;

use daybook_store::StoreError;

/// Errors that can occur during auth operations.
///
/// Rate-limit denials and rejected verifications are not errors; they are
/// outcome values. This type covers only faults the caller cannot recover
/// from locally.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Storage error from the account store.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Password hashing/parsing error.
    #[error("password hash error: {0}")]
    PasswordHash(String),
}

/// Result type for auth operations.
pub type Result<T> = std::result::Result<T, AuthError>;
