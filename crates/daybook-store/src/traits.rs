//! Store traits: the abstract interfaces for Daybook persistence.
//!
//! These traits allow the journal and auth layers to be storage-agnostic.
//! Implementations include SQLite (primary) and in-memory (for tests).
//!
//! The stores persist whatever they are handed and enforce nothing about
//! record mutability; the freeze rule for past-dated records lives in the
//! journal, which is the only caller with a clock.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use daybook_core::{DateKey, Photo, Record};

use crate::error::Result;

/// Result of inserting an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertResult {
    /// Entity was inserted successfully.
    Inserted,
    /// Entity already exists under this key (idempotent - not an error).
    AlreadyExists,
}

/// A named rate-limit policy bucket.
///
/// Each class carries independent thresholds; the pair
/// `(OpClass, identifier)` keys one attempt-window entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpClass {
    /// Password authentication attempts.
    Auth,
    /// 6-digit PIN verification attempts.
    PinVerification,
    /// Outbound verification/reset emails.
    EmailSend,
}

impl OpClass {
    /// Stable storage form of the class name.
    pub fn as_str(&self) -> &'static str {
        match self {
            OpClass::Auth => "auth",
            OpClass::PinVerification => "pin_verification",
            OpClass::EmailSend => "email_send",
        }
    }
}

impl std::str::FromStr for OpClass {
    type Err = crate::error::StoreError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "auth" => Ok(OpClass::Auth),
            "pin_verification" => Ok(OpClass::PinVerification),
            "email_send" => Ok(OpClass::EmailSend),
            _ => Err(crate::error::StoreError::InvalidData(format!(
                "unknown op class: {}",
                s
            ))),
        }
    }
}

/// Which token slot on an account an operation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenPurpose {
    EmailVerification,
    PasswordReset,
}

/// A user account with its inline token slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Lowercased email address; primary identity.
    pub email: String,
    /// Argon2 PHC-format password hash.
    pub password_hash: String,
    pub email_verified: bool,
    pub email_verification_token: Option<String>,
    pub email_verification_expiry: Option<i64>,
    pub password_reset_token: Option<String>,
    pub password_reset_expiry: Option<i64>,
    pub created_at: i64,
}

impl Account {
    /// Create a fresh, unverified account with empty token slots.
    pub fn new(email: String, password_hash: String, created_at: i64) -> Self {
        Self {
            email,
            password_hash,
            email_verified: false,
            email_verification_token: None,
            email_verification_expiry: None,
            password_reset_token: None,
            password_reset_expiry: None,
            created_at,
        }
    }

    /// The `(token, expiry)` slot for a purpose.
    pub fn token_for(&self, purpose: TokenPurpose) -> (Option<&str>, Option<i64>) {
        match purpose {
            TokenPurpose::EmailVerification => (
                self.email_verification_token.as_deref(),
                self.email_verification_expiry,
            ),
            TokenPurpose::PasswordReset => (
                self.password_reset_token.as_deref(),
                self.password_reset_expiry,
            ),
        }
    }
}

/// One sliding attempt window for `(op_class, identifier)`.
///
/// Created on first attempt, mutated on each subsequent one, reset to a
/// fresh window when the window elapses or the operation succeeds, deleted
/// on explicit reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitEntry {
    pub op_class: OpClass,
    pub identifier: String,
    /// Attempt count within the current window.
    pub attempts: u32,
    /// Window start instant (Unix ms).
    pub first_attempt: i64,
    /// Lockout end instant, when locked.
    pub locked_until: Option<i64>,
}

/// Record and photo persistence.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a record. Returns `AlreadyExists` if the date key is taken.
    async fn insert_record(&self, record: &Record) -> Result<InsertResult>;

    /// Get a record by date key.
    async fn get_record(&self, date_key: &DateKey) -> Result<Option<Record>>;

    /// Replace an existing record's row. Errors with `NotFound` if absent.
    async fn update_record(&self, record: &Record) -> Result<()>;

    /// Upsert a record together with its full photo set, atomically.
    ///
    /// Either the record row and every photo land, or nothing changes; a
    /// failure mid-write must never leave a record whose hash covers
    /// photos that are not there.
    async fn put_record_with_photos(&self, record: &Record, photos: &[Photo]) -> Result<()>;

    /// Flip the pinned flag without touching any other field.
    async fn set_pinned(&self, date_key: &DateKey, pinned: bool) -> Result<()>;

    /// Delete a record. Its photos are deleted with it.
    async fn delete_record(&self, date_key: &DateKey) -> Result<()>;

    /// All records, ordered by date key ascending.
    async fn list_records(&self) -> Result<Vec<Record>>;

    /// Attach a photo row to its owning record.
    async fn insert_photo(&self, photo: &Photo) -> Result<()>;

    /// Photos for a record, ordered by `(sort_index, id)`.
    async fn list_photos(&self, date_key: &DateKey) -> Result<Vec<Photo>>;

    /// Remove all photos for a record.
    async fn delete_photos(&self, date_key: &DateKey) -> Result<()>;
}

/// Account persistence, including the inline token slots.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Look up an account by (lowercased) email.
    async fn get_by_email(&self, email: &str) -> Result<Option<Account>>;

    /// Insert an account. Returns `AlreadyExists` if the email is taken.
    async fn insert_account(&self, account: &Account) -> Result<InsertResult>;

    /// Set a purpose's `(token, expiry)` slot, overwriting any previous one.
    async fn set_token(
        &self,
        email: &str,
        purpose: TokenPurpose,
        token: &str,
        expiry: i64,
    ) -> Result<()>;

    /// Clear a purpose's token slot.
    async fn clear_token(&self, email: &str, purpose: TokenPurpose) -> Result<()>;

    /// Set the email-verified flag.
    async fn set_verified(&self, email: &str, verified: bool) -> Result<()>;

    /// Replace the password hash.
    async fn set_password_hash(&self, email: &str, password_hash: &str) -> Result<()>;
}

/// Rate-limit entry persistence.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Load the entry for `(class, identifier)`, if any.
    async fn get_entry(&self, class: OpClass, identifier: &str) -> Result<Option<RateLimitEntry>>;

    /// Upsert an entry under its `(class, identifier)` key.
    async fn put_entry(&self, entry: &RateLimitEntry) -> Result<()>;

    /// Delete the entry for `(class, identifier)`. Absence is not an error.
    async fn delete_entry(&self, class: OpClass, identifier: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_op_class_str_roundtrip() {
        for class in [OpClass::Auth, OpClass::PinVerification, OpClass::EmailSend] {
            assert_eq!(class.as_str().parse::<OpClass>().unwrap(), class);
        }
        assert!("nope".parse::<OpClass>().is_err());
    }

    #[test]
    fn test_account_token_slots() {
        let mut account = Account::new("a@b.c".into(), "hash".into(), 0);
        assert_eq!(account.token_for(TokenPurpose::EmailVerification), (None, None));

        account.password_reset_token = Some("123456".into());
        account.password_reset_expiry = Some(600_000);
        assert_eq!(
            account.token_for(TokenPurpose::PasswordReset),
            (Some("123456"), Some(600_000))
        );
        // The other slot is untouched
        assert_eq!(account.token_for(TokenPurpose::EmailVerification), (None, None));
    }
}
