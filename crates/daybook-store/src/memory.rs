//! In-memory implementation of the store traits.
//!
//! This is primarily for testing. It has the same semantics as SQLite but
//! keeps everything in memory with no persistence.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;

use daybook_core::{DateKey, Photo, Record};

use crate::error::{Result, StoreError};
use crate::traits::{
    Account, AccountStore, InsertResult, OpClass, RateLimitEntry, RateLimitStore, RecordStore,
    TokenPurpose,
};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

struct MemoryStoreInner {
    /// Records keyed by date; BTreeMap keeps list order chronological.
    records: BTreeMap<DateKey, Record>,

    /// Photos grouped by owning record.
    photos: HashMap<DateKey, Vec<Photo>>,

    /// Accounts keyed by lowercased email.
    accounts: HashMap<String, Account>,

    /// Rate-limit entries keyed by (class, identifier).
    limits: HashMap<(OpClass, String), RateLimitEntry>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner {
                records: BTreeMap::new(),
                photos: HashMap::new(),
                accounts: HashMap::new(),
                limits: HashMap::new(),
            }),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert_record(&self, record: &Record) -> Result<InsertResult> {
        let mut inner = self.inner.write().unwrap();

        if inner.records.contains_key(&record.date_key) {
            return Ok(InsertResult::AlreadyExists);
        }
        inner.records.insert(record.date_key.clone(), record.clone());
        Ok(InsertResult::Inserted)
    }

    async fn get_record(&self, date_key: &DateKey) -> Result<Option<Record>> {
        let inner = self.inner.read().unwrap();
        Ok(inner.records.get(date_key).cloned())
    }

    async fn update_record(&self, record: &Record) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        match inner.records.get_mut(&record.date_key) {
            Some(existing) => {
                *existing = record.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound(format!("record {}", record.date_key))),
        }
    }

    async fn put_record_with_photos(&self, record: &Record, photos: &[Photo]) -> Result<()> {
        // One write lock for the whole swap, so readers never see a
        // record paired with the previous photo set.
        let mut inner = self.inner.write().unwrap();
        inner.records.insert(record.date_key.clone(), record.clone());
        inner.photos.insert(record.date_key.clone(), photos.to_vec());
        Ok(())
    }

    async fn set_pinned(&self, date_key: &DateKey, pinned: bool) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        match inner.records.get_mut(date_key) {
            Some(record) => {
                record.pinned = pinned;
                Ok(())
            }
            None => Err(StoreError::NotFound(format!("record {}", date_key))),
        }
    }

    async fn delete_record(&self, date_key: &DateKey) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        inner.records.remove(date_key);
        inner.photos.remove(date_key);
        Ok(())
    }

    async fn list_records(&self) -> Result<Vec<Record>> {
        let inner = self.inner.read().unwrap();
        Ok(inner.records.values().cloned().collect())
    }

    async fn insert_photo(&self, photo: &Photo) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        inner
            .photos
            .entry(photo.date_key.clone())
            .or_default()
            .push(photo.clone());
        Ok(())
    }

    async fn list_photos(&self, date_key: &DateKey) -> Result<Vec<Photo>> {
        let inner = self.inner.read().unwrap();
        let mut photos = inner.photos.get(date_key).cloned().unwrap_or_default();
        photos.sort_by(|a, b| {
            a.sort_index
                .cmp(&b.sort_index)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(photos)
    }

    async fn delete_photos(&self, date_key: &DateKey) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        inner.photos.remove(date_key);
        Ok(())
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn get_by_email(&self, email: &str) -> Result<Option<Account>> {
        let inner = self.inner.read().unwrap();
        Ok(inner.accounts.get(email).cloned())
    }

    async fn insert_account(&self, account: &Account) -> Result<InsertResult> {
        let mut inner = self.inner.write().unwrap();
        if inner.accounts.contains_key(&account.email) {
            return Ok(InsertResult::AlreadyExists);
        }
        inner.accounts.insert(account.email.clone(), account.clone());
        Ok(InsertResult::Inserted)
    }

    async fn set_token(
        &self,
        email: &str,
        purpose: TokenPurpose,
        token: &str,
        expiry: i64,
    ) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        let account = inner
            .accounts
            .get_mut(email)
            .ok_or_else(|| StoreError::NotFound(format!("account {}", email)))?;
        match purpose {
            TokenPurpose::EmailVerification => {
                account.email_verification_token = Some(token.to_string());
                account.email_verification_expiry = Some(expiry);
            }
            TokenPurpose::PasswordReset => {
                account.password_reset_token = Some(token.to_string());
                account.password_reset_expiry = Some(expiry);
            }
        }
        Ok(())
    }

    async fn clear_token(&self, email: &str, purpose: TokenPurpose) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        let account = inner
            .accounts
            .get_mut(email)
            .ok_or_else(|| StoreError::NotFound(format!("account {}", email)))?;
        match purpose {
            TokenPurpose::EmailVerification => {
                account.email_verification_token = None;
                account.email_verification_expiry = None;
            }
            TokenPurpose::PasswordReset => {
                account.password_reset_token = None;
                account.password_reset_expiry = None;
            }
        }
        Ok(())
    }

    async fn set_verified(&self, email: &str, verified: bool) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        let account = inner
            .accounts
            .get_mut(email)
            .ok_or_else(|| StoreError::NotFound(format!("account {}", email)))?;
        account.email_verified = verified;
        Ok(())
    }

    async fn set_password_hash(&self, email: &str, password_hash: &str) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        let account = inner
            .accounts
            .get_mut(email)
            .ok_or_else(|| StoreError::NotFound(format!("account {}", email)))?;
        account.password_hash = password_hash.to_string();
        Ok(())
    }
}

#[async_trait]
impl RateLimitStore for MemoryStore {
    async fn get_entry(&self, class: OpClass, identifier: &str) -> Result<Option<RateLimitEntry>> {
        let inner = self.inner.read().unwrap();
        Ok(inner.limits.get(&(class, identifier.to_string())).cloned())
    }

    async fn put_entry(&self, entry: &RateLimitEntry) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        inner
            .limits
            .insert((entry.op_class, entry.identifier.clone()), entry.clone());
        Ok(())
    }

    async fn delete_entry(&self, class: OpClass, identifier: &str) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        inner.limits.remove(&(class, identifier.to_string()));
        Ok(())
    }
}
