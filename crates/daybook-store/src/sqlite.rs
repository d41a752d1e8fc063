//! SQLite implementation of the store traits.
//!
//! This is the primary storage backend for Daybook. It uses rusqlite with
//! bundled SQLite, wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};

use daybook_core::{DateKey, Photo, Record};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{
    Account, AccountStore, InsertResult, OpClass, RateLimitEntry, RateLimitStore, RecordStore,
    TokenPurpose,
};

/// SQLite-based store implementation.
///
/// Implements all three store traits over a single connection, protected by
/// a mutex. All operations use spawn_blocking to avoid blocking the async
/// runtime.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a blocking closure against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().map_err(|e| lock_poisoned(&e.to_string()))?;
            f(&conn)
        })
        .await
        .map_err(|e| spawn_failed(&e.to_string()))?
    }

    /// Like `with_conn`, with a mutable connection for transactions.
    async fn with_conn_mut<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock().map_err(|e| lock_poisoned(&e.to_string()))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| spawn_failed(&e.to_string()))?
    }
}

fn lock_poisoned(msg: &str) -> StoreError {
    StoreError::Database(rusqlite::Error::SqliteFailure(
        rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_LOCKED),
        Some(format!("mutex poisoned: {}", msg)),
    ))
}

fn spawn_failed(msg: &str) -> StoreError {
    StoreError::Database(rusqlite::Error::SqliteFailure(
        rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_ERROR),
        Some(format!("spawn_blocking failed: {}", msg)),
    ))
}

fn bad_column(index: usize, name: &str) -> rusqlite::Error {
    rusqlite::Error::InvalidColumnType(index, name.into(), rusqlite::types::Type::Text)
}

// Helper to convert a row to Record
fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<Record> {
    let date_key_text: String = row.get("date_key")?;
    let date_key = DateKey::parse(&date_key_text).map_err(|_| bad_column(0, "date_key"))?;

    let tags_json: Option<String> = row.get("tags")?;
    let tags: Vec<String> = tags_json
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default();

    Ok(Record {
        date_key,
        created_at: row.get("created_at")?,
        note: row.get("note")?,
        record_hash: row.get("record_hash")?,
        algo: row.get("algo")?,
        tags,
        location: row.get("location")?,
        pinned: row.get::<_, i64>("pinned")? != 0,
    })
}

// Helper to convert a row to Photo
fn row_to_photo(row: &rusqlite::Row<'_>) -> rusqlite::Result<Photo> {
    let date_key_text: String = row.get("date_key")?;
    let date_key = DateKey::parse(&date_key_text).map_err(|_| bad_column(1, "date_key"))?;

    Ok(Photo {
        id: row.get("id")?,
        date_key,
        file_uri: row.get("file_uri")?,
        mime_type: row.get("mime_type")?,
        sha256: row.get("sha256")?,
        sort_index: row.get("sort_index")?,
    })
}

// Helper to convert a row to Account.
//
// The 0/1 email_verified column is normalized to bool here; the integer
// form never leaves this module.
fn row_to_account(row: &rusqlite::Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        email: row.get("email")?,
        password_hash: row.get("password_hash")?,
        email_verified: row.get::<_, i64>("email_verified")? != 0,
        email_verification_token: row.get("email_verification_token")?,
        email_verification_expiry: row.get("email_verification_expiry")?,
        password_reset_token: row.get("password_reset_token")?,
        password_reset_expiry: row.get("password_reset_expiry")?,
        created_at: row.get("created_at")?,
    })
}

// Helper to convert a row to RateLimitEntry
fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<RateLimitEntry> {
    let class_text: String = row.get("op_class")?;
    let op_class: OpClass = class_text.parse().map_err(|_| bad_column(0, "op_class"))?;

    Ok(RateLimitEntry {
        op_class,
        identifier: row.get("identifier")?,
        attempts: row.get("attempts")?,
        first_attempt: row.get("first_attempt")?,
        locked_until: row.get("locked_until")?,
    })
}

fn encode_tags(tags: &[String]) -> String {
    serde_json::to_string(tags).unwrap_or_else(|_| "[]".to_string())
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn insert_record(&self, record: &Record) -> Result<InsertResult> {
        let record = record.clone();
        self.with_conn(move |conn| {
            let existing: Option<String> = conn
                .query_row(
                    "SELECT date_key FROM records WHERE date_key = ?1",
                    params![record.date_key.as_str()],
                    |row| row.get(0),
                )
                .optional()?;

            if existing.is_some() {
                return Ok(InsertResult::AlreadyExists);
            }

            conn.execute(
                "INSERT INTO records (
                    date_key, created_at, note, record_hash, algo, tags, location, pinned
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    record.date_key.as_str(),
                    record.created_at,
                    record.note,
                    record.record_hash,
                    record.algo,
                    encode_tags(&record.tags),
                    record.location,
                    record.pinned as i64,
                ],
            )?;

            Ok(InsertResult::Inserted)
        })
        .await
    }

    async fn get_record(&self, date_key: &DateKey) -> Result<Option<Record>> {
        let date_key = date_key.clone();
        self.with_conn(move |conn| {
            conn.query_row(
                "SELECT date_key, created_at, note, record_hash, algo, tags, location, pinned
                 FROM records WHERE date_key = ?1",
                params![date_key.as_str()],
                row_to_record,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn update_record(&self, record: &Record) -> Result<()> {
        let record = record.clone();
        self.with_conn(move |conn| {
            let changed = conn.execute(
                "UPDATE records
                 SET created_at = ?2, note = ?3, record_hash = ?4, algo = ?5,
                     tags = ?6, location = ?7, pinned = ?8
                 WHERE date_key = ?1",
                params![
                    record.date_key.as_str(),
                    record.created_at,
                    record.note,
                    record.record_hash,
                    record.algo,
                    encode_tags(&record.tags),
                    record.location,
                    record.pinned as i64,
                ],
            )?;

            if changed == 0 {
                return Err(StoreError::NotFound(format!(
                    "record {}",
                    record.date_key
                )));
            }
            Ok(())
        })
        .await
    }

    async fn put_record_with_photos(&self, record: &Record, photos: &[Photo]) -> Result<()> {
        let record = record.clone();
        let photos = photos.to_vec();
        self.with_conn_mut(move |conn| {
            let tx = conn.transaction()?;

            tx.execute(
                "INSERT OR REPLACE INTO records (
                    date_key, created_at, note, record_hash, algo, tags, location, pinned
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    record.date_key.as_str(),
                    record.created_at,
                    record.note,
                    record.record_hash,
                    record.algo,
                    encode_tags(&record.tags),
                    record.location,
                    record.pinned as i64,
                ],
            )?;

            tx.execute(
                "DELETE FROM photos WHERE date_key = ?1",
                params![record.date_key.as_str()],
            )?;
            for photo in &photos {
                tx.execute(
                    "INSERT INTO photos (id, date_key, file_uri, mime_type, sha256, sort_index)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        photo.id,
                        photo.date_key.as_str(),
                        photo.file_uri,
                        photo.mime_type,
                        photo.sha256,
                        photo.sort_index,
                    ],
                )?;
            }

            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn set_pinned(&self, date_key: &DateKey, pinned: bool) -> Result<()> {
        let date_key = date_key.clone();
        self.with_conn(move |conn| {
            let changed = conn.execute(
                "UPDATE records SET pinned = ?2 WHERE date_key = ?1",
                params![date_key.as_str(), pinned as i64],
            )?;
            if changed == 0 {
                return Err(StoreError::NotFound(format!("record {}", date_key)));
            }
            Ok(())
        })
        .await
    }

    async fn delete_record(&self, date_key: &DateKey) -> Result<()> {
        let date_key = date_key.clone();
        self.with_conn(move |conn| {
            // Photos go with the record via ON DELETE CASCADE
            conn.execute(
                "DELETE FROM records WHERE date_key = ?1",
                params![date_key.as_str()],
            )?;
            Ok(())
        })
        .await
    }

    async fn list_records(&self) -> Result<Vec<Record>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT date_key, created_at, note, record_hash, algo, tags, location, pinned
                 FROM records ORDER BY date_key ASC",
            )?;
            let records = stmt
                .query_map([], row_to_record)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(records)
        })
        .await
    }

    async fn insert_photo(&self, photo: &Photo) -> Result<()> {
        let photo = photo.clone();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO photos (id, date_key, file_uri, mime_type, sha256, sort_index)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    photo.id,
                    photo.date_key.as_str(),
                    photo.file_uri,
                    photo.mime_type,
                    photo.sha256,
                    photo.sort_index,
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn list_photos(&self, date_key: &DateKey) -> Result<Vec<Photo>> {
        let date_key = date_key.clone();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, date_key, file_uri, mime_type, sha256, sort_index
                 FROM photos WHERE date_key = ?1
                 ORDER BY sort_index ASC, id ASC",
            )?;
            let photos = stmt
                .query_map(params![date_key.as_str()], row_to_photo)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(photos)
        })
        .await
    }

    async fn delete_photos(&self, date_key: &DateKey) -> Result<()> {
        let date_key = date_key.clone();
        self.with_conn(move |conn| {
            conn.execute(
                "DELETE FROM photos WHERE date_key = ?1",
                params![date_key.as_str()],
            )?;
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl AccountStore for SqliteStore {
    async fn get_by_email(&self, email: &str) -> Result<Option<Account>> {
        let email = email.to_string();
        self.with_conn(move |conn| {
            conn.query_row(
                "SELECT email, password_hash, email_verified,
                        email_verification_token, email_verification_expiry,
                        password_reset_token, password_reset_expiry, created_at
                 FROM accounts WHERE email = ?1",
                params![email],
                row_to_account,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn insert_account(&self, account: &Account) -> Result<InsertResult> {
        let account = account.clone();
        self.with_conn(move |conn| {
            let existing: Option<String> = conn
                .query_row(
                    "SELECT email FROM accounts WHERE email = ?1",
                    params![account.email],
                    |row| row.get(0),
                )
                .optional()?;

            if existing.is_some() {
                return Ok(InsertResult::AlreadyExists);
            }

            conn.execute(
                "INSERT INTO accounts (
                    email, password_hash, email_verified,
                    email_verification_token, email_verification_expiry,
                    password_reset_token, password_reset_expiry, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    account.email,
                    account.password_hash,
                    account.email_verified as i64,
                    account.email_verification_token,
                    account.email_verification_expiry,
                    account.password_reset_token,
                    account.password_reset_expiry,
                    account.created_at,
                ],
            )?;

            Ok(InsertResult::Inserted)
        })
        .await
    }

    async fn set_token(
        &self,
        email: &str,
        purpose: TokenPurpose,
        token: &str,
        expiry: i64,
    ) -> Result<()> {
        let email = email.to_string();
        let token = token.to_string();
        self.with_conn(move |conn| {
            let sql = match purpose {
                TokenPurpose::EmailVerification => {
                    "UPDATE accounts SET email_verification_token = ?2,
                         email_verification_expiry = ?3 WHERE email = ?1"
                }
                TokenPurpose::PasswordReset => {
                    "UPDATE accounts SET password_reset_token = ?2,
                         password_reset_expiry = ?3 WHERE email = ?1"
                }
            };
            let changed = conn.execute(sql, params![email, token, expiry])?;
            if changed == 0 {
                return Err(StoreError::NotFound(format!("account {}", email)));
            }
            Ok(())
        })
        .await
    }

    async fn clear_token(&self, email: &str, purpose: TokenPurpose) -> Result<()> {
        let email = email.to_string();
        self.with_conn(move |conn| {
            let sql = match purpose {
                TokenPurpose::EmailVerification => {
                    "UPDATE accounts SET email_verification_token = NULL,
                         email_verification_expiry = NULL WHERE email = ?1"
                }
                TokenPurpose::PasswordReset => {
                    "UPDATE accounts SET password_reset_token = NULL,
                         password_reset_expiry = NULL WHERE email = ?1"
                }
            };
            let changed = conn.execute(sql, params![email])?;
            if changed == 0 {
                return Err(StoreError::NotFound(format!("account {}", email)));
            }
            Ok(())
        })
        .await
    }

    async fn set_verified(&self, email: &str, verified: bool) -> Result<()> {
        let email = email.to_string();
        self.with_conn(move |conn| {
            let changed = conn.execute(
                "UPDATE accounts SET email_verified = ?2 WHERE email = ?1",
                params![email, verified as i64],
            )?;
            if changed == 0 {
                return Err(StoreError::NotFound(format!("account {}", email)));
            }
            Ok(())
        })
        .await
    }

    async fn set_password_hash(&self, email: &str, password_hash: &str) -> Result<()> {
        let email = email.to_string();
        let password_hash = password_hash.to_string();
        self.with_conn(move |conn| {
            let changed = conn.execute(
                "UPDATE accounts SET password_hash = ?2 WHERE email = ?1",
                params![email, password_hash],
            )?;
            if changed == 0 {
                return Err(StoreError::NotFound(format!("account {}", email)));
            }
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl RateLimitStore for SqliteStore {
    async fn get_entry(&self, class: OpClass, identifier: &str) -> Result<Option<RateLimitEntry>> {
        let identifier = identifier.to_string();
        self.with_conn(move |conn| {
            conn.query_row(
                "SELECT op_class, identifier, attempts, first_attempt, locked_until
                 FROM rate_limits WHERE op_class = ?1 AND identifier = ?2",
                params![class.as_str(), identifier],
                row_to_entry,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn put_entry(&self, entry: &RateLimitEntry) -> Result<()> {
        let entry = entry.clone();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO rate_limits
                    (op_class, identifier, attempts, first_attempt, locked_until)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    entry.op_class.as_str(),
                    entry.identifier,
                    entry.attempts,
                    entry.first_attempt,
                    entry.locked_until,
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn delete_entry(&self, class: OpClass, identifier: &str) -> Result<()> {
        let identifier = identifier.to_string();
        self.with_conn(move |conn| {
            conn.execute(
                "DELETE FROM rate_limits WHERE op_class = ?1 AND identifier = ?2",
                params![class.as_str(), identifier],
            )?;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use daybook_core::{compute_record_hash, RECORD_HASH_ALGO};

    fn make_record(date_key: &str, note: &str) -> Record {
        let key = DateKey::parse(date_key).unwrap();
        let hash = compute_record_hash(&key, 1000, Some(note), &[]);
        Record {
            date_key: key,
            created_at: 1000,
            note: note.to_string(),
            record_hash: hash,
            algo: RECORD_HASH_ALGO.to_string(),
            tags: vec!["travel".into(), "food".into()],
            location: Some("home".into()),
            pinned: false,
        }
    }

    fn make_photo(id: &str, date_key: &str, sort_index: u32) -> Photo {
        Photo {
            id: id.to_string(),
            date_key: DateKey::parse(date_key).unwrap(),
            file_uri: format!("file:///photos/{}.jpg", id),
            mime_type: "image/jpeg".to_string(),
            sha256: "ab".repeat(32),
            sort_index,
        }
    }

    #[tokio::test]
    async fn test_record_roundtrip() {
        let store = SqliteStore::open_memory().unwrap();
        let record = make_record("2024-01-01", "hello");

        let result = store.insert_record(&record).await.unwrap();
        assert_eq!(result, InsertResult::Inserted);

        let loaded = store.get_record(&record.date_key).await.unwrap().unwrap();
        assert_eq!(loaded, record);
    }

    #[tokio::test]
    async fn test_insert_record_idempotent() {
        let store = SqliteStore::open_memory().unwrap();
        let record = make_record("2024-01-01", "hello");

        assert_eq!(
            store.insert_record(&record).await.unwrap(),
            InsertResult::Inserted
        );
        assert_eq!(
            store.insert_record(&record).await.unwrap(),
            InsertResult::AlreadyExists
        );
    }

    #[tokio::test]
    async fn test_update_missing_record_fails() {
        let store = SqliteStore::open_memory().unwrap();
        let record = make_record("2024-01-01", "hello");
        let err = store.update_record(&record).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_photos_ordered_by_sort_index_then_id() {
        let store = SqliteStore::open_memory().unwrap();
        let record = make_record("2024-01-01", "");
        store.insert_record(&record).await.unwrap();

        // Insert out of order, with a sort_index tie
        store
            .insert_photo(&make_photo("zzz", "2024-01-01", 0))
            .await
            .unwrap();
        store
            .insert_photo(&make_photo("mid", "2024-01-01", 1))
            .await
            .unwrap();
        store
            .insert_photo(&make_photo("aaa", "2024-01-01", 0))
            .await
            .unwrap();

        let photos = store.list_photos(&record.date_key).await.unwrap();
        let ids: Vec<&str> = photos.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["aaa", "zzz", "mid"]);
    }

    #[tokio::test]
    async fn test_put_record_with_photos_replaces_both() {
        let store = SqliteStore::open_memory().unwrap();
        let record = make_record("2024-01-01", "first");
        store
            .put_record_with_photos(&record, &[make_photo("old", "2024-01-01", 0)])
            .await
            .unwrap();

        let rewritten = make_record("2024-01-01", "second");
        store
            .put_record_with_photos(
                &rewritten,
                &[
                    make_photo("new-a", "2024-01-01", 0),
                    make_photo("new-b", "2024-01-01", 1),
                ],
            )
            .await
            .unwrap();

        let loaded = store.get_record(&record.date_key).await.unwrap().unwrap();
        assert_eq!(loaded.note, "second");
        let ids: Vec<String> = store
            .list_photos(&record.date_key)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec!["new-a", "new-b"]);
    }

    #[tokio::test]
    async fn test_put_record_with_photos_rolls_back_on_failure() {
        let store = SqliteStore::open_memory().unwrap();
        let record = make_record("2024-01-01", "first");
        store
            .put_record_with_photos(&record, &[make_photo("keep", "2024-01-01", 0)])
            .await
            .unwrap();

        // Duplicate photo id fails partway through the batch
        let rewritten = make_record("2024-01-01", "second");
        let err = store
            .put_record_with_photos(
                &rewritten,
                &[
                    make_photo("dup", "2024-01-01", 0),
                    make_photo("dup", "2024-01-01", 1),
                ],
            )
            .await;
        assert!(err.is_err());

        // Nothing from the failed write may be visible
        let loaded = store.get_record(&record.date_key).await.unwrap().unwrap();
        assert_eq!(loaded.note, "first");
        let photos = store.list_photos(&record.date_key).await.unwrap();
        assert_eq!(photos.len(), 1);
        assert_eq!(photos[0].id, "keep");
    }

    #[tokio::test]
    async fn test_delete_record_cascades_photos() {
        let store = SqliteStore::open_memory().unwrap();
        let record = make_record("2024-01-01", "");
        store.insert_record(&record).await.unwrap();
        store
            .insert_photo(&make_photo("p1", "2024-01-01", 0))
            .await
            .unwrap();

        store.delete_record(&record.date_key).await.unwrap();
        assert!(store.get_record(&record.date_key).await.unwrap().is_none());
        assert!(store.list_photos(&record.date_key).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_photos_leaves_record() {
        let store = SqliteStore::open_memory().unwrap();
        let record = make_record("2024-01-01", "");
        store.insert_record(&record).await.unwrap();
        store
            .insert_photo(&make_photo("p1", "2024-01-01", 0))
            .await
            .unwrap();

        store.delete_photos(&record.date_key).await.unwrap();
        assert!(store.list_photos(&record.date_key).await.unwrap().is_empty());
        assert!(store.get_record(&record.date_key).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_set_pinned_only_touches_flag() {
        let store = SqliteStore::open_memory().unwrap();
        let record = make_record("2024-01-01", "note");
        store.insert_record(&record).await.unwrap();

        store.set_pinned(&record.date_key, true).await.unwrap();

        let loaded = store.get_record(&record.date_key).await.unwrap().unwrap();
        assert!(loaded.pinned);
        assert_eq!(loaded.note, record.note);
        assert_eq!(loaded.record_hash, record.record_hash);
    }

    #[tokio::test]
    async fn test_list_records_ordered() {
        let store = SqliteStore::open_memory().unwrap();
        store.insert_record(&make_record("2024-03-01", "")).await.unwrap();
        store.insert_record(&make_record("2024-01-15", "")).await.unwrap();
        store.insert_record(&make_record("2024-02-01", "")).await.unwrap();

        let keys: Vec<String> = store
            .list_records()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.date_key.to_string())
            .collect();
        assert_eq!(keys, vec!["2024-01-15", "2024-02-01", "2024-03-01"]);
    }

    #[tokio::test]
    async fn test_account_token_slot_roundtrip() {
        let store = SqliteStore::open_memory().unwrap();
        let account = Account::new("user@example.com".into(), "hash".into(), 1000);
        store.insert_account(&account).await.unwrap();

        store
            .set_token("user@example.com", TokenPurpose::PasswordReset, "654321", 99_000)
            .await
            .unwrap();

        let loaded = store.get_by_email("user@example.com").await.unwrap().unwrap();
        assert_eq!(loaded.password_reset_token.as_deref(), Some("654321"));
        assert_eq!(loaded.password_reset_expiry, Some(99_000));
        assert_eq!(loaded.email_verification_token, None);

        store
            .clear_token("user@example.com", TokenPurpose::PasswordReset)
            .await
            .unwrap();
        let cleared = store.get_by_email("user@example.com").await.unwrap().unwrap();
        assert_eq!(cleared.password_reset_token, None);
        assert_eq!(cleared.password_reset_expiry, None);
    }

    #[tokio::test]
    async fn test_verified_flag_is_bool_at_boundary() {
        let store = SqliteStore::open_memory().unwrap();
        let account = Account::new("user@example.com".into(), "hash".into(), 1000);
        store.insert_account(&account).await.unwrap();

        let loaded = store.get_by_email("user@example.com").await.unwrap().unwrap();
        assert!(!loaded.email_verified);

        store.set_verified("user@example.com", true).await.unwrap();
        let verified = store.get_by_email("user@example.com").await.unwrap().unwrap();
        assert!(verified.email_verified);
    }

    #[tokio::test]
    async fn test_rate_limit_entry_roundtrip() {
        let store = SqliteStore::open_memory().unwrap();
        let entry = RateLimitEntry {
            op_class: OpClass::PinVerification,
            identifier: "user@example.com".into(),
            attempts: 3,
            first_attempt: 5000,
            locked_until: None,
        };

        store.put_entry(&entry).await.unwrap();
        let loaded = store
            .get_entry(OpClass::PinVerification, "user@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded, entry);

        // Same identifier, different class, is a different key
        assert!(store
            .get_entry(OpClass::Auth, "user@example.com")
            .await
            .unwrap()
            .is_none());

        store
            .delete_entry(OpClass::PinVerification, "user@example.com")
            .await
            .unwrap();
        assert!(store
            .get_entry(OpClass::PinVerification, "user@example.com")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("daybook.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.insert_record(&make_record("2024-01-01", "kept")).await.unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        let loaded = store
            .get_record(&DateKey::parse("2024-01-01").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.note, "kept");
    }
}
