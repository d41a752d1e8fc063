//! The Journal: unified API for writing and reading proof entries.
//!
//! The Journal enforces the freeze boundary the stores deliberately do
//! not: today's entry is a draft that may be rewritten in place, any
//! earlier date is finalized and accepts no change beyond the pinned flag.

use std::sync::Arc;

use daybook_core::{
    compute_record_hash, validate_entry, verify_record_integrity, Clock, DateKey, Photo,
    PhotoDescriptor, Record, RecordStatus, Sha256Digest, RECORD_HASH_ALGO,
};
use daybook_store::RecordStore;

use crate::error::{JournalError, Result};

/// Configuration for the Journal.
#[derive(Debug, Clone)]
pub struct JournalConfig {
    /// Whether to re-verify record hashes on every read.
    pub verify_on_read: bool,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            verify_on_read: true,
        }
    }
}

/// A photo being added to today's entry, carrying its raw bytes.
///
/// The digest is computed here, once, from the bytes as given; after this
/// point the journal only ever compares digests, never re-reads files.
#[derive(Debug, Clone)]
pub struct NewPhoto {
    pub id: String,
    /// Where the bytes live externally. Stored but never hashed.
    pub file_uri: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
    pub sort_index: u32,
}

/// The user-supplied fields of one entry write.
#[derive(Debug, Clone, Default)]
pub struct EntryDraft {
    pub note: Option<String>,
    pub photos: Vec<NewPhoto>,
    pub tags: Vec<String>,
    pub location: Option<String>,
}

/// Integrity verdict attached to a read entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrityStatus {
    /// Stored hash matches the recomputed one.
    Verified,
    /// Stored hash does not match; the entry was altered outside the API.
    Tampered,
    /// Verification was disabled for this read.
    Unchecked,
}

/// A record with its photos and integrity verdict, as returned by reads.
#[derive(Debug, Clone)]
pub struct Entry {
    pub record: Record,
    pub photos: Vec<Photo>,
    pub integrity: IntegrityStatus,
    pub status: RecordStatus,
}

/// The main Journal struct.
pub struct Journal<S: RecordStore> {
    store: Arc<S>,
    config: JournalConfig,
    clock: Arc<dyn Clock>,
}

impl<S: RecordStore> Journal<S> {
    /// Create a new journal over a store.
    pub fn new(store: S, config: JournalConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            store: Arc::new(store),
            config,
            clock,
        }
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Write Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Write or rewrite today's entry.
    ///
    /// An existing entry for today is replaced wholesale (photos included)
    /// while keeping its original `createdAt`; the hash is recomputed over
    /// the new content. Writes never target any other date, so a finalized
    /// record is unreachable from here by construction.
    pub async fn write_entry(&self, draft: EntryDraft) -> Result<Record> {
        let today = self.clock.today();

        // Digest photo bytes before validation so the descriptors carry
        // real digests
        let photos: Vec<Photo> = draft
            .photos
            .iter()
            .map(|p| Photo {
                id: p.id.clone(),
                date_key: today.clone(),
                file_uri: p.file_uri.clone(),
                mime_type: p.mime_type.clone(),
                sha256: Sha256Digest::digest(&p.bytes).to_hex(),
                sort_index: p.sort_index,
            })
            .collect();
        let descriptors: Vec<PhotoDescriptor> = photos.iter().map(Photo::descriptor).collect();

        let note = draft.note.as_deref().unwrap_or("");
        validate_entry(note, &descriptors)?;

        let existing = self.store.get_record(&today).await?;
        let created_at = match &existing {
            Some(record) => record.created_at,
            None => self.clock.now_millis(),
        };

        let record = Record {
            date_key: today.clone(),
            created_at,
            note: note.to_string(),
            record_hash: compute_record_hash(&today, created_at, Some(note), &descriptors),
            algo: RECORD_HASH_ALGO.to_string(),
            tags: draft.tags,
            location: draft.location,
            pinned: existing.as_ref().map(|r| r.pinned).unwrap_or(false),
        };

        // Record and photos land together; a rewrite must never leave a
        // hash that covers photos the store does not hold.
        self.store.put_record_with_photos(&record, &photos).await?;

        Ok(record)
    }

    /// Flip the pinned flag on any entry, finalized or not.
    ///
    /// Pinned is display metadata outside the hashed shape, so this is the
    /// single mutation permitted past the freeze boundary.
    pub async fn set_pinned(&self, date_key: &DateKey, pinned: bool) -> Result<()> {
        if self.store.get_record(date_key).await?.is_none() {
            return Err(JournalError::RecordNotFound(date_key.clone()));
        }
        self.store.set_pinned(date_key, pinned).await?;
        Ok(())
    }

    /// Delete today's entry and its photos.
    ///
    /// Finalized entries are permanent; deleting a past date is refused.
    pub async fn delete_entry(&self, date_key: &DateKey) -> Result<()> {
        let today = self.clock.today();
        if date_key != &today {
            return Err(JournalError::RecordFrozen(date_key.clone()));
        }
        if self.store.get_record(date_key).await?.is_none() {
            return Err(JournalError::RecordNotFound(date_key.clone()));
        }
        self.store.delete_record(date_key).await?;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Read Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Read one entry with its photos and integrity verdict.
    pub async fn entry(&self, date_key: &DateKey) -> Result<Option<Entry>> {
        let Some(record) = self.store.get_record(date_key).await? else {
            return Ok(None);
        };
        let photos = self.store.list_photos(date_key).await?;
        Ok(Some(self.assemble(record, photos)))
    }

    /// Read all entries, ordered by date ascending.
    pub async fn entries(&self) -> Result<Vec<Entry>> {
        let records = self.store.list_records().await?;
        let mut entries = Vec::with_capacity(records.len());
        for record in records {
            let photos = self.store.list_photos(&record.date_key).await?;
            entries.push(self.assemble(record, photos));
        }
        Ok(entries)
    }

    fn assemble(&self, record: Record, photos: Vec<Photo>) -> Entry {
        let integrity = if self.config.verify_on_read {
            let descriptors: Vec<PhotoDescriptor> =
                photos.iter().map(Photo::descriptor).collect();
            let ok = verify_record_integrity(
                &record.record_hash,
                &record.date_key,
                record.created_at,
                Some(&record.note),
                &descriptors,
            );
            if ok {
                IntegrityStatus::Verified
            } else {
                tracing::warn!(date_key = %record.date_key, "record hash mismatch on read");
                IntegrityStatus::Tampered
            }
        } else {
            IntegrityStatus::Unchecked
        };
        let status = record.status(&self.clock.today());
        Entry {
            record,
            photos,
            integrity,
            status,
        }
    }
}
