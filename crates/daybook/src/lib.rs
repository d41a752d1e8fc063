//! # Daybook
//!
//! The unified API for Daybook - a tamper-evident personal proof journal
//! that works fully offline.
//!
//! ## Overview
//!
//! Daybook stores one entry per calendar day: a short note plus up to
//! three photos. Each entry carries a SHA-256 fingerprint over a
//! canonical JSON form of its content, so any later alteration of a
//! finalized entry is detectable.
//!
//! ## Key Concepts
//!
//! - **Record**: One day's entry. Today's record is a draft; at midnight
//!   it freezes permanently.
//! - **Freeze boundary**: The calendar-day edge. Finalized records accept
//!   no change except the pinned flag.
//! - **Record hash**: SHA-256 of the canonical `(dateKey, createdAt,
//!   note, photos)` shape. Photo files are referenced by digest, never
//!   re-hashed on read.
//! - **Integrity verdict**: Every read re-verifies the stored hash (when
//!   enabled) and reports `Verified` or `Tampered`.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use daybook::{EntryDraft, Journal, JournalConfig};
//! use daybook::core::SystemClock;
//! use daybook::store::SqliteStore;
//!
//! async fn example() {
//!     let store = SqliteStore::open("daybook.db").unwrap();
//!     let journal = Journal::new(store, JournalConfig::default(), Arc::new(SystemClock));
//!
//!     let record = journal
//!         .write_entry(EntryDraft {
//!             note: Some("first entry".into()),
//!             ..Default::default()
//!         })
//!         .await
//!         .unwrap();
//!
//!     let entry = journal.entry(&record.date_key).await.unwrap();
//!     assert!(entry.is_some());
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `daybook::core` - Canonicalization, hashing, record primitives
//! - `daybook::store` - Storage abstraction, SQLite and in-memory stores
//! - `daybook::auth` - Rate limiting, PIN tokens, account recovery

pub mod error;
pub mod journal;

// Re-export component crates
pub use daybook_auth as auth;
pub use daybook_core as core;
pub use daybook_store as store;

// Re-export main types for convenience
pub use error::{JournalError, Result};
pub use journal::{Entry, EntryDraft, IntegrityStatus, Journal, JournalConfig, NewPhoto};

// Re-export commonly used core types
pub use daybook_core::{
    compute_record_hash, verify_record_integrity, Clock, DateKey, Photo, PhotoDescriptor, Record,
    RecordStatus, Sha256Digest, MAX_NOTE_LEN, MAX_PHOTOS_PER_RECORD,
};
