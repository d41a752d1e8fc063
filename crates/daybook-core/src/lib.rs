//! # Daybook Core
//!
//! Pure primitives for Daybook: canonical serialization, record fingerprints,
//! and integrity verification.
//!
//! This crate contains no I/O, no storage, no networking. It is pure
//! computation over journal data structures.
//!
//! ## Key Types
//!
//! - [`Record`] - A dated journal entry (note + ordered photo digests)
//! - [`PhotoDescriptor`] - The integrity-relevant view of an attached photo
//! - [`DateKey`] - Calendar-date identity of a record and its freeze boundary
//! - [`Sha256Digest`] - Content fingerprint (SHA-256)
//!
//! ## Canonicalization
//!
//! Record hashes are computed over a canonical JSON form. See [`canonical`].

pub mod canonical;
pub mod clock;
pub mod error;
pub mod hash;
pub mod record;
pub mod types;
pub mod validation;

pub use canonical::canonical_json;
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CoreError, ValidationError};
pub use hash::{sha256_hex, Sha256Digest, RECORD_HASH_ALGO};
pub use record::{
    build_canonical_record, compute_record_hash, verify_record_integrity, Photo, PhotoDescriptor,
    Record, RecordStatus, MAX_NOTE_LEN, MAX_PHOTOS_PER_RECORD,
};
pub use types::DateKey;
pub use validation::{validate_entry, validate_record};
