//! Records, photos, and the integrity fingerprint over them.
//!
//! A record's hash is computed over a canonical shape built from exactly
//! `(dateKey, createdAt, note, photos)`. Photo descriptors carry only the
//! integrity-relevant fields, so moving or renaming the underlying file
//! never invalidates a hash.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::canonical::canonical_json;
use crate::hash::Sha256Digest;
use crate::types::DateKey;

/// Maximum note length in characters.
pub const MAX_NOTE_LEN: usize = 500;

/// Maximum number of photos attached to one record.
pub const MAX_PHOTOS_PER_RECORD: usize = 3;

/// A dated journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Calendar date, unique; primary identity and freeze boundary.
    pub date_key: DateKey,
    /// Creation instant (Unix ms). Immutable once set.
    pub created_at: i64,
    /// Note text. Empty string when absent, never null.
    pub note: String,
    /// Hex digest of the canonical record shape.
    pub record_hash: String,
    /// Algorithm tag for `record_hash` (currently always `sha256`).
    pub algo: String,
    /// Ordered tags, serialized as JSON in storage.
    pub tags: Vec<String>,
    /// Optional free-form location label.
    pub location: Option<String>,
    /// The only field mutable after finalization.
    pub pinned: bool,
}

impl Record {
    /// The lifecycle status of this record relative to `today`.
    pub fn status(&self, today: &DateKey) -> RecordStatus {
        if &self.date_key == today {
            RecordStatus::Draft
        } else {
            RecordStatus::Finalized
        }
    }
}

/// Lifecycle state of a record.
///
/// `Draft` (today's record) is mutable and recomputes its hash in place.
/// Crossing into the next calendar day freezes it permanently; a finalized
/// record accepts no change except the `pinned` flag. There is no
/// transition back to `Draft`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStatus {
    Draft,
    Finalized,
}

/// A photo attached to a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    pub id: String,
    /// Owning record.
    pub date_key: DateKey,
    /// Opaque reference to the externally stored bytes. Not hashed.
    pub file_uri: String,
    pub mime_type: String,
    /// Hex digest of the raw file bytes, computed once at ingestion.
    pub sha256: String,
    /// Canonical ordering; ties broken by `id` ordinal comparison.
    pub sort_index: u32,
}

impl Photo {
    /// The integrity-relevant view of this photo.
    pub fn descriptor(&self) -> PhotoDescriptor {
        PhotoDescriptor {
            id: self.id.clone(),
            mime_type: self.mime_type.clone(),
            sha256: self.sha256.clone(),
            sort_index: self.sort_index,
        }
    }
}

/// Exactly the photo fields the record hash is computed over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoDescriptor {
    pub id: String,
    pub mime_type: String,
    pub sha256: String,
    pub sort_index: u32,
}

/// Build the canonical value shape for a record.
///
/// Photos are sorted ascending by `(sort_index, id)` *before*
/// canonicalization, since the canonical encoder preserves sequence order
/// rather than re-sorting it. An absent note becomes the empty string so
/// "no note" has a single representation. Photo digests are normalized to
/// lowercase hex.
pub fn build_canonical_record(
    date_key: &DateKey,
    created_at: i64,
    note: Option<&str>,
    photos: &[PhotoDescriptor],
) -> Value {
    let mut sorted: Vec<&PhotoDescriptor> = photos.iter().collect();
    sorted.sort_by(|a, b| {
        a.sort_index
            .cmp(&b.sort_index)
            .then_with(|| a.id.cmp(&b.id))
    });

    let photo_values: Vec<Value> = sorted
        .iter()
        .map(|p| {
            json!({
                "id": p.id,
                "mimeType": p.mime_type,
                "sha256": p.sha256.to_ascii_lowercase(),
                "sortIndex": p.sort_index,
            })
        })
        .collect();

    json!({
        "dateKey": date_key.as_str(),
        "createdAt": created_at,
        "note": note.unwrap_or(""),
        "photos": photo_values,
    })
}

/// Compute the record fingerprint: lowercase hex SHA-256 of the canonical
/// JSON form.
pub fn compute_record_hash(
    date_key: &DateKey,
    created_at: i64,
    note: Option<&str>,
    photos: &[PhotoDescriptor],
) -> String {
    let canonical = canonical_json(&build_canonical_record(date_key, created_at, note, photos));
    Sha256Digest::digest_str(&canonical).to_hex()
}

/// Re-verify a stored record fingerprint.
///
/// Recomputes the hash from the given fields and compares to `stored_hash`
/// case-insensitively. Returns `false` on any mismatch, never errors; the
/// caller surfaces a mismatch as a tamper warning, not a silent success.
pub fn verify_record_integrity(
    stored_hash: &str,
    date_key: &DateKey,
    created_at: i64,
    note: Option<&str>,
    photos: &[PhotoDescriptor],
) -> bool {
    let computed = compute_record_hash(date_key, created_at, note, photos);
    computed.eq_ignore_ascii_case(stored_hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::RECORD_HASH_ALGO;

    fn key(s: &str) -> DateKey {
        DateKey::parse(s).unwrap()
    }

    fn photo(id: &str, digest_byte: &str, sort_index: u32) -> PhotoDescriptor {
        PhotoDescriptor {
            id: id.to_string(),
            mime_type: "image/jpeg".to_string(),
            sha256: digest_byte.repeat(32),
            sort_index,
        }
    }

    #[test]
    fn test_hash_roundtrip() {
        let dk = key("2024-06-15");
        let photos = vec![photo("p1", "ab", 0)];
        let hash = compute_record_hash(&dk, 1_718_400_000_000, Some("note"), &photos);
        assert!(verify_record_integrity(
            &hash,
            &dk,
            1_718_400_000_000,
            Some("note"),
            &photos
        ));
    }

    #[test]
    fn test_verify_is_case_insensitive() {
        let dk = key("2024-06-15");
        let hash = compute_record_hash(&dk, 1000, None, &[]);
        assert!(verify_record_integrity(
            &hash.to_ascii_uppercase(),
            &dk,
            1000,
            None,
            &[]
        ));
    }

    #[test]
    fn test_absent_note_equals_empty_note() {
        let dk = key("2024-06-15");
        let h1 = compute_record_hash(&dk, 1000, None, &[]);
        let h2 = compute_record_hash(&dk, 1000, Some(""), &[]);
        assert_eq!(h1, h2);
    }

    #[test]
    fn test_photo_input_order_irrelevant() {
        let dk = key("2024-06-15");
        let a = photo("photo-a", "aa", 0);
        let b = photo("photo-b", "bb", 1);

        let h1 = compute_record_hash(&dk, 1000, Some("x"), &[a.clone(), b.clone()]);
        let h2 = compute_record_hash(&dk, 1000, Some("x"), &[b, a]);
        assert_eq!(h1, h2);
    }

    #[test]
    fn test_sort_index_ties_broken_by_id() {
        let dk = key("2024-06-15");
        let a = photo("aaa", "aa", 0);
        let b = photo("bbb", "bb", 0);

        let h1 = compute_record_hash(&dk, 1000, None, &[a.clone(), b.clone()]);
        let h2 = compute_record_hash(&dk, 1000, None, &[b, a]);
        assert_eq!(h1, h2);
    }

    #[test]
    fn test_tamper_changes_hash() {
        let dk = key("2024-06-15");
        let photos = vec![photo("p1", "aa", 0)];
        let base = compute_record_hash(&dk, 1000, Some("note"), &photos);

        // Note changed
        assert_ne!(base, compute_record_hash(&dk, 1000, Some("Note"), &photos));
        // createdAt changed
        assert_ne!(base, compute_record_hash(&dk, 1001, Some("note"), &photos));
        // Photo digest changed
        let mut tampered = photos.clone();
        tampered[0].sha256 = "cc".repeat(32);
        assert_ne!(base, compute_record_hash(&dk, 1000, Some("note"), &tampered));
        // Hash of the tampered shape no longer matches the stored one
        assert!(!verify_record_integrity(&base, &dk, 1000, Some("note"), &tampered));
    }

    #[test]
    fn test_descriptor_excludes_storage_path() {
        let p = Photo {
            id: "p1".into(),
            date_key: key("2024-06-15"),
            file_uri: "file:///old/path.jpg".into(),
            mime_type: "image/jpeg".into(),
            sha256: "aa".repeat(32),
            sort_index: 0,
        };
        let mut moved = p.clone();
        moved.file_uri = "file:///new/path.jpg".into();
        assert_eq!(p.descriptor(), moved.descriptor());
    }

    #[test]
    fn test_digest_hex_case_normalized_in_canonical_form() {
        let dk = key("2024-06-15");
        let lower = photo("p1", "ab", 0);
        let mut upper = lower.clone();
        upper.sha256 = upper.sha256.to_ascii_uppercase();
        assert_eq!(
            compute_record_hash(&dk, 1000, None, &[lower]),
            compute_record_hash(&dk, 1000, None, &[upper])
        );
    }

    #[test]
    fn test_status_transitions() {
        let record = Record {
            date_key: key("2024-06-15"),
            created_at: 1000,
            note: String::new(),
            record_hash: compute_record_hash(&key("2024-06-15"), 1000, None, &[]),
            algo: RECORD_HASH_ALGO.to_string(),
            tags: vec![],
            location: None,
            pinned: false,
        };
        assert_eq!(record.status(&key("2024-06-15")), RecordStatus::Draft);
        assert_eq!(record.status(&key("2024-06-16")), RecordStatus::Finalized);
    }
}
