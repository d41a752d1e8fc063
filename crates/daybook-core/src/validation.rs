//! Structural validation for records and their photos.

use std::collections::HashSet;

use crate::error::ValidationError;
use crate::record::{PhotoDescriptor, Record, MAX_NOTE_LEN, MAX_PHOTOS_PER_RECORD};
use crate::types::DateKey;

/// Validate the user-supplied fields of an entry before hashing.
///
/// This performs:
/// - Note length check (chars, not bytes)
/// - Photo count check
/// - Per-photo digest and mime type checks
/// - Duplicate photo id check
pub fn validate_entry(note: &str, photos: &[PhotoDescriptor]) -> Result<(), ValidationError> {
    // 1. Note length
    let len = note.chars().count();
    if len > MAX_NOTE_LEN {
        return Err(ValidationError::NoteTooLong {
            len,
            max: MAX_NOTE_LEN,
        });
    }

    // 2. Photo count
    if photos.len() > MAX_PHOTOS_PER_RECORD {
        return Err(ValidationError::TooManyPhotos {
            count: photos.len(),
            max: MAX_PHOTOS_PER_RECORD,
        });
    }

    // 3. Per-photo checks
    let mut seen_ids = HashSet::new();
    for photo in photos {
        if !is_hex_digest(&photo.sha256) {
            return Err(ValidationError::InvalidPhotoDigest {
                id: photo.id.clone(),
            });
        }
        if !photo.mime_type.starts_with("image/") {
            return Err(ValidationError::UnsupportedMimeType {
                id: photo.id.clone(),
                mime: photo.mime_type.clone(),
            });
        }
        if !seen_ids.insert(photo.id.as_str()) {
            return Err(ValidationError::DuplicatePhotoId(photo.id.clone()));
        }
    }

    Ok(())
}

/// Validate a fully built record and its attached photos, including the
/// hash metadata shape.
pub fn validate_record(
    record: &Record,
    photos: &[PhotoDescriptor],
) -> Result<(), ValidationError> {
    DateKey::parse(record.date_key.as_str())?;
    if !is_hex_digest(&record.record_hash) {
        return Err(ValidationError::StructuralError(format!(
            "record hash is not a 64-char hex digest: {}",
            record.record_hash
        )));
    }
    validate_entry(&record.note, photos)
}

/// A 64-character hex string (either case).
fn is_hex_digest(s: &str) -> bool {
    s.len() == 64 && s.chars().all(|c| c.is_ascii_hexdigit())
}
