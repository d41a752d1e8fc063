//! Proptest generators for property-based testing.

use proptest::prelude::*;

use daybook_core::{DateKey, PhotoDescriptor, MAX_NOTE_LEN, MAX_PHOTOS_PER_RECORD};

/// Generate a valid date key.
///
/// Days stop at 28 so every (year, month) combination is valid without
/// calendar arithmetic.
pub fn date_key() -> impl Strategy<Value = DateKey> {
    (1970u32..=2099, 1u32..=12, 1u32..=28).prop_map(|(y, m, d)| {
        DateKey::parse(&format!("{y:04}-{m:02}-{d:02}")).unwrap()
    })
}

/// Generate a note within the length limit, including multibyte text.
pub fn note() -> impl Strategy<Value = String> {
    proptest::collection::vec(any::<char>(), 0..=MAX_NOTE_LEN)
        .prop_map(|chars| chars.into_iter().collect())
}

/// Generate a 64-char lowercase hex digest.
pub fn hex_digest() -> impl Strategy<Value = String> {
    any::<[u8; 32]>().prop_map(hex::encode)
}

/// Generate a creation timestamp within a plausible range.
pub fn created_at() -> impl Strategy<Value = i64> {
    0i64..=4_102_444_800_000 // up to 2100-01-01
}

/// Generate one photo descriptor with the given id.
fn photo_with_id(id: String) -> impl Strategy<Value = PhotoDescriptor> {
    (hex_digest(), 0u32..=10, prop_oneof!["image/jpeg", "image/png", "image/heic"]).prop_map(
        move |(sha256, sort_index, mime_type)| PhotoDescriptor {
            id: id.clone(),
            mime_type,
            sha256,
            sort_index,
        },
    )
}

/// Generate up to the photo limit, with unique ids.
pub fn photo_set() -> impl Strategy<Value = Vec<PhotoDescriptor>> {
    proptest::collection::btree_set("[a-z0-9]{4,12}", 0..=MAX_PHOTOS_PER_RECORD).prop_flat_map(
        |ids| {
            let photos: Vec<_> = ids.into_iter().map(photo_with_id).collect();
            photos
        },
    )
}
