//! Golden test vectors for deterministic verification.
//!
//! These vectors ensure that canonical encoding and record hashing produce
//! identical results across all implementations. Expected values were
//! computed independently of this codebase.

use daybook_core::{compute_record_hash, DateKey, PhotoDescriptor};

/// A golden test vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Record date key.
    pub date_key: &'static str,
    /// Creation timestamp (Unix ms).
    pub created_at: i64,
    /// Note text, if any.
    pub note: Option<&'static str>,
    /// Photo descriptors as `(id, mime_type, sha256, sort_index)`.
    pub photos: &'static [(&'static str, &'static str, &'static str, u32)],
    /// Expected record hash (lowercase hex).
    pub expected_hash: &'static str,
}

const DIGEST_AA: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
const DIGEST_BB: &str = "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";
const DIGEST_CC: &str = "cccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccc";

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "two photos, short note",
            date_key: "2024-01-01",
            created_at: 1_704_103_200_000,
            note: Some("test"),
            photos: &[
                ("photo-a", "image/jpeg", DIGEST_AA, 0),
                ("photo-b", "image/png", DIGEST_BB, 1),
            ],
            expected_hash: "a3b82152449d691e77d849f0ab22f0e96bcb3406e9f807b9945efe20e3ddab2d",
        },
        GoldenVector {
            name: "epoch, no note, no photos",
            date_key: "1970-01-01",
            created_at: 0,
            note: None,
            photos: &[],
            expected_hash: "2480031bfbfbb0aeb2624f1f3862f703495966322c3a467792acde2a6f6789fd",
        },
        GoldenVector {
            name: "note requiring JSON escapes",
            date_key: "2024-03-09",
            created_at: 1_709_992_800_000,
            note: Some("line one\nline \"two\"\ttab"),
            photos: &[],
            expected_hash: "b0e798c912cab1e9363f49f958294fe1f4149a030d65b787545c02a2e7cdbe60",
        },
        GoldenVector {
            name: "two photos, second digest tampered",
            date_key: "2024-01-01",
            created_at: 1_704_103_200_000,
            note: Some("test"),
            photos: &[
                ("photo-a", "image/jpeg", DIGEST_AA, 0),
                ("photo-b", "image/png", DIGEST_CC, 1),
            ],
            expected_hash: "8448955edc94d456347505854a2bb25b0bfb455b691f1bc364f32438a101dddc",
        },
    ]
}

/// Compute the record hash for a golden vector's inputs.
pub fn record_hash_from_vector(vector: &GoldenVector) -> String {
    let date_key = DateKey::parse(vector.date_key)
        .unwrap_or_else(|_| panic!("vector {} has a bad date key", vector.name));
    let photos: Vec<PhotoDescriptor> = vector
        .photos
        .iter()
        .map(|(id, mime_type, sha256, sort_index)| PhotoDescriptor {
            id: id.to_string(),
            mime_type: mime_type.to_string(),
            sha256: sha256.to_string(),
            sort_index: *sort_index,
        })
        .collect();
    compute_record_hash(&date_key, vector.created_at, vector.note, &photos)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_vectors_match() {
        for vector in all_vectors() {
            assert_eq!(
                record_hash_from_vector(&vector),
                vector.expected_hash,
                "vector '{}' hash mismatch",
                vector.name
            );
        }
    }

    #[test]
    fn test_vector_names_are_unique() {
        let vectors = all_vectors();
        let mut names: Vec<_> = vectors.iter().map(|v| v.name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), vectors.len());
    }
}
