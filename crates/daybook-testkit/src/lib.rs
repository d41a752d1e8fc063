//! # Daybook Testkit
//!
//! Testing utilities for Daybook.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known record shapes with expected canonical text
//!   and hashes for cross-platform verification
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Helper structs for setting up journal and account
//!   test scenarios
//!
//! ## Golden Vectors
//!
//! ```rust
//! use daybook_testkit::vectors::all_vectors;
//!
//! for vector in all_vectors() {
//!     println!("{}: {}", vector.name, vector.expected_hash);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use daybook_testkit::generators::{date_key, photo_set};
//!
//! proptest! {
//!     #[test]
//!     fn hash_is_deterministic(dk in date_key(), photos in photo_set()) {
//!         // ...
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust,ignore
//! use daybook_testkit::fixtures::JournalFixture;
//!
//! let fixture = JournalFixture::new();
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{AccountFixture, JournalFixture};
pub use vectors::{all_vectors, record_hash_from_vector, GoldenVector};
