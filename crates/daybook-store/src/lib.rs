//! # Daybook Store
//!
//! Storage abstraction for Daybook. Provides trait-based interfaces for
//! record, account, and rate-limit persistence with SQLite and in-memory
//! implementations.
//!
//! ## Overview
//!
//! Three traits form the collaborator boundary the rest of the system
//! depends on:
//!
//! - [`RecordStore`] - records and their photos
//! - [`AccountStore`] - accounts, verification/reset tokens, flags
//! - [`RateLimitStore`] - sliding-window attempt entries
//!
//! The primary implementation is [`SqliteStore`], with [`MemoryStore`] for
//! tests. Both uphold the same semantics.
//!
//! ## Design Notes
//!
//! - **Idempotent inserts**: inserting an existing record/account returns
//!   `AlreadyExists`, not an error.
//! - **Cascade ownership**: deleting a record deletes its photos.
//! - **Boundary normalization**: `email_verified` is stored as 0/1 and
//!   converted to `bool` in the row mapper; only the boolean form ever
//!   leaves this crate.
//! - **Failure semantics**: all failures propagate as [`StoreError`]. The
//!   rate limiter treats its own store errors as fail-open; that policy
//!   lives in the caller, not here.

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{
    Account, AccountStore, InsertResult, OpClass, RateLimitEntry, RateLimitStore, RecordStore,
    TokenPurpose,
};
