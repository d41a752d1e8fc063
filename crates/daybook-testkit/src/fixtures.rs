//! Test fixtures and helpers.
//!
//! Common setup code for integration tests. Every fixture runs on a
//! [`ManualClock`] so tests control the calendar, including the midnight
//! freeze boundary.

use std::sync::Arc;

use daybook::{EntryDraft, Journal, JournalConfig, NewPhoto};
use daybook_auth::{AccountService, RateLimiter, RateLimiterConfig, RecordingMailer};
use daybook_core::{Clock, ManualClock};
use daybook_store::MemoryStore;

/// One day in milliseconds.
pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// A reference instant: 2024-06-15T12:00:00Z.
pub const DEFAULT_NOW_MS: i64 = 1_718_452_800_000;

/// A journal over a memory store with a controllable clock.
pub struct JournalFixture {
    pub journal: Journal<MemoryStore>,
    pub clock: Arc<ManualClock>,
}

impl JournalFixture {
    /// Create a fixture at the default instant.
    pub fn new() -> Self {
        Self::at(DEFAULT_NOW_MS)
    }

    /// Create a fixture frozen at a given instant.
    pub fn at(now_ms: i64) -> Self {
        let clock = Arc::new(ManualClock::new(now_ms));
        Self {
            journal: Journal::new(
                MemoryStore::new(),
                JournalConfig::default(),
                clock.clone() as Arc<dyn Clock>,
            ),
            clock,
        }
    }

    /// Advance the clock past the next midnight, finalizing today's entry.
    pub fn cross_midnight(&self) {
        self.clock.advance(DAY_MS);
    }

    /// A draft with just a note.
    pub fn note_draft(note: &str) -> EntryDraft {
        EntryDraft {
            note: Some(note.to_string()),
            ..Default::default()
        }
    }

    /// A photo input whose digest is computed from the given bytes.
    pub fn photo(id: &str, bytes: &[u8], sort_index: u32) -> NewPhoto {
        NewPhoto {
            id: id.to_string(),
            file_uri: format!("file:///photos/{id}.jpg"),
            mime_type: "image/jpeg".to_string(),
            bytes: bytes.to_vec(),
            sort_index,
        }
    }
}

impl Default for JournalFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// An account service over a memory store with a recording mailer.
pub struct AccountFixture {
    pub store: Arc<MemoryStore>,
    pub mailer: Arc<RecordingMailer>,
    pub clock: Arc<ManualClock>,
    pub service: AccountService<MemoryStore, MemoryStore, RecordingMailer>,
}

impl AccountFixture {
    pub fn new() -> Self {
        Self::with_config(RateLimiterConfig::default())
    }

    /// Create with a custom rate-limit configuration.
    pub fn with_config(config: RateLimiterConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let mailer = Arc::new(RecordingMailer::new());
        let clock = Arc::new(ManualClock::new(DEFAULT_NOW_MS));
        let limiter = RateLimiter::new(Arc::clone(&store), config, clock.clone() as Arc<dyn Clock>);
        let service = AccountService::new(
            Arc::clone(&store),
            limiter,
            Arc::clone(&mailer),
            clock.clone() as Arc<dyn Clock>,
        );
        Self {
            store,
            mailer,
            clock,
            service,
        }
    }

    /// Extract the 6-digit PIN from the most recent email, if any.
    pub fn last_pin(&self) -> Option<String> {
        let body = self.mailer.last_body()?;
        let digits: Vec<&str> = body
            .split(|c: char| !c.is_ascii_digit())
            .filter(|run| run.len() == 6)
            .collect();
        digits.first().map(|s| s.to_string())
    }
}

impl Default for AccountFixture {
    fn default() -> Self {
        Self::new()
    }
}
