//! Strong type definitions for Daybook.
//!
//! Identifiers are newtypes to prevent misuse at compile time.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// The calendar-date identity of a record, formatted `YYYY-MM-DD`.
///
/// A `DateKey` is both the primary key of a record and its finalization
/// boundary: once the calendar rolls past a key, the record it names is
/// frozen. Keys compare lexicographically, which for this format is also
/// chronological order.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DateKey(String);

impl DateKey {
    /// Parse a `YYYY-MM-DD` string into a validated date key.
    ///
    /// Rejects non-padded forms like `2024-1-1` so that every key has a
    /// single spelling.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| CoreError::InvalidDateKey(s.to_string()))?;
        let formatted = date.format("%Y-%m-%d").to_string();
        if formatted != s {
            return Err(CoreError::InvalidDateKey(s.to_string()));
        }
        Ok(Self(formatted))
    }

    /// Derive the date key for an instant (Unix milliseconds, UTC calendar).
    pub fn from_millis(ms: i64) -> Self {
        let dt = DateTime::<Utc>::from_timestamp_millis(ms).unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
        Self(dt.format("%Y-%m-%d").to_string())
    }

    /// The key as its literal string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DateKey({})", self.0)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for DateKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for DateKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_key() {
        let key = DateKey::parse("2024-01-01").unwrap();
        assert_eq!(key.as_str(), "2024-01-01");
    }

    #[test]
    fn test_parse_rejects_unpadded() {
        assert!(DateKey::parse("2024-1-1").is_err());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(DateKey::parse("not-a-date").is_err());
        assert!(DateKey::parse("2024-13-01").is_err());
        assert!(DateKey::parse("2024-02-30").is_err());
        assert!(DateKey::parse("").is_err());
    }

    #[test]
    fn test_from_millis() {
        // 2024-01-01T10:00:00Z
        let key = DateKey::from_millis(1_704_103_200_000);
        assert_eq!(key.as_str(), "2024-01-01");

        let epoch = DateKey::from_millis(0);
        assert_eq!(epoch.as_str(), "1970-01-01");
    }

    #[test]
    fn test_ordering_is_chronological() {
        let a = DateKey::parse("2023-12-31").unwrap();
        let b = DateKey::parse("2024-01-01").unwrap();
        assert!(a < b);
    }
}
