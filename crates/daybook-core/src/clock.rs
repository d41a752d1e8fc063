//! Clock abstraction.
//!
//! Every time-dependent decision (record freezing, token expiry, rate-limit
//! windows) reads the clock through this trait, constructed once at startup
//! and passed in explicitly. No module-level time state.

use crate::types::DateKey;

/// A source of the current instant (Unix milliseconds).
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;

    /// The current calendar date key (UTC).
    fn today(&self) -> DateKey {
        DateKey::from_millis(self.now_millis())
    }
}

/// System wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0)
    }
}

/// A clock that only moves when told to.
///
/// Lets tests cross expiry windows and calendar-day boundaries without
/// sleeping.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: std::sync::atomic::AtomicI64,
}

impl ManualClock {
    pub fn new(now_millis: i64) -> Self {
        Self {
            now: std::sync::atomic::AtomicI64::new(now_millis),
        }
    }

    pub fn set(&self, now_millis: i64) {
        self.now.store(now_millis, std::sync::atomic::Ordering::SeqCst);
    }

    pub fn advance(&self, delta_millis: i64) {
        self.now
            .fetch_add(delta_millis, std::sync::atomic::Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_moves_forward() {
        let clock = SystemClock;
        let a = clock.now_millis();
        let b = clock.now_millis();
        assert!(b >= a);
        assert!(a > 1_600_000_000_000); // after 2020
    }

    #[test]
    fn test_today_derives_from_now() {
        let clock = SystemClock;
        assert_eq!(clock.today(), DateKey::from_millis(clock.now_millis()));
    }

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(1_704_103_200_000); // 2024-01-01T10:00:00Z
        assert_eq!(clock.today().as_str(), "2024-01-01");

        clock.advance(24 * 60 * 60 * 1000);
        assert_eq!(clock.today().as_str(), "2024-01-02");

        clock.set(0);
        assert_eq!(clock.now_millis(), 0);
    }
}
