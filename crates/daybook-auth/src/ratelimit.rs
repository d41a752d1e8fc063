//! Sliding-window rate limiting with lockout.
//!
//! One limiter instance serves all three operation classes; each class has
//! its own thresholds, and `(class, identifier)` keys one attempt window.
//!
//! Storage failures are logged and fail open as [`Decision::Indeterminate`]:
//! a rate-limiter outage must not lock every user out. This is a deliberate
//! availability-over-strictness policy; everywhere outside this module a
//! storage fault is a hard error.

use std::collections::HashSet;
use std::sync::Arc;

use daybook_core::Clock;
use daybook_store::{OpClass, RateLimitEntry, RateLimitStore};

const MINUTE_MS: i64 = 60_000;

/// Thresholds for one operation class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatePolicy {
    /// Attempts permitted within one window.
    pub max_attempts: u32,
    /// Window length in milliseconds.
    pub window_ms: i64,
    /// Lockout length once the window is exhausted.
    pub lockout_ms: i64,
}

/// Per-class policies plus the static allow-list.
///
/// The allow-list is an operational/testing exemption: a listed identifier
/// is never counted and never locked. It is configuration, not a hard-coded
/// identity.
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    pub auth: RatePolicy,
    pub pin_verification: RatePolicy,
    pub email_send: RatePolicy,
    pub exempt: HashSet<String>,
}

impl RateLimiterConfig {
    /// The policy for an operation class.
    pub fn policy(&self, class: OpClass) -> RatePolicy {
        match class {
            OpClass::Auth => self.auth,
            OpClass::PinVerification => self.pin_verification,
            OpClass::EmailSend => self.email_send,
        }
    }
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            auth: RatePolicy {
                max_attempts: 5,
                window_ms: 15 * MINUTE_MS,
                lockout_ms: 15 * MINUTE_MS,
            },
            // Tightest window: PINs are guessable in few tries
            pin_verification: RatePolicy {
                max_attempts: 5,
                window_ms: 5 * MINUTE_MS,
                lockout_ms: 15 * MINUTE_MS,
            },
            // Longest lockout: outbound mail is the expensive resource
            email_send: RatePolicy {
                max_attempts: 3,
                window_ms: 10 * MINUTE_MS,
                lockout_ms: 60 * MINUTE_MS,
            },
            exempt: HashSet::new(),
        }
    }
}

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The attempt may proceed; `remaining` attempts left in this window.
    Allowed { remaining: u32 },
    /// Locked out until the given instant (Unix ms).
    Denied { locked_until: i64 },
    /// The limiter's storage failed; treated as allowed (fail open).
    Indeterminate,
}

impl Decision {
    /// Whether the caller may proceed. `Indeterminate` counts as allowed.
    pub fn is_allowed(&self) -> bool {
        !matches!(self, Decision::Denied { .. })
    }

    /// The lockout end, when denied.
    pub fn locked_until(&self) -> Option<i64> {
        match self {
            Decision::Denied { locked_until } => Some(*locked_until),
            _ => None,
        }
    }
}

/// Sliding-window rate limiter over a [`RateLimitStore`].
pub struct RateLimiter<S> {
    store: Arc<S>,
    config: RateLimiterConfig,
    clock: Arc<dyn Clock>,
}

impl<S> Clone for RateLimiter<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config.clone(),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S: RateLimitStore> RateLimiter<S> {
    pub fn new(store: Arc<S>, config: RateLimiterConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            config,
            clock,
        }
    }

    /// Check-and-record one attempt for `(identifier, class)`.
    ///
    /// The call that consumes the final attempt of a window is still
    /// allowed but starts the lockout; every call after it is denied until
    /// `locked_until` passes, after which a fresh window begins.
    ///
    /// The load-mutate-persist cycle here is not transactionally atomic:
    /// two concurrent checks for one identifier can both read the
    /// pre-increment count and under-count by one. Known race, accepted
    /// for a single-caller local store.
    pub async fn check(&self, identifier: &str, class: OpClass) -> Decision {
        let policy = self.config.policy(class);

        // 1. Allow-list bypass
        if self.config.exempt.contains(identifier) {
            return Decision::Allowed {
                remaining: u32::MAX,
            };
        }

        let now = self.clock.now_millis();

        // 2. Load existing entry; none means a fresh window
        let entry = match self.store.get_entry(class, identifier).await {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(class = class.as_str(), error = %e, "rate limit read failed, failing open");
                return Decision::Indeterminate;
            }
        };

        let Some(mut entry) = entry else {
            let fresh = RateLimitEntry {
                op_class: class,
                identifier: identifier.to_string(),
                attempts: 1,
                first_attempt: now,
                locked_until: None,
            };
            return self
                .persist(fresh, Decision::Allowed {
                    remaining: policy.max_attempts.saturating_sub(1),
                })
                .await;
        };

        // 3. Active lockout
        if let Some(locked_until) = entry.locked_until {
            if locked_until > now {
                return Decision::Denied { locked_until };
            }
        }

        // 4. Expired lockout or elapsed window resets to a fresh window
        if entry.locked_until.is_some() || now - entry.first_attempt > policy.window_ms {
            entry.attempts = 1;
            entry.first_attempt = now;
            entry.locked_until = None;
            return self
                .persist(entry, Decision::Allowed {
                    remaining: policy.max_attempts.saturating_sub(1),
                })
                .await;
        }

        // 5. Count this attempt; exhausting the window starts the lockout
        entry.attempts += 1;
        if entry.attempts >= policy.max_attempts {
            entry.locked_until = Some(now + policy.lockout_ms);
        }
        let decision = Decision::Allowed {
            remaining: policy.max_attempts.saturating_sub(entry.attempts),
        };
        self.persist(entry, decision).await
    }

    /// Delete the entry for `(identifier, class)`.
    ///
    /// Called on every successful authentication/verification so legitimate
    /// users are never penalized by their own prior failures.
    pub async fn reset(&self, identifier: &str, class: OpClass) {
        if let Err(e) = self.store.delete_entry(class, identifier).await {
            tracing::warn!(class = class.as_str(), error = %e, "rate limit reset failed");
        }
    }

    async fn persist(&self, entry: RateLimitEntry, decision: Decision) -> Decision {
        match self.store.put_entry(&entry).await {
            Ok(()) => decision,
            Err(e) => {
                tracing::warn!(
                    class = entry.op_class.as_str(),
                    error = %e,
                    "rate limit write failed, failing open"
                );
                Decision::Indeterminate
            }
        }
    }
}
