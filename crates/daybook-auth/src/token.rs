//! 6-digit PIN token lifecycle for email verification and password reset.
//!
//! Both purposes share one flow: generate a PIN, store it on the account
//! with an expiry, email it, then verify an attempted PIN against the
//! stored slot. Requesting is rate limited per email on the `EmailSend`
//! class, verification on `PinVerification`.
//!
//! Request outcomes are enumeration-resistant: a request against an email
//! with no account still reports `Accepted`, and mailer failures are
//! logged but never surfaced to the requester.

use std::sync::Arc;

use rand::Rng;

use daybook_core::Clock;
use daybook_store::{AccountStore, OpClass, RateLimitStore, TokenPurpose};

use crate::mailer::EmailSender;
use crate::ratelimit::{Decision, RateLimiter};

/// PIN validity window: 10 minutes.
pub const PIN_TTL_MS: i64 = 10 * 60 * 1000;

/// Generate a 6-digit PIN in `100000..=999999`.
///
/// The range excludes leading zeros so the PIN survives any integer
/// round-trip a client might put it through.
pub fn generate_pin() -> String {
    rand::thread_rng().gen_range(100_000..=999_999).to_string()
}

/// Outcome of requesting a PIN.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// Request processed. Reported even when no such account exists.
    Accepted,
    /// Too many send requests for this email.
    RateLimited { locked_until: i64 },
}

/// Outcome of verifying a PIN.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// The PIN matched; the token slot is now cleared.
    Verified,
    /// Wrong, expired or absent PIN. One reason, no detail.
    Rejected,
    /// Too many verification attempts for this email.
    RateLimited { locked_until: i64 },
}

/// PIN generation, delivery and verification over an [`AccountStore`].
pub struct TokenLifecycle<A, R, M> {
    accounts: Arc<A>,
    limiter: RateLimiter<R>,
    mailer: Arc<M>,
    clock: Arc<dyn Clock>,
}

impl<A, R, M> Clone for TokenLifecycle<A, R, M> {
    fn clone(&self) -> Self {
        Self {
            accounts: Arc::clone(&self.accounts),
            limiter: self.limiter.clone(),
            mailer: Arc::clone(&self.mailer),
            clock: Arc::clone(&self.clock),
        }
    }
}

/// Lowercase and trim an email so one mailbox maps to one account row.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

impl<A, R, M> TokenLifecycle<A, R, M>
where
    A: AccountStore,
    R: RateLimitStore,
    M: EmailSender,
{
    pub fn new(
        accounts: Arc<A>,
        limiter: RateLimiter<R>,
        mailer: Arc<M>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            accounts,
            limiter,
            mailer,
            clock,
        }
    }

    /// Generate and email a fresh PIN for `purpose`.
    ///
    /// Overwrites any previous token in that slot, so only the latest PIN
    /// is ever valid.
    pub async fn request(
        &self,
        email: &str,
        purpose: TokenPurpose,
    ) -> crate::error::Result<RequestOutcome> {
        let email = normalize_email(email);

        // Rate limit first: the limit applies whether or not the account
        // exists, so the limiter itself leaks nothing.
        if let Decision::Denied { locked_until } =
            self.limiter.check(&email, OpClass::EmailSend).await
        {
            return Ok(RequestOutcome::RateLimited { locked_until });
        }

        let Some(account) = self.accounts.get_by_email(&email).await? else {
            tracing::debug!(purpose = ?purpose, "pin requested for unknown email");
            return Ok(RequestOutcome::Accepted);
        };

        // Re-verifying an already-verified email is a no-op, still Accepted.
        if purpose == TokenPurpose::EmailVerification && account.email_verified {
            return Ok(RequestOutcome::Accepted);
        }

        let pin = generate_pin();
        let expiry = self.clock.now_millis() + PIN_TTL_MS;
        self.accounts
            .set_token(&email, purpose, &pin, expiry)
            .await?;

        let (subject, body) = match purpose {
            TokenPurpose::EmailVerification => (
                "Verify your email",
                format!("Your verification code is {pin}. It expires in 10 minutes."),
            ),
            TokenPurpose::PasswordReset => (
                "Reset your password",
                format!("Your password reset code is {pin}. It expires in 10 minutes."),
            ),
        };
        if let Err(e) = self.mailer.send(&email, subject, &body).await {
            tracing::warn!(purpose = ?purpose, error = %e, "pin email delivery failed");
        }

        Ok(RequestOutcome::Accepted)
    }

    /// Verify an attempted PIN for `purpose`.
    ///
    /// All failure modes collapse into [`VerifyOutcome::Rejected`]. On
    /// success the token slot is cleared (single use) and the
    /// `PinVerification` window for this email is reset.
    pub async fn verify(
        &self,
        email: &str,
        purpose: TokenPurpose,
        attempted_pin: &str,
    ) -> crate::error::Result<VerifyOutcome> {
        let email = normalize_email(email);

        if let Decision::Denied { locked_until } = self
            .limiter
            .check(&email, OpClass::PinVerification)
            .await
        {
            return Ok(VerifyOutcome::RateLimited { locked_until });
        }

        let Some(account) = self.accounts.get_by_email(&email).await? else {
            return Ok(VerifyOutcome::Rejected);
        };

        if purpose == TokenPurpose::EmailVerification && account.email_verified {
            return Ok(VerifyOutcome::Rejected);
        }

        let (stored, expiry) = account.token_for(purpose);
        let (Some(stored), Some(expiry)) = (stored, expiry) else {
            return Ok(VerifyOutcome::Rejected);
        };
        if self.clock.now_millis() > expiry {
            return Ok(VerifyOutcome::Rejected);
        }
        // PINs are compared as strings; "012345" never equals "12345"
        if stored != attempted_pin {
            return Ok(VerifyOutcome::Rejected);
        }

        self.accounts.clear_token(&email, purpose).await?;
        if purpose == TokenPurpose::EmailVerification {
            self.accounts.set_verified(&email, true).await?;
        }
        self.limiter.reset(&email, OpClass::PinVerification).await;

        Ok(VerifyOutcome::Verified)
    }
}
