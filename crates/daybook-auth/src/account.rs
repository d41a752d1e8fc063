//! Account registration, authentication and password reset.

use std::sync::Arc;

use daybook_core::Clock;
use daybook_store::{Account, AccountStore, InsertResult, OpClass, RateLimitStore, TokenPurpose};

use crate::error::Result;
use crate::mailer::EmailSender;
use crate::password::{hash_password, verify_password};
use crate::ratelimit::{Decision, RateLimiter};
use crate::token::{normalize_email, RequestOutcome, TokenLifecycle, VerifyOutcome};

/// Outcome of a registration attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// Account created; a verification PIN was requested.
    Registered,
    /// The email already has an account.
    EmailTaken,
}

/// Outcome of an authentication attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    Authenticated,
    /// Unknown email or wrong password. One reason, no detail.
    Rejected,
    RateLimited { locked_until: i64 },
}

/// Account operations over an [`AccountStore`].
///
/// Owns a [`TokenLifecycle`] for the two PIN flows and shares its rate
/// limiter for password authentication.
pub struct AccountService<A, R, M> {
    accounts: Arc<A>,
    limiter: RateLimiter<R>,
    tokens: TokenLifecycle<A, R, M>,
    clock: Arc<dyn Clock>,
}

impl<A, R, M> AccountService<A, R, M>
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
        let tokens = TokenLifecycle::new(
            Arc::clone(&accounts),
            limiter.clone(),
            mailer,
            Arc::clone(&clock),
        );
        Self {
            accounts,
            limiter,
            tokens,
            clock,
        }
    }

    /// Create an account and kick off email verification.
    pub async fn register(&self, email: &str, password: &str) -> Result<RegisterOutcome> {
        let email = normalize_email(email);
        let password_hash = hash_password(password)?;
        let account = Account::new(email.clone(), password_hash, self.clock.now_millis());

        match self.accounts.insert_account(&account).await? {
            InsertResult::AlreadyExists => Ok(RegisterOutcome::EmailTaken),
            InsertResult::Inserted => {
                // Best effort; the user can re-request a PIN later
                self.tokens
                    .request(&email, TokenPurpose::EmailVerification)
                    .await?;
                Ok(RegisterOutcome::Registered)
            }
        }
    }

    /// Verify a password. Success resets the `Auth` attempt window.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<AuthOutcome> {
        let email = normalize_email(email);

        if let Decision::Denied { locked_until } =
            self.limiter.check(&email, OpClass::Auth).await
        {
            return Ok(AuthOutcome::RateLimited { locked_until });
        }

        let Some(account) = self.accounts.get_by_email(&email).await? else {
            return Ok(AuthOutcome::Rejected);
        };

        if verify_password(password, &account.password_hash)? {
            self.limiter.reset(&email, OpClass::Auth).await;
            Ok(AuthOutcome::Authenticated)
        } else {
            Ok(AuthOutcome::Rejected)
        }
    }

    /// Request (or re-request) an email-verification PIN.
    pub async fn request_verification(&self, email: &str) -> Result<RequestOutcome> {
        self.tokens
            .request(email, TokenPurpose::EmailVerification)
            .await
    }

    /// Verify an email-verification PIN.
    pub async fn verify_email(&self, email: &str, pin: &str) -> Result<VerifyOutcome> {
        self.tokens
            .verify(email, TokenPurpose::EmailVerification, pin)
            .await
    }

    /// Request a password-reset PIN.
    pub async fn request_password_reset(&self, email: &str) -> Result<RequestOutcome> {
        self.tokens.request(email, TokenPurpose::PasswordReset).await
    }

    /// Redeem a password-reset PIN and install a new password.
    ///
    /// On success the `Auth` window is also reset so the user can log in
    /// immediately even after a string of failed logins.
    pub async fn reset_password(
        &self,
        email: &str,
        pin: &str,
        new_password: &str,
    ) -> Result<VerifyOutcome> {
        let outcome = self
            .tokens
            .verify(email, TokenPurpose::PasswordReset, pin)
            .await?;
        if outcome == VerifyOutcome::Verified {
            let email = normalize_email(email);
            let password_hash = hash_password(new_password)?;
            self.accounts
                .set_password_hash(&email, &password_hash)
                .await?;
            self.limiter.reset(&email, OpClass::Auth).await;
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use daybook_core::ManualClock;
    use daybook_store::MemoryStore;

    use crate::mailer::RecordingMailer;
    use crate::ratelimit::RateLimiterConfig;

    struct Fixture {
        store: Arc<MemoryStore>,
        mailer: Arc<RecordingMailer>,
        service: AccountService<MemoryStore, MemoryStore, RecordingMailer>,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let mailer = Arc::new(RecordingMailer::new());
        let clock = Arc::new(ManualClock::new(1_000_000)) as Arc<dyn Clock>;
        let limiter = RateLimiter::new(
            Arc::clone(&store),
            RateLimiterConfig::default(),
            Arc::clone(&clock),
        );
        let service =
            AccountService::new(Arc::clone(&store), limiter, Arc::clone(&mailer), clock);
        Fixture {
            store,
            mailer,
            service,
        }
    }

    #[tokio::test]
    async fn test_register_then_authenticate() {
        let fx = fixture();
        let outcome = fx
            .service
            .register("user@example.com", "hunter22-but-longer")
            .await
            .unwrap();
        assert_eq!(outcome, RegisterOutcome::Registered);
        // Registration sends the verification PIN
        assert_eq!(fx.mailer.count(), 1);

        assert_eq!(
            fx.service
                .authenticate("user@example.com", "hunter22-but-longer")
                .await
                .unwrap(),
            AuthOutcome::Authenticated
        );
        assert_eq!(
            fx.service
                .authenticate("user@example.com", "wrong")
                .await
                .unwrap(),
            AuthOutcome::Rejected
        );
    }

    #[tokio::test]
    async fn test_duplicate_registration() {
        let fx = fixture();
        fx.service
            .register("user@example.com", "first password")
            .await
            .unwrap();
        let outcome = fx
            .service
            .register("USER@example.com", "second password")
            .await
            .unwrap();
        assert_eq!(outcome, RegisterOutcome::EmailTaken);
        // No second verification email for the failed registration
        assert_eq!(fx.mailer.count(), 1);
    }

    #[tokio::test]
    async fn test_unknown_email_rejected_not_errored() {
        let fx = fixture();
        assert_eq!(
            fx.service
                .authenticate("nobody@example.com", "whatever")
                .await
                .unwrap(),
            AuthOutcome::Rejected
        );
    }

    #[tokio::test]
    async fn test_auth_lockout_and_reset_on_success() {
        let fx = fixture();
        fx.service
            .register("user@example.com", "right password")
            .await
            .unwrap();

        for _ in 0..4 {
            fx.service
                .authenticate("user@example.com", "wrong")
                .await
                .unwrap();
        }
        // Success on the final in-window attempt clears the counter
        assert_eq!(
            fx.service
                .authenticate("user@example.com", "right password")
                .await
                .unwrap(),
            AuthOutcome::Authenticated
        );
        // A full window is available again
        for _ in 0..4 {
            assert_eq!(
                fx.service
                    .authenticate("user@example.com", "wrong")
                    .await
                    .unwrap(),
                AuthOutcome::Rejected
            );
        }
    }

    #[tokio::test]
    async fn test_lockout_applies_even_with_correct_password() {
        let fx = fixture();
        fx.service
            .register("user@example.com", "right password")
            .await
            .unwrap();

        for _ in 0..5 {
            fx.service
                .authenticate("user@example.com", "wrong")
                .await
                .unwrap();
        }
        let outcome = fx
            .service
            .authenticate("user@example.com", "right password")
            .await
            .unwrap();
        assert!(matches!(outcome, AuthOutcome::RateLimited { .. }));
    }

    #[tokio::test]
    async fn test_email_verification_flow() {
        let fx = fixture();
        fx.service
            .register("user@example.com", "some password")
            .await
            .unwrap();

        let account = fx
            .store
            .get_by_email("user@example.com")
            .await
            .unwrap()
            .unwrap();
        let pin = account.email_verification_token.clone().unwrap();

        assert_eq!(
            fx.service.verify_email("user@example.com", &pin).await.unwrap(),
            VerifyOutcome::Verified
        );
        let account = fx
            .store
            .get_by_email("user@example.com")
            .await
            .unwrap()
            .unwrap();
        assert!(account.email_verified);
    }

    #[tokio::test]
    async fn test_password_reset_flow() {
        let fx = fixture();
        fx.service
            .register("user@example.com", "old password")
            .await
            .unwrap();
        fx.service
            .request_password_reset("user@example.com")
            .await
            .unwrap();

        let account = fx
            .store
            .get_by_email("user@example.com")
            .await
            .unwrap()
            .unwrap();
        let pin = account.password_reset_token.clone().unwrap();

        assert_eq!(
            fx.service
                .reset_password("user@example.com", &pin, "new password")
                .await
                .unwrap(),
            VerifyOutcome::Verified
        );

        assert_eq!(
            fx.service
                .authenticate("user@example.com", "old password")
                .await
                .unwrap(),
            AuthOutcome::Rejected
        );
        assert_eq!(
            fx.service
                .authenticate("user@example.com", "new password")
                .await
                .unwrap(),
            AuthOutcome::Authenticated
        );
    }

    #[tokio::test]
    async fn test_reset_with_wrong_pin_keeps_password() {
        let fx = fixture();
        fx.service
            .register("user@example.com", "old password")
            .await
            .unwrap();
        fx.service
            .request_password_reset("user@example.com")
            .await
            .unwrap();

        assert_eq!(
            fx.service
                .reset_password("user@example.com", "000000", "new password")
                .await
                .unwrap(),
            VerifyOutcome::Rejected
        );
        assert_eq!(
            fx.service
                .authenticate("user@example.com", "old password")
                .await
                .unwrap(),
            AuthOutcome::Authenticated
        );
    }
}
