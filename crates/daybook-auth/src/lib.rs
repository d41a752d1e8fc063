//! # Daybook Auth
//!
//! Rate limiting, PIN token lifecycle, and account recovery.
//!
//! ## Overview
//!
//! - [`RateLimiter`] - sliding attempt windows with lockout, per
//!   `(operation class, identifier)`; fails open on storage errors
//! - [`TokenLifecycle`] - request/verify of single-use 6-digit PINs for
//!   email verification and password reset
//! - [`AccountService`] - register / authenticate / verify email / reset
//!   password, built on the two above
//! - [`EmailSender`] - the outbound-mail collaborator seam
//!
//! ## Failure semantics
//!
//! Rate-limit denials and token rejections are ordinary outcome values
//! ([`Decision`], [`RequestOutcome`], [`VerifyOutcome`]), never errors.
//! Only unexpected storage faults surface as [`AuthError`] - except inside
//! the rate limiter itself, which logs them and fails open so a storage
//! outage cannot lock every user out.

pub mod account;
pub mod error;
pub mod mailer;
pub mod password;
pub mod ratelimit;
pub mod token;

pub use account::{AccountService, AuthOutcome, RegisterOutcome};
pub use error::{AuthError, Result};
pub use mailer::{EmailSender, NoopMailer, RecordingMailer};
pub use password::{hash_password, verify_password};
pub use ratelimit::{Decision, RateLimiter, RateLimiterConfig, RatePolicy};
pub use token::{generate_pin, RequestOutcome, TokenLifecycle, VerifyOutcome, PIN_TTL_MS};
