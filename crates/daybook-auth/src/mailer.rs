//! Outbound email abstraction.
//!
//! The token lifecycle only needs "deliver this PIN somewhere"; the trait
//! keeps SMTP details out of this crate. Delivery failures are logged and
//! swallowed by callers so that email outcomes never leak whether an
//! account exists.

use async_trait::async_trait;
use std::sync::Mutex;

/// Sends one plain-text email.
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()>;
}

/// Mailer that discards everything. Default for offline use.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMailer;

#[async_trait]
impl EmailSender for NoopMailer {
    async fn send(&self, _to: &str, _subject: &str, _body: &str) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Mailer that captures every message for test assertions.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<(String, String, String)>>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// All `(to, subject, body)` triples sent so far.
    pub fn sent(&self) -> Vec<(String, String, String)> {
        self.sent.lock().map(|v| v.clone()).unwrap_or_default()
    }

    /// Number of messages sent.
    pub fn count(&self) -> usize {
        self.sent.lock().map(|v| v.len()).unwrap_or(0)
    }

    /// The body of the most recent message, if any.
    pub fn last_body(&self) -> Option<String> {
        self.sent
            .lock()
            .ok()
            .and_then(|v| v.last().map(|(_, _, body)| body.clone()))
    }
}

#[async_trait]
impl EmailSender for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push((to.to_string(), subject.to_string(), body.to_string()));
        }
        Ok(())
    }
}
