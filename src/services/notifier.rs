//! Outgoing email channel. The core workflows never depend on it.

use std::sync::{Arc, Mutex};

use futures::future::{BoxFuture, ready};
use thiserror::Error;
use tracing::info;

/// Email ready to be handed to a delivery channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
}

/// Delivery failure reported by a [`Notifier`].
#[derive(Debug, Error)]
#[error("failed to deliver email to `{to}`: {reason}")]
pub struct NotifyError {
    /// Recipient of the undelivered email.
    pub to: String,
    /// Backend-specific cause.
    pub reason: String,
}

/// Delivery channel for account emails.
pub trait Notifier: Send + Sync {
    fn send(&self, email: OutgoingEmail) -> BoxFuture<'static, Result<(), NotifyError>>;
}

/// Writes emails to the log instead of delivering them.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send(&self, email: OutgoingEmail) -> BoxFuture<'static, Result<(), NotifyError>> {
        info!(
            to = %email.to,
            subject = %email.subject,
            body = %email.body,
            "email not delivered (log notifier)"
        );
        Box::pin(ready(Ok(())))
    }
}

/// Keeps every email in memory so callers can inspect them.
#[derive(Debug, Default, Clone)]
pub struct MemoryNotifier {
    sent: Arc<Mutex<Vec<OutgoingEmail>>>,
}

impl MemoryNotifier {
    /// Notifier with an empty outbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emails sent so far, oldest first.
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

impl Notifier for MemoryNotifier {
    fn send(&self, email: OutgoingEmail) -> BoxFuture<'static, Result<(), NotifyError>> {
        let result = match self.sent.lock() {
            Ok(mut sent) => {
                sent.push(email);
                Ok(())
            }
            Err(_) => Err(NotifyError {
                to: email.to,
                reason: "outbox poisoned".into(),
            }),
        };
        Box::pin(ready(result))
    }
}
