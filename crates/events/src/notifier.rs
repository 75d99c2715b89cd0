//! Notification delivery port.
//!
//! Delivery is best-effort everywhere it is used: a failed email is logged and
//! never fails the state change it reports on. [`notify_best_effort`] is the
//! single place that policy is applied.

use async_trait::async_trait;

use crate::delivery::email::{EmailDelivery, EmailError};
use crate::notification::Notification;
use crate::templates::render;

/// Error returned by a [`Notifier`].
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error(transparent)]
    Email(#[from] EmailError),

    #[error("Notification delivery failed: {0}")]
    Other(String),
}

/// Sends notifications to their recipients.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Delivers notifications as SMTP email.
pub struct EmailNotifier {
    delivery: EmailDelivery,
}

impl EmailNotifier {
    pub fn new(delivery: EmailDelivery) -> Self {
        Self { delivery }
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let rendered = render(notification);
        self.delivery
            .send(&notification.recipients(), &rendered.subject, &rendered.body)
            .await?;
        Ok(())
    }
}

/// Used when SMTP is not configured: logs each notification and succeeds.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let rendered = render(notification);
        tracing::info!(
            kind = notification.kind(),
            recipients = ?notification.recipients(),
            subject = %rendered.subject,
            "Email delivery not configured, notification logged only",
        );
        Ok(())
    }
}

/// Send a notification, logging and swallowing any failure.
///
/// Returns whether delivery succeeded so callers that track delivery (the
/// reminder pass) can act on it.
pub async fn notify_best_effort(notifier: &dyn Notifier, notification: &Notification) -> bool {
    if notification.recipients().is_empty() {
        tracing::debug!(kind = notification.kind(), "No recipients, notification skipped");
        return false;
    }
    match notifier.send(notification).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(kind = notification.kind(), error = %e, "Failed to send notification");
            false
        }
    }
}
