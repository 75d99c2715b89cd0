//! The quote lifecycle service and its configuration.
//!
//! Operations are split across modules by stage:
//! [`requests`](crate::requests), [`quotes`](crate::quotes),
//! [`lifecycle`](crate::lifecycle) and [`verify`](crate::verify).

use std::sync::Arc;

use footprint_events::{notify_best_effort, Notification, Notifier};

use crate::gateway::PaymentGateway;
use crate::store::QuoteStore;

/// Settings shared by every operation.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Public storefront origin used for links and the payment callback.
    pub public_base_url: String,
    /// Recipients of admin alerts. Empty disables them.
    pub admin_emails: Vec<String>,
    /// Custom orders master switch.
    pub feature_enabled: bool,
}

#[derive(Clone)]
pub struct QuoteService {
    pub(crate) store: Arc<dyn QuoteStore>,
    pub(crate) notifier: Arc<dyn Notifier>,
    pub(crate) gateway: Arc<dyn PaymentGateway>,
    pub(crate) config: ServiceConfig,
}

impl QuoteService {
    pub fn new(
        store: Arc<dyn QuoteStore>,
        notifier: Arc<dyn Notifier>,
        gateway: Arc<dyn PaymentGateway>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            store,
            notifier,
            gateway,
            config,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn QuoteStore> {
        &self.store
    }

    /// Await delivery, logging failures.
    pub(crate) async fn notify(&self, notification: Notification) -> bool {
        notify_best_effort(self.notifier.as_ref(), &notification).await
    }

    /// Deliver in the background; the caller does not wait.
    pub(crate) fn notify_in_background(&self, notification: Notification) {
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            notify_best_effort(notifier.as_ref(), &notification).await;
        });
    }
}
