//! Customer and admin notifications for the D'Footprint back office.
//!
//! - [`Notification`] — every email the storefront sends, as data.
//! - [`templates`] — renders a notification into subject and plain-text body.
//! - [`Notifier`] — the delivery port used by the quote services and handlers.
//! - [`delivery`] — the SMTP channel behind [`EmailNotifier`].

pub mod delivery;
pub mod notification;
pub mod notifier;
pub mod templates;

pub use delivery::email::{EmailConfig, EmailDelivery, EmailError};
pub use notification::Notification;
pub use notifier::{notify_best_effort, EmailNotifier, LogNotifier, Notifier, NotifyError};
