//! Custom-order quote lifecycle.
//!
//! [`QuoteService`] orchestrates request submission, quote creation, public
//! token access, checkout, the reconciliation cron and payment verification.
//! It talks to the outside world only through three ports:
//!
//! - [`QuoteStore`] — persistence ([`PgQuoteStore`] in production).
//! - [`Notifier`](footprint_events::Notifier) — best-effort email.
//! - [`PaymentGateway`] — payment initialisation and verification
//!   ([`PaystackClient`] in production).

pub mod error;
pub mod gateway;
pub mod lifecycle;
pub mod pg_store;
pub mod quotes;
pub mod requests;
pub mod service;
pub mod session;
pub mod store;
pub mod verify;

pub use error::{QuoteError, StoreError};
pub use gateway::{
    GatewayError, InitializePayment, PaymentGateway, PaymentSession, PaystackClient,
    VerifiedTransaction,
};
pub use lifecycle::LifecycleReport;
pub use pg_store::PgQuoteStore;
pub use quotes::{CheckoutStarted, NewQuote, QuoteView};
pub use requests::{NewRequest, TrackedRequest};
pub use service::{QuoteService, ServiceConfig};
pub use session::QuoteSession;
pub use store::{QuoteStore, StoreResult};
pub use verify::{VerifyFailure, VerifySuccess};
