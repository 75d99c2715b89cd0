//! Every email the back office can send, as plain data.
//!
//! Callers build a [`Notification`] with the facts the message needs and hand
//! it to a [`Notifier`](crate::Notifier). Rendering lives in
//! [`templates`](crate::templates).

use footprint_core::types::{DbId, Timestamp};
use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// Customer acknowledgement after submitting a custom-order request.
    RequestReceived {
        to: String,
        customer_name: String,
        request_number: String,
        title: String,
        track_url: String,
    },
    /// Admin alert for a new custom-order request.
    AdminNewRequest {
        to: Vec<String>,
        request_number: String,
        customer_name: String,
        email: String,
        title: String,
        admin_url: String,
    },
    /// A new quote version with its access link.
    QuoteSent {
        to: String,
        customer_name: String,
        request_number: String,
        version: i32,
        amount: Decimal,
        currency_code: String,
        note: Option<String>,
        expires_at: Option<Timestamp>,
        quote_url: String,
    },
    /// Reminder `reminder_number` of `total_reminders` before a quote lapses.
    QuoteReminder {
        to: String,
        customer_name: String,
        request_number: String,
        amount: Decimal,
        currency_code: String,
        expires_at: Option<Timestamp>,
        quote_url: String,
        reminder_number: usize,
        total_reminders: usize,
    },
    /// The quote lapsed and the request was cancelled.
    QuoteExpired {
        to: String,
        customer_name: String,
        request_number: String,
        title: String,
        track_url: String,
    },
    /// Customer receipt for a paid order.
    OrderConfirmation {
        to: String,
        customer_name: String,
        order_number: String,
        item_title: String,
        total_amount: Decimal,
        currency_code: String,
    },
    /// Admin alert for a new paid order.
    AdminNewOrder {
        to: Vec<String>,
        order_id: DbId,
        order_number: String,
        customer_name: String,
        email: String,
        phone: Option<String>,
        total_amount: Decimal,
        currency_code: String,
    },
    /// The order left for delivery.
    OrderShipped {
        to: String,
        customer_name: String,
        order_number: String,
        tracking_number: Option<String>,
        estimated_arrival: Option<Timestamp>,
    },
    /// Generic order status or delivery stage change.
    OrderStatusUpdate {
        to: String,
        customer_name: String,
        order_number: String,
        status: String,
        delivery_status: String,
        delivery_description: String,
        estimated_arrival: Option<Timestamp>,
    },
}

impl Notification {
    /// Short stable name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Notification::RequestReceived { .. } => "request_received",
            Notification::AdminNewRequest { .. } => "admin_new_request",
            Notification::QuoteSent { .. } => "quote_sent",
            Notification::QuoteReminder { .. } => "quote_reminder",
            Notification::QuoteExpired { .. } => "quote_expired",
            Notification::OrderConfirmation { .. } => "order_confirmation",
            Notification::AdminNewOrder { .. } => "admin_new_order",
            Notification::OrderShipped { .. } => "order_shipped",
            Notification::OrderStatusUpdate { .. } => "order_status_update",
        }
    }

    /// Every address the message goes to.
    pub fn recipients(&self) -> Vec<String> {
        match self {
            Notification::AdminNewRequest { to, .. } | Notification::AdminNewOrder { to, .. } => {
                to.clone()
            }
            Notification::RequestReceived { to, .. }
            | Notification::QuoteSent { to, .. }
            | Notification::QuoteReminder { to, .. }
            | Notification::QuoteExpired { to, .. }
            | Notification::OrderConfirmation { to, .. }
            | Notification::OrderShipped { to, .. }
            | Notification::OrderStatusUpdate { to, .. } => vec![to.clone()],
        }
    }
}
