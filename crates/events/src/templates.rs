//! Plain-text email templates.

use footprint_core::money::format_amount;
use footprint_core::types::Timestamp;

use crate::notification::Notification;

/// Subject prefix for every message.
const BRAND: &str = "D'Footprint";

/// A rendered email ready for delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedEmail {
    pub subject: String,
    pub body: String,
}

fn format_date(value: Option<Timestamp>) -> String {
    value
        .map(|t| t.format("%A, %-d %B %Y").to_string())
        .unwrap_or_else(|| "not set".to_string())
}

fn greeting(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        "Hello,".to_string()
    } else {
        format!("Hello {trimmed},")
    }
}

/// Render a notification into subject and body.
pub fn render(notification: &Notification) -> RenderedEmail {
    match notification {
        Notification::RequestReceived {
            customer_name,
            request_number,
            title,
            track_url,
            ..
        } => RenderedEmail {
            subject: format!("[{BRAND}] We received your custom order request {request_number}"),
            body: format!(
                "{}\n\nThank you for your custom order request \"{title}\".\n\
                 Your request number is {request_number}. Our team will review it and send you a quote.\n\n\
                 Track your request: {track_url}\n",
                greeting(customer_name)
            ),
        },

        Notification::AdminNewRequest {
            request_number,
            customer_name,
            email,
            title,
            admin_url,
            ..
        } => RenderedEmail {
            subject: format!("[{BRAND}] New custom order request {request_number}"),
            body: format!(
                "A new custom order request was submitted.\n\n\
                 Request: {request_number}\nCustomer: {customer_name} <{email}>\nTitle: {title}\n\n\
                 Review it: {admin_url}\n"
            ),
        },

        Notification::QuoteSent {
            customer_name,
            request_number,
            version,
            amount,
            currency_code,
            note,
            expires_at,
            quote_url,
            ..
        } => {
            let note = note
                .as_deref()
                .map(|n| format!("\nNote from our team: {n}\n"))
                .unwrap_or_default();
            RenderedEmail {
                subject: format!("[{BRAND}] Your quote for {request_number} is ready"),
                body: format!(
                    "{}\n\nYour quote (version {version}) for request {request_number} is {}.\n{note}\n\
                     This quote is valid until {}.\n\nView and pay: {quote_url}\n",
                    greeting(customer_name),
                    format_amount(*amount, currency_code),
                    format_date(*expires_at)
                ),
            }
        }

        Notification::QuoteReminder {
            customer_name,
            request_number,
            amount,
            currency_code,
            expires_at,
            quote_url,
            reminder_number,
            total_reminders,
            ..
        } => RenderedEmail {
            subject: format!(
                "[{BRAND}] Reminder {reminder_number} of {total_reminders}: your quote for {request_number} expires soon"
            ),
            body: format!(
                "{}\n\nYour quote of {} for request {request_number} expires on {}.\n\
                 Complete payment before then to start production.\n\nView and pay: {quote_url}\n",
                greeting(customer_name),
                format_amount(*amount, currency_code),
                format_date(*expires_at)
            ),
        },

        Notification::QuoteExpired {
            customer_name,
            request_number,
            title,
            track_url,
            ..
        } => RenderedEmail {
            subject: format!("[{BRAND}] Your quote for {request_number} has expired"),
            body: format!(
                "{}\n\nThe quote for \"{title}\" ({request_number}) expired before payment, \
                 so the request has been cancelled.\nYou are welcome to submit a new request at any time.\n\n\
                 Request details: {track_url}\n",
                greeting(customer_name)
            ),
        },

        Notification::OrderConfirmation {
            customer_name,
            order_number,
            item_title,
            total_amount,
            currency_code,
            ..
        } => RenderedEmail {
            subject: format!("[{BRAND}] Order confirmed: {order_number}"),
            body: format!(
                "{}\n\nThank you! Your payment was received and order {order_number} is confirmed.\n\n\
                 {item_title} x 1\nTotal: {}\n\nWe will let you know as your order moves through production.\n",
                greeting(customer_name),
                format_amount(*total_amount, currency_code)
            ),
        },

        Notification::AdminNewOrder {
            order_id,
            order_number,
            customer_name,
            email,
            phone,
            total_amount,
            currency_code,
            ..
        } => RenderedEmail {
            subject: format!("[{BRAND}] New order {order_number}"),
            body: format!(
                "A new order was paid.\n\nOrder: {order_number} (#{order_id})\nCustomer: {customer_name} <{email}>\n\
                 Phone: {}\nTotal: {}\n",
                phone.as_deref().unwrap_or("-"),
                format_amount(*total_amount, currency_code)
            ),
        },

        Notification::OrderShipped {
            customer_name,
            order_number,
            tracking_number,
            estimated_arrival,
            ..
        } => RenderedEmail {
            subject: format!("[{BRAND}] Order {order_number} is on its way"),
            body: format!(
                "{}\n\nYour order {order_number} is out for delivery.\nTracking number: {}\n\
                 Estimated arrival: {}\n",
                greeting(customer_name),
                tracking_number.as_deref().unwrap_or("not available"),
                format_date(*estimated_arrival)
            ),
        },

        Notification::OrderStatusUpdate {
            customer_name,
            order_number,
            status,
            delivery_status,
            delivery_description,
            estimated_arrival,
            ..
        } => RenderedEmail {
            subject: format!("[{BRAND}] Update on order {order_number}"),
            body: format!(
                "{}\n\n{delivery_description}.\n\nOrder status: {status}\nDelivery stage: {delivery_status}\n\
                 Estimated arrival: {}\n",
                greeting(customer_name),
                format_date(*estimated_arrival)
            ),
        },
    }
}
