//! Custom-order request rules: identifiers, input normalisation and the
//! customer-facing links embedded in emails.

use std::sync::LazyLock;

use chrono::Duration;
use rand::Rng;
use regex::Regex;

use crate::types::{DbId, Timestamp};

/// Currency used when a quote or request does not specify one.
pub const DEFAULT_CURRENCY: &str = "NGN";

/// How long a quote stays valid when the admin gives no expiry.
pub const DEFAULT_QUOTE_VALIDITY_DAYS: i64 = 7;

/// Maximum number of reference images kept on a request.
pub const MAX_REFERENCE_IMAGES: usize = 8;

/// Name of the cookie carrying the quote checkout session.
pub const QUOTE_SESSION_COOKIE: &str = "custom-quote-session";

/// Lifetime of the quote checkout session cookie (30 minutes).
pub const QUOTE_SESSION_MAX_AGE_SECS: i64 = 60 * 30;

/// Prefix written into order notes ahead of the gateway reference.
const PAYMENT_REFERENCE_LABEL: &str = "Paystack Ref:";

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

const BASE36: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Trim and lowercase an email address.
pub fn normalize_email(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Loose structural email check (`local@domain.tld`, no whitespace).
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

/// Trim an optional text field, mapping blank input to `None`.
pub fn clean_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Normalise a currency code: trimmed, uppercased, `NGN` when blank.
pub fn normalize_currency(value: Option<&str>) -> String {
    clean_optional(value)
        .map(|c| c.to_uppercase())
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string())
}

/// Keep at most [`MAX_REFERENCE_IMAGES`] non-blank, trimmed image URLs.
pub fn sanitize_reference_images(images: &[String]) -> Vec<String> {
    images
        .iter()
        .map(|url| url.trim())
        .filter(|url| !url.is_empty())
        .take(MAX_REFERENCE_IMAGES)
        .map(str::to_string)
        .collect()
}

/// Default quote expiry relative to `now`.
pub fn default_quote_expiry(now: Timestamp) -> Timestamp {
    now + Duration::days(DEFAULT_QUOTE_VALIDITY_DAYS)
}

fn random_base36(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| char::from(BASE36[rng.random_range(0..BASE36.len())]))
        .collect()
}

/// Human-readable request number, e.g. `COR-1718000000000-K3J9Q`.
pub fn generate_request_number(now: Timestamp) -> String {
    format!("COR-{}-{}", now.timestamp_millis(), random_base36(5))
}

/// Human-readable order number, e.g. `ORD-1718000000000-ZX81KQ2`.
pub fn generate_order_number(now: Timestamp) -> String {
    format!("ORD-{}-{}", now.timestamp_millis(), random_base36(7))
}

/// Marker searched for in order notes to detect an already-processed payment.
pub fn payment_reference_marker(reference: &str) -> String {
    format!("{PAYMENT_REFERENCE_LABEL} {reference}")
}

/// Notes written on an order converted from a custom request.
pub fn converted_order_notes(request_number: &str, reference: &str) -> String {
    format!(
        "Custom order {request_number} | {}",
        payment_reference_marker(reference)
    )
}

/// Title of the synthetic order item representing a whole custom order.
pub fn converted_item_title(request_number: &str) -> String {
    format!("Custom Order - {request_number}")
}

/// Variant title of the synthetic order item.
pub const CONVERTED_ITEM_VARIANT: &str = "Quoted Request";

/// Percent-encode a query-string component (RFC 3986 unreserved set kept).
pub fn encode_query_component(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(char::from(byte));
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// Link that lets a customer view and pay a quote.
pub fn quote_access_url(base_url: &str, quote_id: DbId, token: &str) -> String {
    format!(
        "{}/custom-orders/request?quoteId={quote_id}&token={}",
        base_url.trim_end_matches('/'),
        encode_query_component(token)
    )
}

/// Link that lets a customer track a request by number and email.
pub fn request_track_url(base_url: &str, request_number: &str, email: &str) -> String {
    format!(
        "{}/orders?customRequest={}&email={}",
        base_url.trim_end_matches('/'),
        encode_query_component(request_number),
        encode_query_component(email)
    )
}

/// Callback the payment gateway redirects to after checkout.
pub fn payment_callback_url(base_url: &str) -> String {
    format!(
        "{}/api/v1/custom-order-quotes/verify",
        base_url.trim_end_matches('/')
    )
}

/// Admin screen listing custom-order requests.
pub fn admin_requests_url(base_url: &str) -> String {
    format!("{}/admin/custom-order-requests", base_url.trim_end_matches('/'))
}
