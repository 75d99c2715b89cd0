//! Payment callback: verify a gateway reference and convert the paid quote
//! into an order.
//!
//! Every outcome is a redirect. Failures carry a short reason code
//! ([`VerifyFailure::reason`]); success carries the order number.

use footprint_core::custom_order::{
    converted_item_title, converted_order_notes, generate_order_number, payment_reference_marker,
    CONVERTED_ITEM_VARIANT,
};
use footprint_core::money::to_minor_units;
use footprint_core::types::{DbId, Timestamp};
use footprint_db::models::custom_order_request::CustomOrderRequest;
use footprint_db::models::order::{ConvertQuoteToOrder, Order};
use footprint_events::Notification;
use serde_json::Value;

use crate::service::QuoteService;
use crate::session::QuoteSession;

/// Why a payment callback did not produce an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyFailure {
    FeatureDisabled,
    InvalidReference,
    /// The gateway could not be reached, is not configured, or conversion failed.
    VerificationFailed,
    PaymentFailed,
    InvalidMetadata,
    SessionExpired,
    MetadataMismatch,
    QuoteNotFound,
    AmountMismatch,
}

impl VerifyFailure {
    /// Code placed in the `error` query parameter of the redirect.
    pub fn reason(self) -> &'static str {
        match self {
            VerifyFailure::FeatureDisabled => "feature_disabled",
            VerifyFailure::InvalidReference => "invalid_reference",
            VerifyFailure::VerificationFailed => "payment_verification_failed",
            VerifyFailure::PaymentFailed => "payment_failed",
            VerifyFailure::InvalidMetadata => "invalid_metadata",
            VerifyFailure::SessionExpired => "session_expired",
            VerifyFailure::MetadataMismatch => "metadata_mismatch",
            VerifyFailure::QuoteNotFound => "quote_not_found",
            VerifyFailure::AmountMismatch => "payment_amount_mismatch",
        }
    }
}

impl std::fmt::Display for VerifyFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.reason())
    }
}

/// A reference that maps to an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifySuccess {
    pub order_number: String,
    /// Whether the checkout session cookie should be removed.
    pub clear_session: bool,
}

/// Read a numeric id from gateway metadata. Paystack echoes numbers back as
/// numbers or strings depending on the client that set them.
fn metadata_id(metadata: &Value, key: &str) -> Option<DbId> {
    let id = match metadata.get(key)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    id.filter(|id| *id > 0)
}

/// Metadata sometimes arrives as a JSON-encoded string.
fn metadata_object(metadata: Value) -> Value {
    match metadata {
        Value::String(raw) => serde_json::from_str(&raw).unwrap_or(Value::Null),
        other => other,
    }
}

impl QuoteService {
    /// Verify `reference` and convert the quote it paid for.
    ///
    /// Replaying a reference that already produced an order returns that
    /// order without touching anything.
    pub async fn verify_payment(
        &self,
        reference: Option<&str>,
        session_cookie: Option<&str>,
        now: Timestamp,
    ) -> Result<VerifySuccess, VerifyFailure> {
        if !self.config.feature_enabled {
            return Err(VerifyFailure::FeatureDisabled);
        }

        let reference = reference
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .ok_or(VerifyFailure::InvalidReference)?;

        let transaction = self.gateway.verify(reference).await.map_err(|e| {
            tracing::error!(reference, error = %e, "Payment verification request failed");
            VerifyFailure::VerificationFailed
        })?;
        if !transaction.is_success() {
            tracing::warn!(reference, status = %transaction.status, "Payment not successful");
            return Err(VerifyFailure::PaymentFailed);
        }

        let marker = payment_reference_marker(reference);
        let existing = self
            .store
            .find_order_number_by_marker(&marker)
            .await
            .map_err(|e| {
                tracing::error!(reference, error = %e, "Order lookup by reference failed");
                VerifyFailure::VerificationFailed
            })?;
        if let Some(order_number) = existing {
            tracing::info!(reference, %order_number, "Payment reference already converted");
            return Ok(VerifySuccess {
                order_number,
                clear_session: false,
            });
        }

        let metadata = metadata_object(transaction.metadata);
        let (Some(quote_id), Some(request_id)) = (
            metadata_id(&metadata, "custom_quote_id"),
            metadata_id(&metadata, "custom_request_id"),
        ) else {
            return Err(VerifyFailure::InvalidMetadata);
        };

        let session = session_cookie
            .and_then(QuoteSession::decode)
            .ok_or(VerifyFailure::SessionExpired)?;
        if session.quote_id != quote_id || session.request_id != request_id {
            tracing::warn!(reference, quote_id, request_id, "Checkout session does not match payment");
            return Err(VerifyFailure::MetadataMismatch);
        }

        let quote = self.store.find_quote(quote_id).await.map_err(|e| {
            tracing::error!(quote_id, error = %e, "Quote lookup failed");
            VerifyFailure::VerificationFailed
        })?;
        let request = self.store.find_request(request_id).await.map_err(|e| {
            tracing::error!(request_id, error = %e, "Request lookup failed");
            VerifyFailure::VerificationFailed
        })?;
        let (Some(quote), Some(request)) = (quote, request) else {
            return Err(VerifyFailure::QuoteNotFound);
        };
        if quote.request_id != request.id {
            return Err(VerifyFailure::MetadataMismatch);
        }

        if let Some(order_id) = request.converted_order_id {
            return Ok(VerifySuccess {
                order_number: self.order_number(order_id).await,
                clear_session: true,
            });
        }

        let expected = to_minor_units(quote.amount);
        if expected.is_none() || expected != transaction.amount {
            tracing::warn!(
                reference,
                expected = ?expected,
                paid = ?transaction.amount,
                "Paid amount does not match quote",
            );
            return Err(VerifyFailure::AmountMismatch);
        }

        let convert = ConvertQuoteToOrder {
            request_id: request.id,
            quote_id: quote.id,
            token_hash: session.token_hash.clone(),
            order_number: generate_order_number(now),
            user_id: request.user_id.clone(),
            email: request.email.clone(),
            phone: request.phone.clone(),
            customer_name: request.customer_name.clone(),
            amount: quote.amount,
            currency_code: quote.currency_code.clone(),
            notes: converted_order_notes(&request.request_number, reference),
            item_title: converted_item_title(&request.request_number),
            item_variant_title: CONVERTED_ITEM_VARIANT.to_string(),
            item_image: request.first_reference_image(),
        };

        let order = match self.store.convert_to_order(&convert).await {
            Ok(order) => order,
            Err(e) => {
                tracing::error!(request_id, quote_id, error = %e, "Quote conversion failed");
                return self.recover_converted(request_id).await;
            }
        };

        tracing::info!(
            order_id = order.id,
            order_number = %order.order_number,
            request_id,
            quote_id,
            reference,
            "Custom quote converted to order",
        );

        self.announce_order(&order, &request, &convert.item_title).await;

        Ok(VerifySuccess {
            order_number: order.order_number,
            clear_session: true,
        })
    }

    async fn order_number(&self, order_id: DbId) -> String {
        match self.store.find_order(order_id).await {
            Ok(Some(order)) => order.order_number,
            Ok(None) => String::new(),
            Err(e) => {
                tracing::error!(order_id, error = %e, "Converted order lookup failed");
                String::new()
            }
        }
    }

    /// A concurrent callback may have converted the request while this one
    /// was failing; point the customer at that order if so.
    async fn recover_converted(&self, request_id: DbId) -> Result<VerifySuccess, VerifyFailure> {
        let converted = self
            .store
            .find_request(request_id)
            .await
            .ok()
            .flatten()
            .and_then(|r| r.converted_order_id);
        match converted {
            Some(order_id) => Ok(VerifySuccess {
                order_number: self.order_number(order_id).await,
                clear_session: true,
            }),
            None => Err(VerifyFailure::VerificationFailed),
        }
    }

    async fn announce_order(&self, order: &Order, request: &CustomOrderRequest, item_title: &str) {
        self.notify(Notification::OrderConfirmation {
            to: order.email.clone(),
            customer_name: request.customer_name.clone(),
            order_number: order.order_number.clone(),
            item_title: item_title.to_string(),
            total_amount: order.total_amount,
            currency_code: order.currency_code.clone(),
        })
        .await;

        self.notify(Notification::AdminNewOrder {
            to: self.config.admin_emails.clone(),
            order_id: order.id,
            order_number: order.order_number.clone(),
            customer_name: request.customer_name.clone(),
            email: order.email.clone(),
            phone: order.phone.clone(),
            total_amount: order.total_amount,
            currency_code: order.currency_code.clone(),
        })
        .await;
    }
}
