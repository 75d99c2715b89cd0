//! Admin quote creation and the customer's token-gated view and checkout.

use footprint_core::custom_order::{
    clean_optional, default_quote_expiry, normalize_currency, payment_callback_url,
    quote_access_url,
};
use footprint_core::hashing::{generate_access_token, hash_access_token};
use footprint_core::money::to_minor_units;
use footprint_core::status::{QuoteStatus, RequestStatus};
use footprint_core::types::{DbId, Timestamp};
use footprint_db::models::custom_order_quote::{CreateCustomOrderQuote, CustomOrderQuote};
use footprint_db::models::custom_order_request::CustomOrderRequest;
use footprint_db::models::quote_token::CreateQuoteToken;
use footprint_events::Notification;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;

use crate::error::QuoteError;
use crate::gateway::InitializePayment;
use crate::requests::parse_timestamp;
use crate::service::QuoteService;
use crate::session::QuoteSession;

/// Admin input for a new quote version.
#[derive(Debug, Clone, Default)]
pub struct NewQuote {
    pub amount: Option<Decimal>,
    pub currency_code: Option<String>,
    pub note: Option<String>,
    pub breakdown: Option<serde_json::Value>,
    pub expires_at: Option<String>,
}

/// What the customer sees when opening a quote link.
#[derive(Debug, Clone, Serialize)]
pub struct QuoteView {
    pub id: DbId,
    pub request_id: DbId,
    pub request_number: String,
    pub version: i32,
    pub amount: Decimal,
    pub currency_code: String,
    pub breakdown: serde_json::Value,
    pub note: Option<String>,
    pub status: String,
    pub expires_at: Option<Timestamp>,
    pub customer_name: String,
    pub email: String,
    pub title: String,
    pub request_status: String,
    pub can_pay: bool,
}

impl QuoteView {
    fn new(quote: CustomOrderQuote, request: CustomOrderRequest) -> Self {
        let can_pay = quote.status != QuoteStatus::Paid.as_str()
            && request.status != RequestStatus::Paid.as_str();
        Self {
            id: quote.id,
            request_id: request.id,
            request_number: request.request_number,
            version: quote.version,
            amount: quote.amount,
            currency_code: quote.currency_code,
            breakdown: quote.breakdown,
            note: quote.note,
            status: quote.status,
            expires_at: quote.expires_at,
            customer_name: request.customer_name,
            email: request.email,
            title: request.title,
            request_status: request.status,
            can_pay,
        }
    }
}

/// A hosted checkout that has been opened with the gateway.
///
/// `session` is not part of the response body; the HTTP layer stores it in
/// the session cookie.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutStarted {
    pub authorization_url: String,
    pub reference: String,
    #[serde(skip)]
    pub session: QuoteSession,
}

fn not_found(what: &str) -> QuoteError {
    QuoteError::NotFound(format!("{what} not found"))
}

fn invalid_token() -> QuoteError {
    QuoteError::Unauthorized("Invalid or expired quote token".to_string())
}

impl QuoteService {
    /// Price a request with a new quote version and send the customer a
    /// fresh access link.
    pub async fn create_quote(
        &self,
        request_id: DbId,
        input: NewQuote,
        admin_email: &str,
        now: Timestamp,
    ) -> Result<CustomOrderQuote, QuoteError> {
        let amount = input
            .amount
            .filter(|a| *a > Decimal::ZERO)
            .ok_or_else(|| QuoteError::Validation("Amount must be greater than zero".to_string()))?;

        let expires_at = match clean_optional(input.expires_at.as_deref()) {
            Some(raw) => parse_timestamp(Some(&raw))
                .ok_or_else(|| QuoteError::Validation("Invalid expiry date".to_string()))?,
            None => default_quote_expiry(now),
        };

        let breakdown = input
            .breakdown
            .filter(serde_json::Value::is_object)
            .unwrap_or_else(|| json!({}));

        let create = CreateCustomOrderQuote {
            amount,
            currency_code: normalize_currency(input.currency_code.as_deref()),
            breakdown,
            note: clean_optional(input.note.as_deref()),
            expires_at,
            created_by: clean_optional(Some(admin_email)),
        };

        let (quote, request) = self
            .store
            .create_quote_version(request_id, &create)
            .await?
            .ok_or_else(|| not_found("Request"))?;

        tracing::info!(
            quote_id = quote.id,
            request_id,
            version = quote.version,
            amount = %quote.amount,
            "Quote created",
        );

        // The version is committed by now, so a token failure is logged and
        // the quote still returned.
        let (token, token_hash) = generate_access_token();
        let issued = self
            .store
            .insert_token(&CreateQuoteToken {
                quote_id: quote.id,
                email: request.email.clone(),
                token_hash,
                expires_at: quote.expires_at.unwrap_or(expires_at),
            })
            .await;
        if let Err(e) = issued {
            tracing::error!(
                quote_id = quote.id,
                request_id,
                error = %e,
                "Quote access token could not be stored; quote email not sent",
            );
            return Ok(quote);
        }

        self.notify_in_background(Notification::QuoteSent {
            to: request.email.clone(),
            customer_name: request.customer_name.clone(),
            request_number: request.request_number.clone(),
            version: quote.version,
            amount: quote.amount,
            currency_code: quote.currency_code.clone(),
            note: quote.note.clone(),
            expires_at: quote.expires_at,
            quote_url: quote_access_url(&self.config.public_base_url, quote.id, &token),
        });

        Ok(quote)
    }

    async fn load_quote(
        &self,
        quote_id: DbId,
    ) -> Result<(CustomOrderQuote, CustomOrderRequest), QuoteError> {
        let quote = self
            .store
            .find_quote(quote_id)
            .await?
            .ok_or_else(|| not_found("Quote"))?;
        let request = self
            .store
            .find_request(quote.request_id)
            .await?
            .ok_or_else(|| not_found("Request"))?;
        Ok((quote, request))
    }

    async fn check_token(
        &self,
        quote_id: DbId,
        token_hash: &str,
        now: Timestamp,
    ) -> Result<(), QuoteError> {
        self.store
            .find_valid_token(quote_id, token_hash, now)
            .await?
            .map(|_| ())
            .ok_or_else(invalid_token)
    }

    /// The customer's view of a quote, gated by its access token.
    pub async fn view_quote(
        &self,
        quote_id: DbId,
        token: Option<&str>,
        now: Timestamp,
    ) -> Result<QuoteView, QuoteError> {
        let token = clean_optional(token)
            .ok_or_else(|| QuoteError::Validation("Missing quote token".to_string()))?;
        let token_hash = hash_access_token(&token);

        let (quote, request) = self.load_quote(quote_id).await?;
        self.check_token(quote.id, &token_hash, now).await?;

        Ok(QuoteView::new(quote, request))
    }

    /// Open a hosted checkout for a quote.
    ///
    /// On success the quote is `accepted` and the request is
    /// `awaiting_payment`; the returned session must be handed to the
    /// customer so the payment callback can be matched to this checkout.
    pub async fn initialize_payment(
        &self,
        quote_id: DbId,
        token: Option<&str>,
        now: Timestamp,
    ) -> Result<CheckoutStarted, QuoteError> {
        let token = clean_optional(token)
            .ok_or_else(|| QuoteError::Validation("Quote token is required".to_string()))?;
        let token_hash = hash_access_token(&token);

        let (quote, request) = self.load_quote(quote_id).await?;

        if quote.status == QuoteStatus::Paid.as_str() || request.is_settled() {
            return Err(QuoteError::Validation(
                "This quote has already been paid".to_string(),
            ));
        }
        let lapsed = quote.status == QuoteStatus::Expired.as_str()
            || quote.status == QuoteStatus::Rejected.as_str()
            || quote.expires_at.is_some_and(|at| at <= now);
        if lapsed {
            return Err(QuoteError::Validation("This quote has expired".to_string()));
        }

        self.check_token(quote.id, &token_hash, now).await?;

        let minor_units = to_minor_units(quote.amount)
            .filter(|m| *m > 0)
            .ok_or_else(|| QuoteError::Validation("Invalid quote amount".to_string()))?;

        let checkout = self
            .gateway
            .initialize(&InitializePayment {
                email: request.email.clone(),
                amount: minor_units,
                currency: quote.currency_code.clone(),
                callback_url: payment_callback_url(&self.config.public_base_url),
                metadata: json!({
                    "custom_quote_id": quote.id,
                    "custom_request_id": request.id,
                    "custom_request_number": request.request_number,
                }),
            })
            .await?;

        self.store
            .set_quote_status(quote.id, QuoteStatus::Accepted)
            .await?;
        self.store
            .set_request_status(request.id, RequestStatus::AwaitingPayment)
            .await?;

        tracing::info!(
            quote_id = quote.id,
            request_id = request.id,
            reference = %checkout.reference,
            "Quote checkout initialised",
        );

        Ok(CheckoutStarted {
            authorization_url: checkout.authorization_url,
            reference: checkout.reference,
            session: QuoteSession {
                quote_id: quote.id,
                request_id: request.id,
                token_hash,
                email: request.email,
                customer_name: request.customer_name,
                phone: request.phone,
                amount: quote.amount,
                currency_code: quote.currency_code,
            },
        })
    }
}
