//! Customer request submission and tracking.

use chrono::{DateTime, NaiveDate, Utc};
use footprint_core::custom_order::{
    admin_requests_url, clean_optional, generate_request_number, is_valid_email,
    normalize_email, request_track_url, sanitize_reference_images,
};
use footprint_core::types::Timestamp;
use footprint_db::models::custom_order_quote::CustomOrderQuote;
use footprint_db::models::custom_order_request::{CreateCustomOrderRequest, CustomOrderRequest};
use footprint_events::Notification;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::QuoteError;
use crate::service::QuoteService;

/// Raw customer input for a new request. Every field is optional here;
/// [`QuoteService::submit_request`] enforces what is required.
#[derive(Debug, Clone, Default)]
pub struct NewRequest {
    pub customer_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub size_notes: Option<String>,
    pub color_preferences: Option<String>,
    pub budget_min: Option<Decimal>,
    pub budget_max: Option<Decimal>,
    pub desired_date: Option<String>,
    pub reference_images: Vec<String>,
    pub customer_notes: Option<String>,
}

/// A request as seen by the customer tracking page.
#[derive(Debug, Clone, Serialize)]
pub struct TrackedRequest {
    #[serde(flatten)]
    pub request: CustomOrderRequest,
    pub latest_quote: Option<CustomOrderQuote>,
}

/// Accept an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
pub(crate) fn parse_timestamp(value: Option<&str>) -> Option<Timestamp> {
    let value = value.map(str::trim).filter(|v| !v.is_empty())?;
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn non_negative(value: Option<Decimal>) -> Option<Decimal> {
    value.map(|v| v.max(Decimal::ZERO))
}

impl QuoteService {
    /// Validate and store a new custom-order request, then acknowledge it to
    /// the customer and alert the admins.
    pub async fn submit_request(
        &self,
        input: NewRequest,
        now: Timestamp,
    ) -> Result<CustomOrderRequest, QuoteError> {
        let customer_name = clean_optional(input.customer_name.as_deref());
        let title = clean_optional(input.title.as_deref());
        let description = clean_optional(input.description.as_deref());
        let (Some(customer_name), Some(title), Some(description)) =
            (customer_name, title, description)
        else {
            return Err(QuoteError::Validation(
                "Name, title, and description are required".to_string(),
            ));
        };

        let email = normalize_email(input.email.as_deref().unwrap_or_default());
        if !is_valid_email(&email) {
            return Err(QuoteError::Validation("A valid email is required".to_string()));
        }

        let create = CreateCustomOrderRequest {
            request_number: generate_request_number(now),
            user_id: None,
            email,
            phone: clean_optional(input.phone.as_deref()),
            customer_name,
            title,
            description,
            size_notes: clean_optional(input.size_notes.as_deref()),
            color_preferences: clean_optional(input.color_preferences.as_deref()),
            budget_min: non_negative(input.budget_min),
            budget_max: non_negative(input.budget_max),
            desired_date: parse_timestamp(input.desired_date.as_deref()),
            reference_images: sanitize_reference_images(&input.reference_images),
            customer_notes: clean_optional(input.customer_notes.as_deref()),
        };

        let request = self.store.create_request(&create).await?;
        tracing::info!(
            request_id = request.id,
            request_number = %request.request_number,
            "Custom order request submitted",
        );

        let base = &self.config.public_base_url;
        self.notify(Notification::RequestReceived {
            to: request.email.clone(),
            customer_name: request.customer_name.clone(),
            request_number: request.request_number.clone(),
            title: request.title.clone(),
            track_url: request_track_url(base, &request.request_number, &request.email),
        })
        .await;

        self.notify(Notification::AdminNewRequest {
            to: self.config.admin_emails.clone(),
            request_number: request.request_number.clone(),
            customer_name: request.customer_name.clone(),
            email: request.email.clone(),
            title: request.title.clone(),
            admin_url: admin_requests_url(base),
        })
        .await;

        Ok(request)
    }

    /// Look up a request by number and email together with its latest quote.
    pub async fn track_request(
        &self,
        request_number: Option<&str>,
        email: Option<&str>,
    ) -> Result<TrackedRequest, QuoteError> {
        let request_number = clean_optional(request_number);
        let email = clean_optional(email).map(|e| normalize_email(&e));
        let (Some(request_number), Some(email)) = (request_number, email) else {
            return Err(QuoteError::Validation(
                "Request number and email are required".to_string(),
            ));
        };

        let request = self
            .store
            .find_request_for_tracking(&request_number, &email)
            .await?
            .ok_or_else(|| QuoteError::NotFound("Request not found".to_string()))?;
        let latest_quote = self.store.latest_quote(request.id).await?;

        Ok(TrackedRequest {
            request,
            latest_quote,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn timestamps_accept_rfc3339_and_plain_dates() {
        assert_eq!(
            parse_timestamp(Some("2026-07-01T10:00:00+01:00")),
            Some(Utc.with_ymd_and_hms(2026, 7, 1, 9, 0, 0).unwrap())
        );
        assert_eq!(
            parse_timestamp(Some("2026-07-01")),
            Some(Utc.with_ymd_and_hms(2026, 7, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp(Some("next tuesday")), None);
        assert_eq!(parse_timestamp(Some("")), None);
        assert_eq!(parse_timestamp(None), None);
    }

    #[test]
    fn negative_budgets_clamp_to_zero() {
        assert_eq!(non_negative(Some(Decimal::from(-5))), Some(Decimal::ZERO));
        assert_eq!(non_negative(Some(Decimal::from(10))), Some(Decimal::from(10)));
        assert_eq!(non_negative(None), None);
    }
}
