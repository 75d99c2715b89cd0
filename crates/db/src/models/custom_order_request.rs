//! Custom-order request model and DTOs.

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use footprint_core::types::{DbId, Timestamp};

/// A row from the `custom_order_requests` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct CustomOrderRequest {
    pub id: DbId,
    pub request_number: String,
    pub user_id: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub customer_name: String,
    pub title: String,
    pub description: String,
    pub size_notes: Option<String>,
    pub color_preferences: Option<String>,
    pub budget_min: Option<Decimal>,
    pub budget_max: Option<Decimal>,
    pub desired_date: Option<Timestamp>,
    /// JSON array of image URLs.
    pub reference_images: serde_json::Value,
    pub status: String,
    pub admin_notes: Option<String>,
    pub customer_notes: Option<String>,
    pub quoted_amount: Option<Decimal>,
    pub currency_code: String,
    pub quote_expires_at: Option<Timestamp>,
    pub paid_at: Option<Timestamp>,
    pub converted_order_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CustomOrderRequest {
    /// Paid or already turned into an order; the lifecycle cron leaves these alone.
    pub fn is_settled(&self) -> bool {
        self.status == "paid" || self.converted_order_id.is_some()
    }

    /// First reference image, used as the order item thumbnail.
    pub fn first_reference_image(&self) -> Option<String> {
        self.reference_images
            .as_array()
            .and_then(|images| images.first())
            .and_then(|v| v.as_str())
            .map(str::to_string)
    }
}

/// Insert DTO. Fields are expected to be validated and normalised already.
#[derive(Debug, Clone)]
pub struct CreateCustomOrderRequest {
    pub request_number: String,
    pub user_id: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub customer_name: String,
    pub title: String,
    pub description: String,
    pub size_notes: Option<String>,
    pub color_preferences: Option<String>,
    pub budget_min: Option<Decimal>,
    pub budget_max: Option<Decimal>,
    pub desired_date: Option<Timestamp>,
    pub reference_images: Vec<String>,
    pub customer_notes: Option<String>,
}

/// Admin patch. Only `Some` fields are applied.
#[derive(Debug, Clone, Default)]
pub struct UpdateCustomOrderRequest {
    pub status: Option<String>,
    pub admin_notes: Option<String>,
    pub customer_notes: Option<String>,
    pub quote_expires_at: Option<Timestamp>,
    pub quoted_amount: Option<Decimal>,
}

/// Filters for the admin request list.
#[derive(Debug, Clone, Default)]
pub struct CustomOrderRequestFilter {
    /// Exact status match. `None` lists every status.
    pub status: Option<String>,
    /// Case-insensitive substring across number, name, email and title.
    pub search: Option<String>,
}
