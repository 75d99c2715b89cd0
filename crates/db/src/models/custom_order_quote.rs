//! Quote model and DTOs.

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use footprint_core::types::{DbId, Timestamp};

/// A row from the `custom_order_quotes` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct CustomOrderQuote {
    pub id: DbId,
    pub request_id: DbId,
    pub version: i32,
    pub amount: Decimal,
    pub currency_code: String,
    pub breakdown: serde_json::Value,
    pub note: Option<String>,
    pub status: String,
    pub expires_at: Option<Timestamp>,
    pub reminder_count: i32,
    pub last_reminder_at: Option<Timestamp>,
    pub expired_notification_sent_at: Option<Timestamp>,
    pub created_by: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Insert DTO for a new quote version. The version number is assigned by the
/// repository inside the creating transaction.
#[derive(Debug, Clone)]
pub struct CreateCustomOrderQuote {
    pub amount: Decimal,
    pub currency_code: String,
    pub breakdown: serde_json::Value,
    pub note: Option<String>,
    pub expires_at: Timestamp,
    pub created_by: Option<String>,
}

/// Admin patch. Only `Some` fields are applied.
#[derive(Debug, Clone, Default)]
pub struct UpdateCustomOrderQuote {
    pub status: Option<String>,
    pub note: Option<String>,
    pub expires_at: Option<Timestamp>,
}

/// An open quote joined with the request fields the lifecycle cron needs.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct OpenQuote {
    pub quote_id: DbId,
    pub request_id: DbId,
    pub version: i32,
    pub amount: Decimal,
    pub currency_code: String,
    pub expires_at: Option<Timestamp>,
    pub reminder_count: i32,
    pub expired_notification_sent_at: Option<Timestamp>,
    pub request_number: String,
    pub email: String,
    pub customer_name: String,
    pub title: String,
    pub request_status: String,
    pub converted_order_id: Option<DbId>,
    /// A higher-version open quote exists for the same request.
    pub superseded: bool,
}
