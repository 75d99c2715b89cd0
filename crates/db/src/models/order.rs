//! Order and order item models.

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use footprint_core::types::{DbId, Timestamp};

/// A row from the `orders` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Order {
    pub id: DbId,
    pub user_id: Option<String>,
    pub order_number: String,
    pub email: String,
    pub phone: Option<String>,
    pub customer_name: Option<String>,
    pub shipping_address: Option<serde_json::Value>,
    pub billing_address: Option<serde_json::Value>,
    pub status: String,
    pub delivery_status: String,
    pub estimated_arrival: Option<Timestamp>,
    pub subtotal_amount: Decimal,
    pub tax_amount: Decimal,
    pub shipping_amount: Decimal,
    pub discount_amount: Decimal,
    pub coupon_code: Option<String>,
    pub total_amount: Decimal,
    pub currency_code: String,
    pub notes: Option<String>,
    pub tracking_number: Option<String>,
    pub acknowledged_at: Option<Timestamp>,
    pub acknowledged_by: Option<String>,
    pub order_type: String,
    pub custom_order_request_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `order_items` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct OrderItem {
    pub id: DbId,
    pub order_id: DbId,
    pub product_ref: Option<String>,
    pub variant_ref: Option<String>,
    pub product_title: String,
    pub variant_title: Option<String>,
    pub quantity: i32,
    pub price: Decimal,
    pub total_amount: Decimal,
    pub currency_code: String,
    pub product_image: Option<String>,
    pub created_at: Timestamp,
}

/// An order with its line items, as returned by the admin detail endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Everything needed to turn a paid quote into an order in one transaction.
#[derive(Debug, Clone)]
pub struct ConvertQuoteToOrder {
    pub request_id: DbId,
    pub quote_id: DbId,
    /// Hash of the access token used at checkout; marked used on success.
    pub token_hash: String,
    pub order_number: String,
    pub user_id: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub customer_name: String,
    pub amount: Decimal,
    pub currency_code: String,
    pub notes: String,
    pub item_title: String,
    pub item_variant_title: String,
    pub item_image: Option<String>,
}

/// Admin patch for an order.
///
/// `estimated_arrival` uses a nested option: `Some(None)` clears the column,
/// `None` leaves it as is.
#[derive(Debug, Clone, Default)]
pub struct UpdateOrder {
    pub status: Option<String>,
    pub delivery_status: Option<String>,
    pub estimated_arrival: Option<Option<Timestamp>>,
    pub tracking_number: Option<String>,
    pub notes: Option<String>,
    /// Acknowledging admin. Only stamped when the order is not yet acknowledged.
    pub acknowledged_by: Option<String>,
}
