//! Quote access token model.

use sqlx::FromRow;
use footprint_core::types::{DbId, Timestamp};

/// A row from `custom_order_quote_tokens`. Only the SHA-256 hash is stored.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct CustomOrderQuoteToken {
    pub id: DbId,
    pub quote_id: DbId,
    pub email: String,
    pub token_hash: String,
    pub expires_at: Timestamp,
    pub used_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// Insert DTO.
#[derive(Debug, Clone)]
pub struct CreateQuoteToken {
    pub quote_id: DbId,
    pub email: String,
    pub token_hash: String,
    pub expires_at: Timestamp,
}
