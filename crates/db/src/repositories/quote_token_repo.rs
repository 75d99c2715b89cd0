//! Repository for `custom_order_quote_tokens`.

use sqlx::PgPool;
use footprint_core::types::{DbId, Timestamp};

use crate::models::quote_token::{CreateQuoteToken, CustomOrderQuoteToken};

const COLUMNS: &str = "id, quote_id, email, token_hash, expires_at, used_at, created_at";

pub struct QuoteTokenRepo;

impl QuoteTokenRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateQuoteToken,
    ) -> Result<CustomOrderQuoteToken, sqlx::Error> {
        let query = format!(
            "INSERT INTO custom_order_quote_tokens (quote_id, email, token_hash, expires_at)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CustomOrderQuoteToken>(&query)
            .bind(input.quote_id)
            .bind(&input.email)
            .bind(&input.token_hash)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    /// Find an unused token for `quote_id` with the given hash that has not
    /// expired at `now`.
    pub async fn find_valid(
        pool: &PgPool,
        quote_id: DbId,
        token_hash: &str,
        now: Timestamp,
    ) -> Result<Option<CustomOrderQuoteToken>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM custom_order_quote_tokens
             WHERE quote_id = $1 AND token_hash = $2 AND used_at IS NULL AND expires_at > $3
             LIMIT 1"
        );
        sqlx::query_as::<_, CustomOrderQuoteToken>(&query)
            .bind(quote_id)
            .bind(token_hash)
            .bind(now)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_for_quote(
        pool: &PgPool,
        quote_id: DbId,
    ) -> Result<Vec<CustomOrderQuoteToken>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM custom_order_quote_tokens
             WHERE quote_id = $1 ORDER BY created_at"
        );
        sqlx::query_as::<_, CustomOrderQuoteToken>(&query)
            .bind(quote_id)
            .fetch_all(pool)
            .await
    }
}
