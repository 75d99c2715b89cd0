//! Repository for the `custom_order_requests` table.

use sqlx::PgPool;
use footprint_core::types::{DbId, Timestamp};

use crate::models::custom_order_request::{
    CreateCustomOrderRequest, CustomOrderRequest, CustomOrderRequestFilter,
    UpdateCustomOrderRequest,
};

/// Column list shared across queries to avoid repetition.
pub(crate) const COLUMNS: &str = "id, request_number, user_id, email, phone, customer_name, \
    title, description, size_notes, color_preferences, budget_min, budget_max, desired_date, \
    reference_images, status, admin_notes, customer_notes, quoted_amount, currency_code, \
    quote_expires_at, paid_at, converted_order_id, created_at, updated_at";

/// Provides CRUD and lifecycle queries for custom-order requests.
pub struct CustomOrderRequestRepo;

impl CustomOrderRequestRepo {
    /// Insert a new request with status `submitted`.
    pub async fn create(
        pool: &PgPool,
        input: &CreateCustomOrderRequest,
    ) -> Result<CustomOrderRequest, sqlx::Error> {
        let query = format!(
            "INSERT INTO custom_order_requests
                (request_number, user_id, email, phone, customer_name, title, description,
                 size_notes, color_preferences, budget_min, budget_max, desired_date,
                 reference_images, customer_notes, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, 'submitted')
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CustomOrderRequest>(&query)
            .bind(&input.request_number)
            .bind(&input.user_id)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.customer_name)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.size_notes)
            .bind(&input.color_preferences)
            .bind(input.budget_min)
            .bind(input.budget_max)
            .bind(input.desired_date)
            .bind(sqlx::types::Json(&input.reference_images))
            .bind(&input.customer_notes)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<CustomOrderRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM custom_order_requests WHERE id = $1");
        sqlx::query_as::<_, CustomOrderRequest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Customer tracking lookup: request number and email, both case-insensitive.
    pub async fn find_by_number_and_email(
        pool: &PgPool,
        request_number: &str,
        email: &str,
    ) -> Result<Option<CustomOrderRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM custom_order_requests
             WHERE UPPER(request_number) = UPPER($1) AND LOWER(email) = LOWER($2)
             LIMIT 1"
        );
        sqlx::query_as::<_, CustomOrderRequest>(&query)
            .bind(request_number.trim())
            .bind(email.trim())
            .fetch_optional(pool)
            .await
    }

    /// List requests, newest first.
    pub async fn list(
        pool: &PgPool,
        filter: &CustomOrderRequestFilter,
    ) -> Result<Vec<CustomOrderRequest>, sqlx::Error> {
        let pattern = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{s}%"));
        let query = format!(
            "SELECT {COLUMNS} FROM custom_order_requests
             WHERE ($1::text IS NULL OR status = $1)
               AND ($2::text IS NULL
                    OR request_number ILIKE $2
                    OR customer_name ILIKE $2
                    OR email ILIKE $2
                    OR title ILIKE $2)
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, CustomOrderRequest>(&query)
            .bind(&filter.status)
            .bind(pattern)
            .fetch_all(pool)
            .await
    }

    /// Apply an admin patch. Returns `None` if no row with `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCustomOrderRequest,
    ) -> Result<Option<CustomOrderRequest>, sqlx::Error> {
        let query = format!(
            "UPDATE custom_order_requests SET
                status = COALESCE($2, status),
                admin_notes = COALESCE($3, admin_notes),
                customer_notes = COALESCE($4, customer_notes),
                quote_expires_at = COALESCE($5, quote_expires_at),
                quoted_amount = COALESCE($6, quoted_amount),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CustomOrderRequest>(&query)
            .bind(id)
            .bind(&input.status)
            .bind(&input.admin_notes)
            .bind(&input.customer_notes)
            .bind(input.quote_expires_at)
            .bind(input.quoted_amount)
            .fetch_optional(pool)
            .await
    }

    /// Set the request status. Returns `true` if the row was updated.
    pub async fn set_status(pool: &PgPool, id: DbId, status: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE custom_order_requests SET status = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(status)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Like [`Self::set_status`], but leaves paid or converted requests alone.
    pub async fn set_status_unless_settled(
        pool: &PgPool,
        id: DbId,
        status: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE custom_order_requests SET status = $2, updated_at = NOW()
             WHERE id = $1 AND status <> 'paid' AND converted_order_id IS NULL",
        )
        .bind(id)
        .bind(status)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Cancelled, unconverted requests last touched at or before `cutoff`,
    /// oldest first.
    pub async fn list_stale_cancelled_ids(
        pool: &PgPool,
        cutoff: Timestamp,
        limit: i64,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let rows: Vec<(DbId,)> = sqlx::query_as(
            "SELECT id FROM custom_order_requests
             WHERE status = 'cancelled' AND converted_order_id IS NULL AND updated_at <= $1
             ORDER BY updated_at ASC
             LIMIT $2",
        )
        .bind(cutoff)
        .bind(limit)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Hard-delete requests by id. Quotes and tokens cascade.
    pub async fn delete_many(pool: &PgPool, ids: &[DbId]) -> Result<u64, sqlx::Error> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query("DELETE FROM custom_order_requests WHERE id = ANY($1)")
            .bind(ids)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
