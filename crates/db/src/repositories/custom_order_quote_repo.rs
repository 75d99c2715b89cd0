//! Repository for the `custom_order_quotes` table.
//!
//! Quote creation and auto-cancel touch both the quote and its request, so
//! those run inside a transaction here rather than in the caller.

use sqlx::PgPool;
use footprint_core::types::{DbId, Timestamp};

use crate::models::custom_order_quote::{
    CreateCustomOrderQuote, CustomOrderQuote, OpenQuote, UpdateCustomOrderQuote,
};
use crate::models::custom_order_request::CustomOrderRequest;
use crate::repositories::custom_order_request_repo::COLUMNS as REQUEST_COLUMNS;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, request_id, version, amount, currency_code, breakdown, note, status, \
    expires_at, reminder_count, last_reminder_at, expired_notification_sent_at, created_by, \
    created_at, updated_at";

/// Name of the constraint that serialises version assignment.
pub const VERSION_CONSTRAINT: &str = "uq_custom_order_quotes_request_version";

pub struct CustomOrderQuoteRepo;

impl CustomOrderQuoteRepo {
    /// Create the next quote version for a request and mark the request `quoted`.
    ///
    /// Runs in one transaction: version lookup, quote insert and the request's
    /// cached amount/currency/expiry update commit together. Returns `None`
    /// when the request does not exist. Two concurrent callers may compute the
    /// same version; the loser fails on [`VERSION_CONSTRAINT`].
    pub async fn create_version(
        pool: &PgPool,
        request_id: DbId,
        input: &CreateCustomOrderQuote,
    ) -> Result<Option<(CustomOrderQuote, CustomOrderRequest)>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let exists: Option<(DbId,)> =
            sqlx::query_as("SELECT id FROM custom_order_requests WHERE id = $1")
                .bind(request_id)
                .fetch_optional(&mut *tx)
                .await?;
        if exists.is_none() {
            return Ok(None);
        }

        let (next_version,): (i32,) = sqlx::query_as(
            "SELECT COALESCE(MAX(version), 0) + 1 FROM custom_order_quotes WHERE request_id = $1",
        )
        .bind(request_id)
        .fetch_one(&mut *tx)
        .await?;

        let insert = format!(
            "INSERT INTO custom_order_quotes
                (request_id, version, amount, currency_code, breakdown, note, status,
                 expires_at, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, 'sent', $7, $8)
             RETURNING {COLUMNS}"
        );
        let quote = sqlx::query_as::<_, CustomOrderQuote>(&insert)
            .bind(request_id)
            .bind(next_version)
            .bind(input.amount)
            .bind(&input.currency_code)
            .bind(&input.breakdown)
            .bind(&input.note)
            .bind(input.expires_at)
            .bind(&input.created_by)
            .fetch_one(&mut *tx)
            .await?;

        let update = format!(
            "UPDATE custom_order_requests SET
                status = 'quoted',
                quoted_amount = $2,
                currency_code = $3,
                quote_expires_at = $4,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {REQUEST_COLUMNS}"
        );
        let request = sqlx::query_as::<_, CustomOrderRequest>(&update)
            .bind(request_id)
            .bind(quote.amount)
            .bind(&quote.currency_code)
            .bind(quote.expires_at)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some((quote, request)))
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<CustomOrderQuote>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM custom_order_quotes WHERE id = $1");
        sqlx::query_as::<_, CustomOrderQuote>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All quotes of a request, newest version first.
    pub async fn list_for_request(
        pool: &PgPool,
        request_id: DbId,
    ) -> Result<Vec<CustomOrderQuote>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM custom_order_quotes
             WHERE request_id = $1 ORDER BY version DESC"
        );
        sqlx::query_as::<_, CustomOrderQuote>(&query)
            .bind(request_id)
            .fetch_all(pool)
            .await
    }

    /// Highest-version quote of a request regardless of status.
    pub async fn latest_for_request(
        pool: &PgPool,
        request_id: DbId,
    ) -> Result<Option<CustomOrderQuote>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM custom_order_quotes
             WHERE request_id = $1 ORDER BY version DESC LIMIT 1"
        );
        sqlx::query_as::<_, CustomOrderQuote>(&query)
            .bind(request_id)
            .fetch_optional(pool)
            .await
    }

    /// Highest-version quote for each of `request_ids`.
    pub async fn latest_for_requests(
        pool: &PgPool,
        request_ids: &[DbId],
    ) -> Result<Vec<CustomOrderQuote>, sqlx::Error> {
        if request_ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!(
            "SELECT DISTINCT ON (request_id) {COLUMNS} FROM custom_order_quotes
             WHERE request_id = ANY($1)
             ORDER BY request_id, version DESC"
        );
        sqlx::query_as::<_, CustomOrderQuote>(&query)
            .bind(request_ids)
            .fetch_all(pool)
            .await
    }

    /// Apply an admin patch. Returns `None` if no row with `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCustomOrderQuote,
    ) -> Result<Option<CustomOrderQuote>, sqlx::Error> {
        let query = format!(
            "UPDATE custom_order_quotes SET
                status = COALESCE($2, status),
                note = COALESCE($3, note),
                expires_at = COALESCE($4, expires_at),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CustomOrderQuote>(&query)
            .bind(id)
            .bind(&input.status)
            .bind(&input.note)
            .bind(input.expires_at)
            .fetch_optional(pool)
            .await
    }

    /// Set a quote's status. Returns `true` if the row was updated.
    pub async fn set_status(pool: &PgPool, id: DbId, status: &str) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE custom_order_quotes SET status = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(status)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Open (`sent`/`accepted`) quotes with an expiry, soonest expiry first,
    /// joined with their request.
    pub async fn list_open(pool: &PgPool, limit: i64) -> Result<Vec<OpenQuote>, sqlx::Error> {
        sqlx::query_as::<_, OpenQuote>(
            "SELECT q.id AS quote_id, q.request_id, q.version, q.amount, q.currency_code,
                    q.expires_at, q.reminder_count, q.expired_notification_sent_at,
                    r.request_number, r.email, r.customer_name, r.title,
                    r.status AS request_status, r.converted_order_id,
                    EXISTS (
                        SELECT 1 FROM custom_order_quotes n
                        WHERE n.request_id = q.request_id
                          AND n.status IN ('sent', 'accepted')
                          AND n.version > q.version
                    ) AS superseded
             FROM custom_order_quotes q
             JOIN custom_order_requests r ON r.id = q.request_id
             WHERE q.status IN ('sent', 'accepted') AND q.expires_at IS NOT NULL
             ORDER BY q.expires_at ASC, q.id ASC
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Move an open quote to `expired`. Returns `true` if it was still open.
    pub async fn mark_expired(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE custom_order_quotes SET status = 'expired', updated_at = NOW()
             WHERE id = $1 AND status IN ('sent', 'accepted')",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count a sent reminder.
    pub async fn record_reminder(pool: &PgPool, id: DbId, at: Timestamp) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE custom_order_quotes SET
                reminder_count = reminder_count + 1,
                last_reminder_at = $2,
                updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(at)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Expire a quote and cancel its request in one transaction.
    ///
    /// Both updates are guarded so a payment that landed in the meantime is
    /// never overwritten: a quote that is no longer open keeps its status and
    /// a paid or converted request stays as it is. Returns `true` if the
    /// request was cancelled.
    pub async fn expire_and_cancel_request(
        pool: &PgPool,
        quote_id: DbId,
        request_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query(
            "UPDATE custom_order_quotes SET status = 'expired', updated_at = NOW()
             WHERE id = $1 AND status IN ('sent', 'accepted')",
        )
        .bind(quote_id)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query(
            "UPDATE custom_order_requests SET status = 'cancelled', updated_at = NOW()
             WHERE id = $1 AND status <> 'paid' AND converted_order_id IS NULL",
        )
        .bind(request_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    /// Stamp `expired_notification_sent_at` so the notice goes out once.
    pub async fn mark_expiry_notice_sent(
        pool: &PgPool,
        id: DbId,
        at: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE custom_order_quotes SET expired_notification_sent_at = $2, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(at)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Of `request_ids`, those that still have an open quote with no expiry
    /// or an expiry after `now`.
    pub async fn request_ids_with_live_quotes(
        pool: &PgPool,
        request_ids: &[DbId],
        now: Timestamp,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        if request_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows: Vec<(DbId,)> = sqlx::query_as(
            "SELECT DISTINCT request_id FROM custom_order_quotes
             WHERE request_id = ANY($1)
               AND status IN ('sent', 'accepted')
               AND (expires_at IS NULL OR expires_at > $2)",
        )
        .bind(request_ids)
        .bind(now)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
