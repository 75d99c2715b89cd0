//! Repository for the `orders` and `order_items` tables.

use sqlx::PgPool;
use footprint_core::types::DbId;

use crate::models::order::{ConvertQuoteToOrder, Order, OrderItem, OrderWithItems, UpdateOrder};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, order_number, email, phone, customer_name, shipping_address, \
    billing_address, status, delivery_status, estimated_arrival, subtotal_amount, tax_amount, \
    shipping_amount, discount_amount, coupon_code, total_amount, currency_code, notes, \
    tracking_number, acknowledged_at, acknowledged_by, order_type, custom_order_request_id, \
    created_at, updated_at";

const ITEM_COLUMNS: &str = "id, order_id, product_ref, variant_ref, product_title, variant_title, \
    quantity, price, total_amount, currency_code, product_image, created_at";

pub struct OrderRepo;

impl OrderRepo {
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Order>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM orders WHERE id = $1");
        sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_items(pool: &PgPool, order_id: DbId) -> Result<Vec<OrderItem>, sqlx::Error> {
        let query = format!("SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = $1 ORDER BY id");
        sqlx::query_as::<_, OrderItem>(&query)
            .bind(order_id)
            .fetch_all(pool)
            .await
    }

    /// Load an order together with its items.
    pub async fn find_with_items(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<OrderWithItems>, sqlx::Error> {
        let Some(order) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        let items = Self::list_items(pool, id).await?;
        Ok(Some(OrderWithItems { order, items }))
    }

    /// Number of the first order whose notes end with `marker` (case-insensitive).
    ///
    /// The marker always closes the notes of a converted order, so a suffix
    /// match keeps `ref_1` from matching an order paid with `ref_10`.
    ///
    /// Used to detect a payment reference that has already produced an order.
    pub async fn find_number_by_note_marker(
        pool: &PgPool,
        marker: &str,
    ) -> Result<Option<String>, sqlx::Error> {
        let row: Option<(String,)> = sqlx::query_as(
            "SELECT order_number FROM orders
             WHERE notes IS NOT NULL AND RIGHT(LOWER(notes), LENGTH($1)) = LOWER($1)
             ORDER BY id
             LIMIT 1",
        )
        .bind(marker)
        .fetch_optional(pool)
        .await?;
        Ok(row.map(|(number,)| number))
    }

    /// Apply an admin patch. Returns `None` if no row with `id` exists.
    ///
    /// `acknowledged_by` only takes effect on an order that has not been
    /// acknowledged yet.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateOrder,
    ) -> Result<Option<Order>, sqlx::Error> {
        let query = format!(
            "UPDATE orders SET
                status = COALESCE($2, status),
                delivery_status = COALESCE($3, delivery_status),
                estimated_arrival = CASE WHEN $4 THEN $5 ELSE estimated_arrival END,
                tracking_number = COALESCE($6, tracking_number),
                notes = COALESCE($7, notes),
                acknowledged_by = CASE
                    WHEN $8::text IS NOT NULL AND acknowledged_at IS NULL THEN $8
                    ELSE acknowledged_by END,
                acknowledged_at = CASE
                    WHEN $8::text IS NOT NULL AND acknowledged_at IS NULL THEN NOW()
                    ELSE acknowledged_at END,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .bind(&input.status)
            .bind(&input.delivery_status)
            .bind(input.estimated_arrival.is_some())
            .bind(input.estimated_arrival.flatten())
            .bind(&input.tracking_number)
            .bind(&input.notes)
            .bind(&input.acknowledged_by)
            .fetch_optional(pool)
            .await
    }

    /// Turn a paid custom quote into an order.
    ///
    /// In one transaction: insert the order and a single item covering the
    /// whole quote, mark the quote `paid`, mark the request `paid` with
    /// `paid_at` and `converted_order_id`, and consume the checkout token.
    pub async fn convert_custom_quote(
        pool: &PgPool,
        input: &ConvertQuoteToOrder,
    ) -> Result<Order, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let insert_order = format!(
            "INSERT INTO orders
                (user_id, order_number, email, phone, customer_name, shipping_address,
                 billing_address, status, subtotal_amount, shipping_amount, discount_amount,
                 total_amount, currency_code, notes, order_type, custom_order_request_id)
             VALUES ($1, $2, $3, $4, $5, '{{}}'::jsonb, NULL, 'processing', $6, 0, 0, $6, $7,
                     $8, 'custom', $9)
             RETURNING {COLUMNS}"
        );
        let order = sqlx::query_as::<_, Order>(&insert_order)
            .bind(&input.user_id)
            .bind(&input.order_number)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.customer_name)
            .bind(input.amount)
            .bind(&input.currency_code)
            .bind(&input.notes)
            .bind(input.request_id)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO order_items
                (order_id, product_ref, variant_ref, product_title, variant_title, quantity,
                 price, total_amount, currency_code, product_image)
             VALUES ($1, $2, $3, $4, $5, 1, $6, $6, $7, $8)",
        )
        .bind(order.id)
        .bind(input.request_id.to_string())
        .bind(input.quote_id.to_string())
        .bind(&input.item_title)
        .bind(&input.item_variant_title)
        .bind(input.amount)
        .bind(&input.currency_code)
        .bind(&input.item_image)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE custom_order_quotes SET status = 'paid', updated_at = NOW() WHERE id = $1")
            .bind(input.quote_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "UPDATE custom_order_requests SET
                status = 'paid',
                paid_at = NOW(),
                converted_order_id = $2,
                quoted_amount = $3,
                updated_at = NOW()
             WHERE id = $1",
        )
        .bind(input.request_id)
        .bind(order.id)
        .bind(input.amount)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE custom_order_quote_tokens SET used_at = NOW()
             WHERE quote_id = $1 AND token_hash = $2 AND used_at IS NULL",
        )
        .bind(input.quote_id)
        .bind(&input.token_hash)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(order)
    }
}
