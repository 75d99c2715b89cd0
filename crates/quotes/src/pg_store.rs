//! [`QuoteStore`] over the Postgres repositories.

use async_trait::async_trait;
use footprint_core::status::{QuoteStatus, RequestStatus};
use footprint_core::types::{DbId, Timestamp};
use footprint_db::models::custom_order_quote::{
    CreateCustomOrderQuote, CustomOrderQuote, OpenQuote,
};
use footprint_db::models::custom_order_request::{CreateCustomOrderRequest, CustomOrderRequest};
use footprint_db::models::order::{ConvertQuoteToOrder, Order};
use footprint_db::models::quote_token::{CreateQuoteToken, CustomOrderQuoteToken};
use footprint_db::repositories::custom_order_quote_repo::VERSION_CONSTRAINT;
use footprint_db::repositories::{
    CustomOrderQuoteRepo, CustomOrderRequestRepo, OrderRepo, QuoteTokenRepo,
};
use footprint_db::DbPool;

use crate::error::StoreError;
use crate::store::{QuoteStore, StoreResult};

#[derive(Clone)]
pub struct PgQuoteStore {
    pool: DbPool,
}

impl PgQuoteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Whether `err` is a unique violation on the quote version constraint.
fn is_version_conflict(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db| db.code().as_deref() == Some("23505") && db.constraint() == Some(VERSION_CONSTRAINT))
        .unwrap_or(false)
}

#[async_trait]
impl QuoteStore for PgQuoteStore {
    async fn create_request(
        &self,
        input: &CreateCustomOrderRequest,
    ) -> StoreResult<CustomOrderRequest> {
        Ok(CustomOrderRequestRepo::create(&self.pool, input).await?)
    }

    async fn find_request(&self, id: DbId) -> StoreResult<Option<CustomOrderRequest>> {
        Ok(CustomOrderRequestRepo::find_by_id(&self.pool, id).await?)
    }

    async fn find_request_for_tracking(
        &self,
        request_number: &str,
        email: &str,
    ) -> StoreResult<Option<CustomOrderRequest>> {
        Ok(CustomOrderRequestRepo::find_by_number_and_email(&self.pool, request_number, email).await?)
    }

    async fn set_request_status(&self, id: DbId, status: RequestStatus) -> StoreResult<()> {
        CustomOrderRequestRepo::set_status(&self.pool, id, status.as_str()).await?;
        Ok(())
    }

    async fn create_quote_version(
        &self,
        request_id: DbId,
        input: &CreateCustomOrderQuote,
    ) -> StoreResult<Option<(CustomOrderQuote, CustomOrderRequest)>> {
        CustomOrderQuoteRepo::create_version(&self.pool, request_id, input)
            .await
            .map_err(|e| {
                if is_version_conflict(&e) {
                    StoreError::DuplicateVersion
                } else {
                    StoreError::Database(e)
                }
            })
    }

    async fn find_quote(&self, id: DbId) -> StoreResult<Option<CustomOrderQuote>> {
        Ok(CustomOrderQuoteRepo::find_by_id(&self.pool, id).await?)
    }

    async fn latest_quote(&self, request_id: DbId) -> StoreResult<Option<CustomOrderQuote>> {
        Ok(CustomOrderQuoteRepo::latest_for_request(&self.pool, request_id).await?)
    }

    async fn set_quote_status(&self, id: DbId, status: QuoteStatus) -> StoreResult<()> {
        CustomOrderQuoteRepo::set_status(&self.pool, id, status.as_str()).await?;
        Ok(())
    }

    async fn insert_token(&self, input: &CreateQuoteToken) -> StoreResult<()> {
        QuoteTokenRepo::create(&self.pool, input).await?;
        Ok(())
    }

    async fn find_valid_token(
        &self,
        quote_id: DbId,
        token_hash: &str,
        now: Timestamp,
    ) -> StoreResult<Option<CustomOrderQuoteToken>> {
        Ok(QuoteTokenRepo::find_valid(&self.pool, quote_id, token_hash, now).await?)
    }

    async fn list_open_quotes(&self, limit: i64) -> StoreResult<Vec<OpenQuote>> {
        Ok(CustomOrderQuoteRepo::list_open(&self.pool, limit).await?)
    }

    async fn expire_quote(&self, quote_id: DbId) -> StoreResult<()> {
        CustomOrderQuoteRepo::mark_expired(&self.pool, quote_id).await?;
        Ok(())
    }

    async fn record_reminder(&self, quote_id: DbId, at: Timestamp) -> StoreResult<()> {
        Ok(CustomOrderQuoteRepo::record_reminder(&self.pool, quote_id, at).await?)
    }

    async fn expire_and_cancel(&self, quote_id: DbId, request_id: DbId) -> StoreResult<bool> {
        Ok(CustomOrderQuoteRepo::expire_and_cancel_request(&self.pool, quote_id, request_id).await?)
    }

    async fn mark_expiry_notice_sent(&self, quote_id: DbId, at: Timestamp) -> StoreResult<()> {
        Ok(CustomOrderQuoteRepo::mark_expiry_notice_sent(&self.pool, quote_id, at).await?)
    }

    async fn stale_cancelled_requests(
        &self,
        cutoff: Timestamp,
        limit: i64,
    ) -> StoreResult<Vec<DbId>> {
        Ok(CustomOrderRequestRepo::list_stale_cancelled_ids(&self.pool, cutoff, limit).await?)
    }

    async fn requests_with_live_quotes(
        &self,
        request_ids: &[DbId],
        now: Timestamp,
    ) -> StoreResult<Vec<DbId>> {
        Ok(CustomOrderQuoteRepo::request_ids_with_live_quotes(&self.pool, request_ids, now).await?)
    }

    async fn delete_requests(&self, request_ids: &[DbId]) -> StoreResult<u64> {
        Ok(CustomOrderRequestRepo::delete_many(&self.pool, request_ids).await?)
    }

    async fn find_order_number_by_marker(&self, marker: &str) -> StoreResult<Option<String>> {
        Ok(OrderRepo::find_number_by_note_marker(&self.pool, marker).await?)
    }

    async fn find_order(&self, id: DbId) -> StoreResult<Option<Order>> {
        Ok(OrderRepo::find_by_id(&self.pool, id).await?)
    }

    async fn convert_to_order(&self, input: &ConvertQuoteToOrder) -> StoreResult<Order> {
        Ok(OrderRepo::convert_custom_quote(&self.pool, input).await?)
    }
}
