//! Persistence port for the quote lifecycle.
//!
//! Every read and write the services perform goes through [`QuoteStore`], so
//! the orchestration can run against Postgres ([`PgQuoteStore`](crate::PgQuoteStore))
//! or an in-memory fake in tests. Implementations own their transactions:
//! [`create_quote_version`](QuoteStore::create_quote_version),
//! [`expire_and_cancel`](QuoteStore::expire_and_cancel) and
//! [`convert_to_order`](QuoteStore::convert_to_order) must each be atomic.

use async_trait::async_trait;
use footprint_core::status::{QuoteStatus, RequestStatus};
use footprint_core::types::{DbId, Timestamp};
use footprint_db::models::custom_order_quote::{
    CreateCustomOrderQuote, CustomOrderQuote, OpenQuote,
};
use footprint_db::models::custom_order_request::{CreateCustomOrderRequest, CustomOrderRequest};
use footprint_db::models::order::{ConvertQuoteToOrder, Order};
use footprint_db::models::quote_token::{CreateQuoteToken, CustomOrderQuoteToken};

use crate::error::StoreError;

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait QuoteStore: Send + Sync {
    // -- requests ----------------------------------------------------------

    async fn create_request(
        &self,
        input: &CreateCustomOrderRequest,
    ) -> StoreResult<CustomOrderRequest>;

    async fn find_request(&self, id: DbId) -> StoreResult<Option<CustomOrderRequest>>;

    /// Case-insensitive lookup by request number and email.
    async fn find_request_for_tracking(
        &self,
        request_number: &str,
        email: &str,
    ) -> StoreResult<Option<CustomOrderRequest>>;

    async fn set_request_status(&self, id: DbId, status: RequestStatus) -> StoreResult<()>;

    // -- quotes ------------------------------------------------------------

    /// Insert the next quote version and mark the request `quoted` with the
    /// quote's amount, currency and expiry. `None` when the request is missing.
    async fn create_quote_version(
        &self,
        request_id: DbId,
        input: &CreateCustomOrderQuote,
    ) -> StoreResult<Option<(CustomOrderQuote, CustomOrderRequest)>>;

    async fn find_quote(&self, id: DbId) -> StoreResult<Option<CustomOrderQuote>>;

    /// Highest-version quote of a request, any status.
    async fn latest_quote(&self, request_id: DbId) -> StoreResult<Option<CustomOrderQuote>>;

    async fn set_quote_status(&self, id: DbId, status: QuoteStatus) -> StoreResult<()>;

    // -- access tokens -----------------------------------------------------

    async fn insert_token(&self, input: &CreateQuoteToken) -> StoreResult<()>;

    /// An unused token for `quote_id` with this hash that is still valid at `now`.
    async fn find_valid_token(
        &self,
        quote_id: DbId,
        token_hash: &str,
        now: Timestamp,
    ) -> StoreResult<Option<CustomOrderQuoteToken>>;

    // -- lifecycle cron ----------------------------------------------------

    /// Up to `limit` `sent`/`accepted` quotes with an expiry, joined with
    /// their request.
    async fn list_open_quotes(&self, limit: i64) -> StoreResult<Vec<OpenQuote>>;

    async fn expire_quote(&self, quote_id: DbId) -> StoreResult<()>;

    async fn record_reminder(&self, quote_id: DbId, at: Timestamp) -> StoreResult<()>;

    /// Expire the quote and cancel the request unless it is paid or
    /// converted. Returns whether the request was cancelled.
    async fn expire_and_cancel(&self, quote_id: DbId, request_id: DbId) -> StoreResult<bool>;

    async fn mark_expiry_notice_sent(&self, quote_id: DbId, at: Timestamp) -> StoreResult<()>;

    /// Cancelled, unconverted requests last updated at or before `cutoff`.
    async fn stale_cancelled_requests(
        &self,
        cutoff: Timestamp,
        limit: i64,
    ) -> StoreResult<Vec<DbId>>;

    /// Of `request_ids`, those with an open quote whose expiry is unset or
    /// after `now`.
    async fn requests_with_live_quotes(
        &self,
        request_ids: &[DbId],
        now: Timestamp,
    ) -> StoreResult<Vec<DbId>>;

    async fn delete_requests(&self, request_ids: &[DbId]) -> StoreResult<u64>;

    // -- orders ------------------------------------------------------------

    /// Number of an order whose notes contain `marker`.
    async fn find_order_number_by_marker(&self, marker: &str) -> StoreResult<Option<String>>;

    async fn find_order(&self, id: DbId) -> StoreResult<Option<Order>>;

    async fn convert_to_order(&self, input: &ConvertQuoteToOrder) -> StoreResult<Order>;
}
