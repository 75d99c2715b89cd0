//! Admin handlers for custom-order requests and their quotes.
//!
//! All handlers require the `admin` role via [`RequireAdmin`] and the custom
//! orders feature via [`CustomOrdersEnabled`].

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use footprint_core::error::CoreError;
use footprint_core::status::{QuoteStatus, RequestStatus};
use footprint_core::types::{DbId, Timestamp};
use footprint_db::models::custom_order_quote::{CustomOrderQuote, UpdateCustomOrderQuote};
use footprint_db::models::custom_order_request::{
    CustomOrderRequest, CustomOrderRequestFilter, UpdateCustomOrderRequest,
};
use footprint_db::repositories::{CustomOrderQuoteRepo, CustomOrderRequestRepo};
use footprint_quotes::NewQuote;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::feature::CustomOrdersEnabled;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Query for `GET /admin/custom-order-requests`.
#[derive(Debug, Default, Deserialize)]
pub struct ListRequestsQuery {
    /// A request status, or `all`.
    pub status: Option<String>,
    pub search: Option<String>,
}

/// A request row in the admin list, with its latest quote.
#[derive(Debug, Serialize)]
pub struct RequestSummary {
    #[serde(flatten)]
    pub request: CustomOrderRequest,
    pub latest_quote: Option<CustomOrderQuote>,
}

/// A request with every quote version, newest first.
#[derive(Debug, Serialize)]
pub struct RequestDetail {
    #[serde(flatten)]
    pub request: CustomOrderRequest,
    pub quotes: Vec<CustomOrderQuote>,
}

/// Request body for `PUT /admin/custom-order-requests/{id}`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateRequestBody {
    pub status: Option<String>,
    pub admin_notes: Option<String>,
    pub customer_notes: Option<String>,
    pub quote_expires_at: Option<Timestamp>,
    pub quoted_amount: Option<Decimal>,
}

/// Request body for `POST /admin/custom-order-requests/{id}/quotes`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateQuoteBody {
    pub amount: Option<Decimal>,
    pub currency_code: Option<String>,
    pub note: Option<String>,
    pub breakdown: Option<serde_json::Value>,
    pub expires_at: Option<String>,
}

/// Request body for `PUT /admin/custom-order-quotes/{id}`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateQuoteBody {
    pub status: Option<String>,
    pub note: Option<String>,
    pub expires_at: Option<Timestamp>,
}

fn request_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "CustomOrderRequest",
        id,
    })
}

fn parse_request_status(raw: Option<String>) -> AppResult<Option<String>> {
    raw.map(|s| {
        RequestStatus::parse(s.trim())
            .map(|status| status.as_str().to_string())
            .ok_or_else(|| AppError::BadRequest(format!("Invalid request status: {s}")))
    })
    .transpose()
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/custom-order-requests?status=&search=
pub async fn list_requests(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    _enabled: CustomOrdersEnabled,
    Query(query): Query<ListRequestsQuery>,
) -> AppResult<Json<DataResponse<Vec<RequestSummary>>>> {
    let status = query
        .status
        .filter(|s| !s.trim().is_empty() && s.trim() != "all");
    let filter = CustomOrderRequestFilter {
        status: parse_request_status(status)?,
        search: query.search,
    };

    let requests = CustomOrderRequestRepo::list(&state.pool, &filter).await?;
    let ids: Vec<DbId> = requests.iter().map(|r| r.id).collect();

    // One query for every latest quote instead of one per row.
    let mut latest: HashMap<DbId, CustomOrderQuote> =
        CustomOrderQuoteRepo::latest_for_requests(&state.pool, &ids)
            .await?
            .into_iter()
            .map(|q| (q.request_id, q))
            .collect();

    let summaries = requests
        .into_iter()
        .map(|request| RequestSummary {
            latest_quote: latest.remove(&request.id),
            request,
        })
        .collect();

    Ok(Json(DataResponse { data: summaries }))
}

/// GET /api/v1/admin/custom-order-requests/{id}
pub async fn get_request(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    _enabled: CustomOrdersEnabled,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<RequestDetail>>> {
    let request = CustomOrderRequestRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| request_not_found(id))?;
    let quotes = CustomOrderQuoteRepo::list_for_request(&state.pool, id).await?;

    Ok(Json(DataResponse {
        data: RequestDetail { request, quotes },
    }))
}

/// PUT /api/v1/admin/custom-order-requests/{id}
///
/// Partial update; only fields present in the body change.
pub async fn update_request(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    _enabled: CustomOrdersEnabled,
    Path(id): Path<DbId>,
    Json(body): Json<UpdateRequestBody>,
) -> AppResult<Json<DataResponse<CustomOrderRequest>>> {
    let patch = UpdateCustomOrderRequest {
        status: parse_request_status(body.status)?,
        admin_notes: body.admin_notes,
        customer_notes: body.customer_notes,
        quote_expires_at: body.quote_expires_at,
        quoted_amount: body.quoted_amount,
    };

    let request = CustomOrderRequestRepo::update(&state.pool, id, &patch)
        .await?
        .ok_or_else(|| request_not_found(id))?;

    tracing::info!(request_id = id, admin = %admin.email, status = %request.status, "Custom order request updated");
    Ok(Json(DataResponse { data: request }))
}

// ---------------------------------------------------------------------------
// Quotes
// ---------------------------------------------------------------------------

/// POST /api/v1/admin/custom-order-requests/{id}/quotes
///
/// Creates the next quote version and emails the customer an access link.
pub async fn create_quote(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    _enabled: CustomOrdersEnabled,
    Path(id): Path<DbId>,
    Json(body): Json<CreateQuoteBody>,
) -> AppResult<(StatusCode, Json<DataResponse<CustomOrderQuote>>)> {
    let input = NewQuote {
        amount: body.amount,
        currency_code: body.currency_code,
        note: body.note,
        breakdown: body.breakdown,
        expires_at: body.expires_at,
    };
    let quote = state
        .quotes
        .create_quote(id, input, &admin.email, Utc::now())
        .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: quote })))
}

/// PUT /api/v1/admin/custom-order-quotes/{id}
///
/// Paid quotes are immutable. A status change carries the request along
/// (see [`QuoteStatus::implied_request_status`]) unless the request is
/// already paid or converted.
pub async fn update_quote(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    _enabled: CustomOrdersEnabled,
    Path(id): Path<DbId>,
    Json(body): Json<UpdateQuoteBody>,
) -> AppResult<Json<DataResponse<CustomOrderQuote>>> {
    let existing = CustomOrderQuoteRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "CustomOrderQuote",
            id,
        }))?;

    if existing.status == QuoteStatus::Paid.as_str() {
        return Err(AppError::Core(CoreError::Conflict(
            "Paid quotes cannot be modified".into(),
        )));
    }

    let status = body
        .status
        .map(|s| {
            QuoteStatus::parse(s.trim())
                .ok_or_else(|| AppError::BadRequest(format!("Invalid quote status: {s}")))
        })
        .transpose()?;

    let patch = UpdateCustomOrderQuote {
        status: status.map(|s| s.as_str().to_string()),
        note: body.note,
        expires_at: body.expires_at,
    };
    let quote = CustomOrderQuoteRepo::update(&state.pool, id, &patch)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "CustomOrderQuote",
            id,
        }))?;

    if let Some(request_status) = status.and_then(QuoteStatus::implied_request_status) {
        let moved = CustomOrderRequestRepo::set_status_unless_settled(
            &state.pool,
            quote.request_id,
            request_status.as_str(),
        )
        .await?;
        if !moved {
            tracing::info!(
                quote_id = id,
                request_id = quote.request_id,
                "Request already settled, status left unchanged",
            );
        }
    }

    tracing::info!(
        quote_id = id,
        request_id = quote.request_id,
        admin = %admin.email,
        status = %quote.status,
        "Custom order quote updated",
    );
    Ok(Json(DataResponse { data: quote }))
}
