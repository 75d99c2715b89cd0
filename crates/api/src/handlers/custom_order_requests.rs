//! Customer-facing handlers for `/custom-order-requests`.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use footprint_core::types::{DbId, Timestamp};
use footprint_quotes::{NewRequest, TrackedRequest};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::middleware::feature::CustomOrdersEnabled;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /custom-order-requests`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateCustomOrderRequestBody {
    pub customer_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub size_notes: Option<String>,
    pub color_preferences: Option<String>,
    pub budget_min: Option<Decimal>,
    pub budget_max: Option<Decimal>,
    pub desired_date: Option<String>,
    pub reference_images: Vec<String>,
    pub customer_notes: Option<String>,
}

impl From<CreateCustomOrderRequestBody> for NewRequest {
    fn from(body: CreateCustomOrderRequestBody) -> Self {
        NewRequest {
            customer_name: body.customer_name,
            email: body.email,
            phone: body.phone,
            title: body.title,
            description: body.description,
            size_notes: body.size_notes,
            color_preferences: body.color_preferences,
            budget_min: body.budget_min,
            budget_max: body.budget_max,
            desired_date: body.desired_date,
            reference_images: body.reference_images,
            customer_notes: body.customer_notes,
        }
    }
}

/// Acknowledgement returned after submission.
#[derive(Debug, Serialize)]
pub struct SubmittedRequest {
    pub id: DbId,
    pub request_number: String,
    pub status: String,
    pub email: String,
    pub created_at: Timestamp,
}

/// Query for `GET /custom-order-requests/track`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackQuery {
    pub request_number: Option<String>,
    pub email: Option<String>,
}

/// POST /api/v1/custom-order-requests
pub async fn submit(
    State(state): State<AppState>,
    _enabled: CustomOrdersEnabled,
    Json(body): Json<CreateCustomOrderRequestBody>,
) -> AppResult<(StatusCode, Json<DataResponse<SubmittedRequest>>)> {
    let request = state.quotes.submit_request(body.into(), Utc::now()).await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: SubmittedRequest {
                id: request.id,
                request_number: request.request_number,
                status: request.status,
                email: request.email,
                created_at: request.created_at,
            },
        }),
    ))
}

/// GET /api/v1/custom-order-requests/track?requestNumber=&email=
pub async fn track(
    State(state): State<AppState>,
    _enabled: CustomOrdersEnabled,
    Query(query): Query<TrackQuery>,
) -> AppResult<Json<DataResponse<TrackedRequest>>> {
    let tracked = state
        .quotes
        .track_request(query.request_number.as_deref(), query.email.as_deref())
        .await?;
    Ok(Json(DataResponse { data: tracked }))
}
