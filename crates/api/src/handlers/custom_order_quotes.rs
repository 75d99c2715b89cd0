//! Public handlers for `/custom-order-quotes`: token-gated quote access,
//! checkout, the payment callback and the lifecycle cron.

use axum::extract::{Path, Query, State};
use axum::http::header::SET_COOKIE;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use chrono::Utc;
use footprint_core::custom_order::encode_query_component;
use footprint_core::error::CoreError;
use footprint_core::types::DbId;
use footprint_quotes::{CheckoutStarted, LifecycleReport, QuoteView};
use serde::Deserialize;

use crate::cookies::{clear_session_cookie, read_session_cookie, session_cookie};
use crate::error::{AppError, AppResult};
use crate::middleware::feature::CustomOrdersEnabled;
use crate::response::DataResponse;
use crate::state::AppState;

/// Header carrying the shared cron secret.
pub const CRON_SECRET_HEADER: &str = "x-cron-secret";

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
}

/// Request body for `POST /custom-order-quotes/{id}/initialize`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct InitializeBody {
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    pub reference: Option<String>,
}

/// GET /api/v1/custom-order-quotes/{quote_id}?token=
pub async fn view(
    State(state): State<AppState>,
    _enabled: CustomOrdersEnabled,
    Path(quote_id): Path<DbId>,
    Query(query): Query<TokenQuery>,
) -> AppResult<Json<DataResponse<QuoteView>>> {
    let view = state
        .quotes
        .view_quote(quote_id, query.token.as_deref(), Utc::now())
        .await?;
    Ok(Json(DataResponse { data: view }))
}

/// POST /api/v1/custom-order-quotes/{quote_id}/initialize
///
/// Starts a hosted checkout and stores the checkout session in a cookie.
pub async fn initialize(
    State(state): State<AppState>,
    _enabled: CustomOrdersEnabled,
    Path(quote_id): Path<DbId>,
    Json(body): Json<InitializeBody>,
) -> AppResult<Response> {
    let started: CheckoutStarted = state
        .quotes
        .initialize_payment(quote_id, body.token.as_deref(), Utc::now())
        .await?;

    let cookie = session_cookie(&started.session.encode(), state.config.session_cookie_secure);
    Ok(([(SET_COOKIE, cookie)], Json(DataResponse { data: started })).into_response())
}

/// GET /api/v1/custom-order-quotes/cron
///
/// Runs reminders, expiry, auto-cancel and retention cleanup. Driven by an
/// external scheduler that presents the shared secret.
pub async fn cron(
    State(state): State<AppState>,
    _enabled: CustomOrdersEnabled,
    headers: HeaderMap,
) -> AppResult<Json<DataResponse<LifecycleReport>>> {
    let presented = headers
        .get(CRON_SECRET_HEADER)
        .and_then(|v| v.to_str().ok());
    let authorized = matches!(
        (state.config.cron_secret.as_deref(), presented),
        (Some(expected), Some(given)) if expected == given
    );
    if !authorized {
        return Err(AppError::Core(CoreError::Unauthorized("Unauthorized".into())));
    }

    let report = state
        .quotes
        .run_lifecycle(&state.config.lifecycle, Utc::now())
        .await?;
    Ok(Json(DataResponse { data: report }))
}

/// GET /api/v1/custom-order-quotes/verify?reference=
///
/// Payment callback. Always answers with a 303 redirect to the storefront.
pub async fn verify(
    State(state): State<AppState>,
    Query(query): Query<VerifyQuery>,
    headers: HeaderMap,
) -> Response {
    let cookie = read_session_cookie(&headers);
    let outcome = state
        .quotes
        .verify_payment(query.reference.as_deref(), cookie.as_deref(), Utc::now())
        .await;

    let base = &state.config.public_base_url;
    match outcome {
        Ok(success) => {
            let location = format!(
                "{base}/checkout/success?order={}",
                encode_query_component(&success.order_number)
            );
            let redirect = Redirect::to(&location);
            if success.clear_session {
                let clear = clear_session_cookie(state.config.session_cookie_secure);
                ([(SET_COOKIE, clear)], redirect).into_response()
            } else {
                redirect.into_response()
            }
        }
        Err(failure) => {
            tracing::warn!(reason = failure.reason(), "Payment callback rejected");
            Redirect::to(&format!("{base}/custom-orders?error={}", failure.reason())).into_response()
        }
    }
}
