//! Customer-facing custom-order routes.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{custom_order_quotes, custom_order_requests};
use crate::state::AppState;

/// Routes mounted at `/custom-order-requests`.
///
/// ```text
/// POST /         -> submit
/// GET  /track    -> track
/// ```
pub fn requests_router() -> Router<AppState> {
    Router::new()
        .route("/", post(custom_order_requests::submit))
        .route("/track", get(custom_order_requests::track))
}

/// Routes mounted at `/custom-order-quotes`.
///
/// ```text
/// GET  /cron                 -> cron (x-cron-secret)
/// GET  /verify               -> verify (payment callback, redirects)
/// GET  /{id}                 -> view (?token=)
/// POST /{id}/initialize      -> initialize
/// ```
pub fn quotes_router() -> Router<AppState> {
    Router::new()
        .route("/cron", get(custom_order_quotes::cron))
        .route("/verify", get(custom_order_quotes::verify))
        .route("/{id}", get(custom_order_quotes::view))
        .route("/{id}/initialize", post(custom_order_quotes::initialize))
}
