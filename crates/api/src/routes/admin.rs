//! Route definitions for the `/admin` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{admin_custom_orders, admin_orders};
use crate::state::AppState;

/// Routes mounted at `/admin`. Every handler requires the `admin` role.
///
/// ```text
/// GET  /custom-order-requests              -> list_requests (?status=&search=)
/// GET  /custom-order-requests/{id}         -> get_request
/// PUT  /custom-order-requests/{id}         -> update_request
/// POST /custom-order-requests/{id}/quotes  -> create_quote
/// PUT  /custom-order-quotes/{id}           -> update_quote
/// GET  /orders/{id}                        -> get_order
/// PUT  /orders/{id}                        -> update_order
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/custom-order-requests",
            get(admin_custom_orders::list_requests),
        )
        .route(
            "/custom-order-requests/{id}",
            get(admin_custom_orders::get_request).put(admin_custom_orders::update_request),
        )
        .route(
            "/custom-order-requests/{id}/quotes",
            post(admin_custom_orders::create_quote),
        )
        .route(
            "/custom-order-quotes/{id}",
            put(admin_custom_orders::update_quote),
        )
        .route(
            "/orders/{id}",
            get(admin_orders::get_order).put(admin_orders::update_order),
        )
}
