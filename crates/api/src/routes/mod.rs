pub mod admin;
pub mod auth;
pub mod custom_orders;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                                      login (public)
///
/// /custom-order-requests                           submit (public)
/// /custom-order-requests/track                     track by number + email
///
/// /custom-order-quotes/{id}                        view with access token
/// /custom-order-quotes/{id}/initialize             start checkout (POST)
/// /custom-order-quotes/verify                      payment callback (redirect)
/// /custom-order-quotes/cron                        lifecycle cron (x-cron-secret)
///
/// /admin/custom-order-requests                     list (admin only)
/// /admin/custom-order-requests/{id}                get, update
/// /admin/custom-order-requests/{id}/quotes         create quote version (POST)
/// /admin/custom-order-quotes/{id}                  update quote (PUT)
/// /admin/orders/{id}                               get, update
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/custom-order-requests", custom_orders::requests_router())
        .nest("/custom-order-quotes", custom_orders::quotes_router())
        .nest("/admin", admin::router())
}
