//! Feature gate for the custom-order endpoints.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::state::AppState;

/// Succeeds only when `CUSTOM_ORDER_REQUESTS_ENABLED` is on. Otherwise the
/// endpoint answers 404 as if it did not exist.
pub struct CustomOrdersEnabled;

impl FromRequestParts<AppState> for CustomOrdersEnabled {
    type Rejection = AppError;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if state.config.custom_orders_enabled {
            Ok(CustomOrdersEnabled)
        } else {
            Err(AppError::NotFound("Not found".into()))
        }
    }
}
