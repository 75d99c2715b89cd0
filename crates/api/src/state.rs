use std::sync::Arc;

use footprint_events::Notifier;
use footprint_quotes::QuoteService;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: inner data is behind `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: footprint_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Custom-order quote lifecycle.
    pub quotes: QuoteService,
    /// Email delivery for order updates sent outside the quote service.
    pub notifier: Arc<dyn Notifier>,
}
