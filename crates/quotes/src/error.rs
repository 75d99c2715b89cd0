//! Error types for the quote lifecycle.

/// Failure inside a [`QuoteStore`](crate::QuoteStore) implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Another writer claimed the same quote version first.
    #[error("Duplicate quote version")]
    DuplicateVersion,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Error returned by [`QuoteService`](crate::QuoteService) operations.
///
/// The HTTP layer maps each variant onto a status code; messages of the
/// client-facing variants are shown to the caller verbatim.
#[derive(Debug, thiserror::Error)]
pub enum QuoteError {
    /// Invalid input (400).
    #[error("{0}")]
    Validation(String),

    /// Missing quote, request or order (404).
    #[error("{0}")]
    NotFound(String),

    /// Bad or expired access token (401).
    #[error("{0}")]
    Unauthorized(String),

    /// Lost a version race; the caller should retry (409).
    #[error("Duplicate quote version, please retry.")]
    DuplicateVersion,

    #[error("Payment gateway error: {0}")]
    Gateway(#[from] crate::gateway::GatewayError),

    #[error("Store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for QuoteError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateVersion => QuoteError::DuplicateVersion,
            other => QuoteError::Store(other),
        }
    }
}
