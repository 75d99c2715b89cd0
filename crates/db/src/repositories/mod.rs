//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod admin_user_repo;
pub mod custom_order_quote_repo;
pub mod custom_order_request_repo;
pub mod order_repo;
pub mod quote_token_repo;

pub use admin_user_repo::AdminUserRepo;
pub use custom_order_quote_repo::CustomOrderQuoteRepo;
pub use custom_order_request_repo::CustomOrderRequestRepo;
pub use order_repo::OrderRepo;
pub use quote_token_repo::QuoteTokenRepo;
