pub mod admin_custom_orders;
pub mod admin_orders;
pub mod auth;
pub mod custom_order_quotes;
pub mod custom_order_requests;
