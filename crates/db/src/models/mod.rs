//! Row structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A create DTO for inserts
//! - An update DTO (all `Option` fields) for patches

pub mod admin_user;
pub mod custom_order_quote;
pub mod custom_order_request;
pub mod order;
pub mod quote_token;
