//! Domain rules for the D'Footprint back office.
//!
//! This crate has zero internal dependencies so the same rules can be used
//! by the repository layer, the quote lifecycle services and the HTTP API.

#[macro_use]
pub mod status;

pub mod custom_order;
pub mod delivery;
pub mod error;
pub mod hashing;
pub mod money;
pub mod quote_lifecycle;
pub mod roles;
pub mod types;
