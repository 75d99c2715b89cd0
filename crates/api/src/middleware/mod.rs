//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the signed-in admin account from a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- Requires the `admin` role.
//! - [`feature::CustomOrdersEnabled`] -- 404s when custom orders are switched off.

pub mod auth;
pub mod feature;
pub mod rbac;
