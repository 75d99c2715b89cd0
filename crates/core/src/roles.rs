//! Role names carried in admin access tokens.

/// Full back-office access.
pub const ROLE_ADMIN: &str = "admin";
