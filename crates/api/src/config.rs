use footprint_core::quote_lifecycle::LifecycleSettings;
use footprint_quotes::gateway::DEFAULT_PAYSTACK_BASE_URL;
use footprint_quotes::ServiceConfig;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development except the JWT
/// secret. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Public storefront origin, used for email links and the payment callback.
    pub public_base_url: String,
    /// Custom orders master switch.
    pub custom_orders_enabled: bool,
    /// Shared secret expected in `x-cron-secret`. Unset rejects every cron call.
    pub cron_secret: Option<String>,
    /// Add the `Secure` attribute to the checkout session cookie.
    pub session_cookie_secure: bool,
    /// Paystack bearer key. Unset makes checkout fail with a 500.
    pub paystack_secret_key: Option<String>,
    pub paystack_base_url: String,
    /// Recipients of admin alerts.
    pub admin_notification_emails: Vec<String>,
    /// Quote lifecycle cron tunables.
    pub lifecycle: LifecycleSettings,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
}

/// Read an optional variable, treating blank values as unset.
fn optional_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Split a comma-separated list, dropping blanks.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn flag(name: &str) -> bool {
    optional_var(name).is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                         | Default                    |
    /// |---------------------------------|----------------------------|
    /// | `HOST`                          | `0.0.0.0`                  |
    /// | `PORT`                          | `3000`                     |
    /// | `CORS_ORIGINS`                  | `http://localhost:3000`    |
    /// | `REQUEST_TIMEOUT_SECS`          | `30`                       |
    /// | `PUBLIC_BASE_URL`               | `http://localhost:3000`    |
    /// | `CUSTOM_ORDER_REQUESTS_ENABLED` | `false`                    |
    /// | `CRON_SECRET`                   | unset                      |
    /// | `SESSION_COOKIE_SECURE`         | `false`                    |
    /// | `PAYSTACK_SECRET_KEY`           | unset                      |
    /// | `PAYSTACK_BASE_URL`             | `https://api.paystack.co`  |
    /// | `ADMIN_NOTIFICATION_EMAILS`     | unset                      |
    ///
    /// The lifecycle tunables are read by [`lifecycle_settings_from_env`] and
    /// the JWT settings by [`JwtConfig::from_env`].
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins = split_list(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:3000".into()),
        );

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let public_base_url = optional_var("PUBLIC_BASE_URL")
            .unwrap_or_else(|| "http://localhost:3000".into())
            .trim_end_matches('/')
            .to_string();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            public_base_url,
            custom_orders_enabled: flag("CUSTOM_ORDER_REQUESTS_ENABLED"),
            cron_secret: optional_var("CRON_SECRET"),
            session_cookie_secure: flag("SESSION_COOKIE_SECURE"),
            paystack_secret_key: optional_var("PAYSTACK_SECRET_KEY"),
            paystack_base_url: optional_var("PAYSTACK_BASE_URL")
                .unwrap_or_else(|| DEFAULT_PAYSTACK_BASE_URL.into()),
            admin_notification_emails: optional_var("ADMIN_NOTIFICATION_EMAILS")
                .map(|raw| split_list(&raw))
                .unwrap_or_default(),
            lifecycle: lifecycle_settings_from_env(),
            jwt: JwtConfig::from_env(),
        }
    }

    /// Settings handed to the quote service.
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            public_base_url: self.public_base_url.clone(),
            admin_emails: self.admin_notification_emails.clone(),
            feature_enabled: self.custom_orders_enabled,
        }
    }
}

/// Load the quote lifecycle cron tunables.
///
/// | Env Var                                        | Default |
/// |------------------------------------------------|---------|
/// | `CUSTOM_ORDER_QUOTE_REMINDER_THRESHOLDS_HOURS` | `24,2`  |
/// | `CUSTOM_ORDER_QUOTE_AUTO_CANCEL_AFTER_HOURS`   | `0`     |
/// | `CUSTOM_ORDER_QUOTE_CLEANUP_AFTER_DAYS`        | `30`    |
/// | `CUSTOM_ORDER_QUOTE_CRON_BATCH_SIZE`           | `100`   |
pub fn lifecycle_settings_from_env() -> LifecycleSettings {
    let var = |name: &str| std::env::var(name).ok();
    LifecycleSettings::from_raw(
        var("CUSTOM_ORDER_QUOTE_REMINDER_THRESHOLDS_HOURS").as_deref(),
        var("CUSTOM_ORDER_QUOTE_AUTO_CANCEL_AFTER_HOURS").as_deref(),
        var("CUSTOM_ORDER_QUOTE_CLEANUP_AFTER_DAYS").as_deref(),
        var("CUSTOM_ORDER_QUOTE_CRON_BATCH_SIZE").as_deref(),
    )
}
