#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE};
use axum::http::{Method, Request, Response};
use axum::Router;
use chrono::{Duration, Utc};
use footprint_api::auth::jwt::{generate_access_token, JwtConfig};
use footprint_api::auth::password::hash_password;
use footprint_api::config::ServerConfig;
use footprint_api::router::build_app_router;
use footprint_api::state::AppState;
use footprint_core::hashing::hash_access_token;
use footprint_core::quote_lifecycle::LifecycleSettings;
use footprint_core::types::DbId;
use footprint_db::models::admin_user::CreateAdminUser;
use footprint_db::models::quote_token::CreateQuoteToken;
use footprint_db::repositories::{AdminUserRepo, QuoteTokenRepo};
use footprint_events::LogNotifier;
use footprint_quotes::{
    GatewayError, InitializePayment, PaymentGateway, PaymentSession, PgQuoteStore, QuoteService,
    VerifiedTransaction,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;

pub const BASE_URL: &str = "https://shop.example";
pub const CRON_SECRET: &str = "cron-test-secret";
pub const ADMIN_EMAIL: &str = "ops@dfootprint.example";
pub const ADMIN_PASSWORD: &str = "tan-loafers-size-43";

/// Test `ServerConfig` with custom orders switched on.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        public_base_url: BASE_URL.to_string(),
        custom_orders_enabled: true,
        cron_secret: Some(CRON_SECRET.to_string()),
        session_cookie_secure: false,
        paystack_secret_key: Some("sk_test".to_string()),
        paystack_base_url: "https://paystack.invalid".to_string(),
        admin_notification_emails: vec![ADMIN_EMAIL.to_string()],
        lifecycle: LifecycleSettings::default(),
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 60,
        },
    }
}

// ---------------------------------------------------------------------------
// Gateway stub
// ---------------------------------------------------------------------------

/// Gateway that opens checkouts with sequential references and answers
/// verification from whatever transaction was last scripted.
#[derive(Default)]
pub struct StubGateway {
    transaction: Mutex<Option<VerifiedTransaction>>,
    initialized: Mutex<Vec<InitializePayment>>,
}

impl StubGateway {
    /// Script a successful payment of `amount` minor units.
    pub fn pay(&self, amount: i64, quote_id: DbId, request_id: DbId) {
        *self.transaction.lock().unwrap() = Some(VerifiedTransaction {
            status: "success".to_string(),
            amount: Some(amount),
            metadata: json!({
                "custom_quote_id": quote_id,
                "custom_request_id": request_id,
            }),
        });
    }

    pub fn initialized(&self) -> Vec<InitializePayment> {
        self.initialized.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for StubGateway {
    async fn initialize(&self, input: &InitializePayment) -> Result<PaymentSession, GatewayError> {
        let mut calls = self.initialized.lock().unwrap();
        calls.push(input.clone());
        let n = calls.len();
        Ok(PaymentSession {
            authorization_url: format!("https://checkout.example/{n}"),
            reference: format!("ref_{n}"),
        })
    }

    async fn verify(&self, reference: &str) -> Result<VerifiedTransaction, GatewayError> {
        self.transaction
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| GatewayError::Rejected(format!("Unknown reference {reference}")))
    }
}

// ---------------------------------------------------------------------------
// App builders
// ---------------------------------------------------------------------------

/// Full application router over `pool`, with emails logged and a stub gateway.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, test_config(), Arc::new(StubGateway::default()))
}

pub fn build_test_app_with(pool: PgPool, config: ServerConfig, gateway: Arc<StubGateway>) -> Router {
    let notifier = Arc::new(LogNotifier);
    let quotes = QuoteService::new(
        Arc::new(PgQuoteStore::new(pool.clone())),
        notifier.clone(),
        gateway,
        config.service_config(),
    );
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        quotes,
        notifier,
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Create an admin account and return a bearer token for it.
pub async fn admin_token(pool: &PgPool) -> String {
    let user = AdminUserRepo::create(
        pool,
        &CreateAdminUser {
            email: ADMIN_EMAIL.to_string(),
            name: "Ops".to_string(),
            password_hash: hash_password(ADMIN_PASSWORD).unwrap(),
            role: "admin".to_string(),
        },
    )
    .await
    .unwrap();
    generate_access_token(user.id, &user.email, &user.role, &test_config().jwt).unwrap()
}

/// Persist a known access token for `quote_id` and return its plaintext.
pub async fn issue_token(pool: &PgPool, quote_id: DbId, email: &str) -> String {
    let token = format!("test-token-{quote_id}");
    QuoteTokenRepo::create(
        pool,
        &CreateQuoteToken {
            quote_id,
            email: email.to_string(),
            token_hash: hash_access_token(&token),
            expires_at: Utc::now() + Duration::days(7),
        },
    )
    .await
    .unwrap();
    token
}

pub fn request_body() -> Value {
    json!({
        "customerName": "Ada Obi",
        "email": "  Ada@Example.com ",
        "phone": "+2348000000000",
        "title": "Tan loafers",
        "description": "Hand-stitched, size 43",
        "referenceImages": ["https://img.example/1.jpg"],
    })
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn get_with_cookie(app: Router, uri: &str, cookie: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header(COOKIE, cookie)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    json_request(app, Method::POST, uri, body, None).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    json_request(app, Method::POST, uri, body, Some(token)).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    json_request(app, Method::PUT, uri, body, Some(token)).await
}

async fn json_request(
    app: Router,
    method: Method,
    uri: &str,
    body: Value,
    token: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    send(app, builder.body(Body::from(body.to_string())).unwrap()).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// The `name=value` part of the response's `Set-Cookie` header.
pub fn set_cookie_pair(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(axum::http::header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}
