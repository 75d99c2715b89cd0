//! HTTP-level tests for admin login and order management.

mod common;

use axum::http::StatusCode;
use chrono::{DateTime, Duration, TimeZone, Utc};
use common::{
    admin_token, body_json, build_test_app, get, get_auth, post_json, put_json_auth, test_config,
    ADMIN_EMAIL, ADMIN_PASSWORD,
};
use footprint_api::auth::jwt::generate_access_token;
use footprint_api::auth::password::hash_password;
use footprint_db::models::admin_user::CreateAdminUser;
use footprint_db::repositories::AdminUserRepo;
use serde_json::json;
use sqlx::PgPool;

/// Insert a custom order shipping to `state`, created at a fixed instant.
async fn seed_order(pool: &PgPool, state: &str) -> (i64, DateTime<Utc>) {
    let created = Utc.with_ymd_and_hms(2026, 5, 1, 10, 0, 0).unwrap();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO orders (order_number, email, customer_name, shipping_address,
                             status, total_amount, order_type, created_at)
         VALUES ('ORD-1-TESTING', 'ada@example.com', 'Ada Obi', $1,
                 'processing', 50000, 'custom', $2)
         RETURNING id",
    )
    .bind(json!({ "state": state, "city": "Ikeja" }))
    .bind(created)
    .fetch_one(pool)
    .await
    .unwrap();
    (id, created)
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_returns_a_usable_token(pool: PgPool) {
    admin_token(&pool).await;

    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/auth/login",
        json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["user"]["email"], ADMIN_EMAIL);
    assert_eq!(json["data"]["expires_in"], 3600);
    assert!(json["data"]["user"].get("password_hash").is_none());

    let token = json["data"]["access_token"].as_str().unwrap().to_string();
    let response = get_auth(
        build_test_app(pool.clone()),
        "/api/v1/admin/custom-order-requests",
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let user = AdminUserRepo::find_by_email(&pool, ADMIN_EMAIL)
        .await
        .unwrap()
        .unwrap();
    assert!(user.last_login_at.is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_rejects_bad_credentials(pool: PgPool) {
    admin_token(&pool).await;

    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/auth/login",
        json!({ "email": ADMIN_EMAIL, "password": "wrong" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "Invalid email or password");

    let response = post_json(
        build_test_app(pool),
        "/api/v1/auth/login",
        json!({ "email": "nobody@example.com", "password": ADMIN_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deactivated_account_cannot_log_in(pool: PgPool) {
    admin_token(&pool).await;
    sqlx::query("UPDATE admin_users SET is_active = FALSE WHERE email = $1")
        .bind(ADMIN_EMAIL)
        .execute(&pool)
        .await
        .unwrap();

    let response = post_json(
        build_test_app(pool),
        "/api/v1/auth/login",
        json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn non_admin_role_is_forbidden(pool: PgPool) {
    let user = AdminUserRepo::create(
        &pool,
        &CreateAdminUser {
            email: "viewer@dfootprint.example".to_string(),
            name: "Viewer".to_string(),
            password_hash: hash_password("viewer-password").unwrap(),
            role: "viewer".to_string(),
        },
    )
    .await
    .unwrap();
    let token = generate_access_token(user.id, &user.email, &user.role, &test_config().jwt).unwrap();

    let response = get_auth(build_test_app(pool), "/api/v1/admin/orders/1", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["error"], "Admin role required");
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn get_order_includes_items(pool: PgPool) {
    let token = admin_token(&pool).await;
    let (id, _) = seed_order(&pool, "Lagos").await;

    let response = get_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/admin/orders/{id}"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["order_number"], "ORD-1-TESTING");
    assert_eq!(json["data"]["items"], json!([]));

    let response = get_auth(build_test_app(pool), "/api/v1/admin/orders/999999", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn dispatch_sets_arrival_from_creation_time(pool: PgPool) {
    let token = admin_token(&pool).await;
    let (id, created) = seed_order(&pool, "lagos").await;

    let response = put_json_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/admin/orders/{id}"),
        json!({ "deliveryStatus": "dispatch", "trackingNumber": "GIG-123", "acknowledge": true }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["delivery_status"], "dispatch");
    assert_eq!(json["data"]["tracking_number"], "GIG-123");
    assert_eq!(json["data"]["acknowledged_by"], ADMIN_EMAIL);

    let arrival: DateTime<Utc> = json["data"]["estimated_arrival"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();
    assert_eq!(arrival, created + Duration::days(1));

    // Pausing clears the estimate; the first acknowledgement sticks.
    let response = put_json_auth(
        build_test_app(pool),
        &format!("/api/v1/admin/orders/{id}"),
        json!({ "deliveryStatus": "paused", "acknowledge": true }),
        &token,
    )
    .await;
    let json = body_json(response).await;
    assert!(json["data"]["estimated_arrival"].is_null());
    assert_eq!(json["data"]["acknowledged_by"], ADMIN_EMAIL);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn other_states_get_the_slower_schedule(pool: PgPool) {
    let token = admin_token(&pool).await;
    let (id, created) = seed_order(&pool, "Abuja").await;

    let response = put_json_auth(
        build_test_app(pool),
        &format!("/api/v1/admin/orders/{id}"),
        json!({ "deliveryStatus": "sorting" }),
        &token,
    )
    .await;
    let json = body_json(response).await;
    let arrival: DateTime<Utc> = json["data"]["estimated_arrival"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();
    assert_eq!(arrival, created + Duration::days(5));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_delivery_status_is_rejected(pool: PgPool) {
    let token = admin_token(&pool).await;
    let (id, _) = seed_order(&pool, "Lagos").await;

    let response = put_json_auth(
        build_test_app(pool),
        &format!("/api/v1/admin/orders/{id}"),
        json!({ "deliveryStatus": "teleported" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn health_reports_database(pool: PgPool) {
    let response = get(build_test_app(pool), "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["db_healthy"], true);
}
