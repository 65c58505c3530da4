#![allow(dead_code)]

use std::str::FromStr;

use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tower::util::ServiceExt;

use qrpass_backend::{
    app::build_app,
    config::Config,
    db::connection::DbPool,
    models::member::{CreateMemberRequest, Member, MembershipType},
    repositories::{admin as admin_repo, member as member_repo},
    state::AppState,
    utils::password::hash_password,
};

pub const TEST_SESSION_SECRET: &str = "test-session-secret";
pub const TEST_QR_SECRET: &str = "test-qr-secret";
pub const TEST_ADMIN_PASSWORD: &str = "admin123";

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        port: 0,
        session_secret: TEST_SESSION_SECRET.to_string(),
        qr_token_secret: TEST_QR_SECRET.to_string(),
        session_expiration_hours: 1,
        qr_token_expiration_days: 30,
        public_base_url: "http://qrpass.test/".to_string(),
        secure_cookies: false,
        default_admin_username: "admin".to_string(),
        default_admin_password: TEST_ADMIN_PASSWORD.to_string(),
        default_member_password: "123456".to_string(),
        // Disables the governor layer so oneshot requests need no peer address
        rate_limit_burst: 0,
        rate_limit_window_seconds: 60,
    }
}

/// In-memory SQLite constrained to one connection so every query sees the
/// same database.
pub async fn test_pool() -> DbPool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("options")
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("open in-memory database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("run migrations");
    pool
}

pub async fn test_state() -> AppState {
    AppState::new(test_pool().await, test_config())
}

pub async fn test_app() -> (Router, AppState) {
    let state = test_state().await;
    let hash = hash_password(TEST_ADMIN_PASSWORD).expect("hash admin password");
    admin_repo::ensure_admin(&state.pool, "admin", &hash)
        .await
        .expect("seed admin");
    (build_app(state.clone()), state)
}

pub fn member_payload(member_id: &str, name: &str) -> CreateMemberRequest {
    CreateMemberRequest {
        member_id: member_id.to_string(),
        name: name.to_string(),
        date_of_birth: None,
        address: None,
        blood_group: None,
        phone: None,
        image_url: None,
        membership_type: MembershipType::Annual,
        joined_on: None,
        password: None,
    }
}

pub async fn seed_member(state: &AppState, member_id: &str, name: &str, password: &str) -> Member {
    let hash = hash_password(password).expect("hash password");
    let member = Member::new(member_payload(member_id, name), hash);
    member_repo::insert(&state.pool, &member)
        .await
        .expect("insert member");
    member
}

pub async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
    cookie: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };

    app.clone().oneshot(request).await.expect("response")
}

pub async fn response_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("json body")
}

/// Pulls the `qrpass_session=...` pair out of a Set-Cookie header.
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|raw| raw.split(';').next())
        .map(|pair| pair.trim().to_string())
}

pub async fn login_member(app: &Router, member_id: &str, password: &str) -> String {
    let response = send_json(
        app,
        "POST",
        "/api/auth/login",
        Some(serde_json::json!({"member_id": member_id, "password": password})),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK, "member login must succeed");
    session_cookie(&response).expect("session cookie")
}

pub async fn login_admin(app: &Router) -> String {
    let response = send_json(
        app,
        "POST",
        "/api/admin/auth/login",
        Some(serde_json::json!({"username": "admin", "password": TEST_ADMIN_PASSWORD})),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK, "admin login must succeed");
    session_cookie(&response).expect("session cookie")
}
