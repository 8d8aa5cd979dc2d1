//! Integration tests for API endpoints.
//!
//! Requests go through the full router (extractors, middleware, error
//! mapping) with the user store held in memory.

mod common;

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use common::TestApp;

// =============================================================================
// Registration
// =============================================================================

#[tokio::test]
async fn test_register_creates_exactly_one_user() {
    let app = TestApp::new();

    let (status, body) = app
        .post(
            "/auth/register",
            json!({ "email": "new@Example.COM", "password": "SecurePass123!", "name": "New User" }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(app.users.count(), 1);
    assert_eq!(body["email"], "new@example.com");
    assert_eq!(body["name"], "New User");
    assert_eq!(body["is_active"], true);
    assert!(body["id"].as_str().unwrap().parse::<Uuid>().is_ok());
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_missing_field_creates_nothing() {
    let app = TestApp::new();

    let (status, body) = app
        .post(
            "/auth/register",
            json!({ "email": "new@example.com", "name": "No Password" }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(app.users.count(), 0);
}

#[tokio::test]
async fn test_register_invalid_fields_create_nothing() {
    let app = TestApp::new();

    for payload in [
        json!({ "email": "not-an-email", "password": "SecurePass123!", "name": "A" }),
        json!({ "email": "a@example.com", "password": "short", "name": "A" }),
        json!({ "email": "a@example.com", "password": "SecurePass123!", "name": "" }),
    ] {
        let (status, body) = app.post("/auth/register", payload.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload {}", payload);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    assert_eq!(app.users.count(), 0);
}

#[tokio::test]
async fn test_register_whitespace_name_creates_nothing() {
    let app = TestApp::new();

    let (status, body) = app
        .post(
            "/auth/register",
            json!({ "email": "blank@example.com", "password": "SecurePass123!", "name": "   " }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(app.users.count(), 0);
}

#[tokio::test]
async fn test_register_overlong_email_is_validation_error() {
    let app = TestApp::new();
    let email = format!(
        "{}@{}.{}.{}.com",
        "a".repeat(64),
        "b".repeat(63),
        "c".repeat(63),
        "d".repeat(63)
    );

    let (status, body) = app
        .post(
            "/auth/register",
            json!({ "email": email, "password": "SecurePass123!", "name": "Long" }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(app.users.count(), 0);
}

#[tokio::test]
async fn test_register_stores_trimmed_name() {
    let app = TestApp::new();

    let (status, body) = app
        .post(
            "/auth/register",
            json!({ "email": "trim@example.com", "password": "SecurePass123!", "name": "  Ann  " }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Ann");
}

#[tokio::test]
async fn test_register_duplicate_email_conflicts() {
    let app = TestApp::new();
    let payload = json!({ "email": "dup@example.com", "password": "SecurePass123!", "name": "Dup" });

    let (status, _) = app.post("/auth/register", payload.clone()).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.post("/auth/register", payload).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");
    assert_eq!(app.users.count(), 1);
}

// =============================================================================
// User Detail
// =============================================================================

#[tokio::test]
async fn test_detail_returns_user_representation() {
    let app = TestApp::new();
    let (viewer_id, tokens) = app.signup("viewer@example.com", "SecurePass123!").await;
    let token = tokens["access_token"].as_str().unwrap();

    // Any authenticated caller may read any user
    let (other_id, _) = app.signup("other@example.com", "SecurePass123!").await;

    let (status, body) = app.get(&format!("/users/{}", other_id), Some(token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], other_id.to_string());
    assert_eq!(body["email"], "other@example.com");

    let (status, body) = app.get(&format!("/users/{}", viewer_id), Some(token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "viewer@example.com");
}

#[tokio::test]
async fn test_detail_unknown_id_is_not_found() {
    let app = TestApp::new();
    let (_, tokens) = app.signup("viewer@example.com", "SecurePass123!").await;
    let token = tokens["access_token"].as_str().unwrap();

    let (status, body) = app
        .get(&format!("/users/{}", Uuid::new_v4()), Some(token))
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_detail_malformed_id_is_bad_request() {
    let app = TestApp::new();
    let (_, tokens) = app.signup("viewer@example.com", "SecurePass123!").await;
    let token = tokens["access_token"].as_str().unwrap();

    let (status, body) = app.get("/users/not-a-uuid", Some(token)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_detail_shows_inactive_users() {
    let app = TestApp::new();
    let (_, tokens) = app.signup("viewer@example.com", "SecurePass123!").await;
    let (other_id, _) = app.signup("off@example.com", "SecurePass123!").await;
    app.users.deactivate(other_id);

    let (status, body) = app
        .get(
            &format!("/users/{}", other_id),
            tokens["access_token"].as_str(),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_active"], false);
}

#[tokio::test]
async fn test_detail_requires_bearer_token() {
    let app = TestApp::new();
    let (id, _) = app.signup("viewer@example.com", "SecurePass123!").await;

    let (status, body) = app.get(&format!("/users/{}", id), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    let (status, body) = app.get(&format!("/users/{}", id), Some("garbage")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "AUTH_ERROR");
}

#[tokio::test]
async fn test_refresh_token_is_not_an_access_token() {
    let app = TestApp::new();
    let (id, tokens) = app.signup("viewer@example.com", "SecurePass123!").await;

    let (status, _) = app
        .get(&format!("/users/{}", id), tokens["refresh_token"].as_str())
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Current User
// =============================================================================

#[tokio::test]
async fn test_me_returns_caller() {
    let app = TestApp::new();
    let (id, tokens) = app.signup("me@example.com", "SecurePass123!").await;

    let (status, body) = app.get("/users/me", tokens["access_token"].as_str()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id.to_string());
}

// =============================================================================
// Login & Refresh
// =============================================================================

#[tokio::test]
async fn test_login_wrong_password() {
    let app = TestApp::new();
    app.signup("login@example.com", "SecurePass123!").await;

    let (status, body) = app
        .post(
            "/auth/login",
            json!({ "email": "login@example.com", "password": "WrongPass123!" }),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_login_inactive_user_rejected() {
    let app = TestApp::new();
    let (id, _) = app.signup("off@example.com", "SecurePass123!").await;
    app.users.deactivate(id);

    let (status, _) = app
        .post(
            "/auth/login",
            json!({ "email": "off@example.com", "password": "SecurePass123!" }),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_response_shape() {
    let app = TestApp::new();
    let (_, tokens) = app.signup("shape@example.com", "SecurePass123!").await;

    assert_eq!(tokens["token_type"], "Bearer");
    assert_eq!(tokens["expires_in"], 24 * 3600);
    assert!(tokens["access_token"].is_string());
    assert!(tokens["refresh_token"].is_string());
}

#[tokio::test]
async fn test_refresh_flow() {
    let app = TestApp::new();
    let (id, tokens) = app.signup("refresh@example.com", "SecurePass123!").await;

    let (status, body) = app
        .post(
            "/auth/refresh",
            json!({ "refresh_token": tokens["refresh_token"] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("refresh_token").is_none());

    let (status, user) = app
        .get(&format!("/users/{}", id), body["access_token"].as_str())
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["email"], "refresh@example.com");

    // Access tokens cannot be used to refresh
    let (status, _) = app
        .post(
            "/auth/refresh",
            json!({ "refresh_token": tokens["access_token"] }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Health & Docs
// =============================================================================

#[tokio::test]
async fn test_root_endpoint() {
    let app = TestApp::new();
    let (status, _) = app.get("/", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_health_reports_database_and_disabled_cache() {
    let app = TestApp::with_database_pings(1);

    let (status, body) = app.get("/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["services"]["database"]["status"], "healthy");
    assert_eq!(body["services"]["redis"]["status"], "disabled");
}

#[tokio::test]
async fn test_health_degraded_when_database_fails() {
    let app = TestApp::with_database_pings(0);

    let (status, body) = app.get("/health", None).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["services"]["database"]["status"], "unhealthy");
}

#[tokio::test]
async fn test_openapi_document_served() {
    let app = TestApp::new();

    let (status, body) = app.get("/api-docs/openapi.json", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/auth/register"].is_object());
    assert!(body["paths"]["/users/{id}"].is_object());
}
