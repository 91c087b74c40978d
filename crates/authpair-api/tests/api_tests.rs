//! API Integration Tests
//!
//! Runs against the in-memory credential store; no external services needed.
//!
//! Author: hephaex@gmail.com

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use authpair_api::{create_router, create_router_for_testing, test_state};
use serde_json::{json, Value};
use tower::ServiceExt;

/// Helper to create a test request
fn create_json_request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");

    match body {
        Some(json_body) => builder
            .body(Body::from(serde_json::to_string(&json_body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Send a request and decode the JSON body (Null when empty)
async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

async fn register(app: &Router, email: &str, password: &str, name: &str) -> (StatusCode, Value) {
    send(
        app,
        create_json_request(
            "POST",
            "/auth/register",
            Some(json!({ "email": email, "password": password, "name": name })),
        ),
    )
    .await
}

async fn login(app: &Router, email: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        create_json_request(
            "POST",
            "/auth/login",
            Some(json!({ "email": email, "password": password })),
        ),
    )
    .await
}

fn profile_request(access_token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri("/auth/profile")
        .header("Authorization", format!("Bearer {access_token}"))
        .body(Body::empty())
        .unwrap()
}

// =============================================================================
// Health Check Tests
// =============================================================================

#[tokio::test]
async fn test_health_check() {
    let app = create_router_for_testing();

    let (status, json) = send(
        &app,
        Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["store"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_openapi_document_served() {
    let app = create_router_for_testing();

    let (status, json) = send(
        &app,
        Request::builder()
            .uri("/api-docs/openapi.json")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["paths"]["/auth/login"].is_object());
}

// =============================================================================
// Registration Tests
// =============================================================================

#[tokio::test]
async fn test_register_returns_token_pair() {
    let app = create_router_for_testing();

    let (status, json) = register(&app, "a@x.com", "secret1", "Ann").await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(json["access_token"].as_str().is_some_and(|t| !t.is_empty()));
    assert!(json["refresh_token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(json["user"]["email"], "a@x.com");
    assert_eq!(json["user"]["name"], "Ann");
    assert!(json["user"]["id"].is_string());
    assert!(json["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_duplicate_email_conflicts() {
    let app = create_router_for_testing();

    let (status, _) = register(&app, "a@x.com", "secret1", "Ann").await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, json) = register(&app, "a@x.com", "another1", "Other").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["message"], "User already exists");
}

#[tokio::test]
async fn test_register_invalid_input_rejected() {
    let app = create_router_for_testing();

    let (status, json) = register(&app, "not-an-email", "12345", "").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_register_missing_fields_rejected() {
    let app = create_router_for_testing();

    let (status, json) = send(
        &app,
        create_json_request(
            "POST",
            "/auth/register",
            Some(json!({ "email": "a@x.com" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
    assert!(json["details"].is_string());
}

#[tokio::test]
async fn test_register_malformed_json_rejected() {
    let app = create_router_for_testing();

    let request = Request::builder()
        .method("POST")
        .uri("/auth/register")
        .header("Content-Type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, json) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
}

// =============================================================================
// Login Tests
// =============================================================================

#[tokio::test]
async fn test_login_success() {
    let app = create_router_for_testing();
    register(&app, "a@x.com", "secret1", "Ann").await;

    let (status, json) = login(&app, "a@x.com", "secret1").await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["access_token"].is_string());
    assert!(json["refresh_token"].is_string());
    assert_eq!(json["user"]["email"], "a@x.com");
}

#[tokio::test]
async fn test_login_wrong_password_and_unknown_email_look_alike() {
    let app = create_router_for_testing();
    register(&app, "a@x.com", "secret1", "Ann").await;

    let (wrong_status, wrong_json) = login(&app, "a@x.com", "wrong-password").await;
    let (unknown_status, unknown_json) = login(&app, "nobody@x.com", "secret1").await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_json["message"], "Invalid credentials");
    assert_eq!(wrong_json, unknown_json);
}

// =============================================================================
// Refresh / Logout Tests
// =============================================================================

#[tokio::test]
async fn test_refresh_issues_usable_access_token() {
    let app = create_router_for_testing();
    let (_, registered) = register(&app, "a@x.com", "secret1", "Ann").await;
    let refresh_token = registered["refresh_token"].as_str().unwrap();

    let (status, json) = send(
        &app,
        create_json_request(
            "POST",
            "/auth/refresh",
            Some(json!({ "refresh_token": refresh_token })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let access_token = json["access_token"].as_str().unwrap();

    let (status, profile) = send(&app, profile_request(access_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["email"], "a@x.com");
}

#[tokio::test]
async fn test_refresh_with_unknown_token_rejected() {
    let app = create_router_for_testing();

    let (status, _) = send(
        &app,
        create_json_request(
            "POST",
            "/auth/refresh",
            Some(json!({ "refresh_token": "not-a-token" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_with_empty_token_rejected() {
    let app = create_router_for_testing();

    let (status, _) = send(
        &app,
        create_json_request("POST", "/auth/refresh", Some(json!({ "refresh_token": "" }))),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_without_token_field_unauthorized() {
    let app = create_router_for_testing();

    let (status, json) = send(
        &app,
        create_json_request("POST", "/auth/refresh", Some(json!({}))),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_refresh_without_body_unauthorized() {
    let app = create_router_for_testing();

    let request = Request::builder()
        .method("POST")
        .uri("/auth/refresh")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_without_body_succeeds() {
    let app = create_router_for_testing();

    let request = Request::builder()
        .method("POST")
        .uri("/auth/logout")
        .body(Body::empty())
        .unwrap();
    let (status, json) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Logged out successfully");

    let (status, _) = send(&app, create_json_request("POST", "/auth/logout", None)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_logout_revokes_refresh_token() {
    let app = create_router_for_testing();
    let (_, registered) = register(&app, "a@x.com", "secret1", "Ann").await;
    let refresh_token = registered["refresh_token"].as_str().unwrap().to_string();

    let (status, json) = send(
        &app,
        create_json_request(
            "POST",
            "/auth/logout",
            Some(json!({ "refresh_token": refresh_token })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Logged out successfully");

    let (status, _) = send(
        &app,
        create_json_request(
            "POST",
            "/auth/refresh",
            Some(json!({ "refresh_token": refresh_token })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_is_idempotent() {
    let app = create_router_for_testing();

    for body in [json!({ "refresh_token": "never-issued" }), json!({})] {
        let (status, _) = send(&app, create_json_request("POST", "/auth/logout", Some(body))).await;
        assert_eq!(status, StatusCode::OK);
    }
}

#[tokio::test]
async fn test_logout_leaves_other_sessions_alive() {
    let app = create_router_for_testing();
    let (_, first) = register(&app, "a@x.com", "secret1", "Ann").await;
    let (_, second) = login(&app, "a@x.com", "secret1").await;

    send(
        &app,
        create_json_request(
            "POST",
            "/auth/logout",
            Some(json!({ "refresh_token": first["refresh_token"] })),
        ),
    )
    .await;

    let (status, _) = send(
        &app,
        create_json_request(
            "POST",
            "/auth/refresh",
            Some(json!({ "refresh_token": second["refresh_token"] })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

// =============================================================================
// Profile Tests
// =============================================================================

#[tokio::test]
async fn test_profile_requires_bearer_token() {
    let app = create_router_for_testing();

    let (status, json) = send(
        &app,
        Request::builder()
            .uri("/auth/profile")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(json["message"].is_string());
}

#[tokio::test]
async fn test_profile_rejects_malformed_token() {
    let app = create_router_for_testing();

    let (status, _) = send(&app, profile_request("garbage")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_profile_rejects_token_signed_with_other_secret() {
    let app = create_router(test_state());

    let mut other = authpair_core::AppConfig::default();
    other.auth.jwt_secret = "a-completely-different-secret".to_string();
    let foreign = authpair_api::auth::TokenService::new(&other.auth)
        .issue_access_token(uuid::Uuid::new_v4(), "a@x.com")
        .unwrap();

    let (status, _) = send(&app, profile_request(&foreign)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_profile_returns_current_user() {
    let app = create_router_for_testing();
    let (_, registered) = register(&app, "a@x.com", "secret1", "Ann").await;
    let access_token = registered["access_token"].as_str().unwrap();

    let (status, json) = send(&app, profile_request(access_token)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["email"], "a@x.com");
    assert_eq!(json["name"], "Ann");
    assert_eq!(json["id"], registered["user"]["id"]);
}

#[tokio::test]
async fn test_full_session_scenario() {
    let app = create_router_for_testing();

    let (status, registered) = register(&app, "a@x.com", "secret1", "Ann").await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = register(&app, "a@x.com", "secret1", "Ann").await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, logged_in) = login(&app, "a@x.com", "secret1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(logged_in["user"]["id"], registered["user"]["id"]);

    let (status, _) = send(
        &app,
        profile_request(logged_in["access_token"].as_str().unwrap()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        create_json_request(
            "POST",
            "/auth/logout",
            Some(json!({ "refresh_token": logged_in["refresh_token"] })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        create_json_request(
            "POST",
            "/auth/refresh",
            Some(json!({ "refresh_token": logged_in["refresh_token"] })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_profile_rejects_refresh_token_as_bearer() {
    let app = create_router_for_testing();
    let (_, registered) = register(&app, "a@x.com", "secret1", "Ann").await;
    let refresh_token = registered["refresh_token"].as_str().unwrap();

    let (status, _) = send(&app, profile_request(refresh_token)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
