// ABOUTME: HTTP tests for registration, login, the session cookie and request authentication
// ABOUTME: Drives the full router with tower oneshot requests against an in-memory database
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod helpers;

use axum::http::StatusCode;
use helpers::axum_test::AxumTestRequest;
use helpers::test_utils::{create_test_app, register_user};
use serde_json::{json, Value};

#[tokio::test]
async fn test_health_and_ready() {
    let app = create_test_app().await;

    let body: Value = AxumTestRequest::get("/health")
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "setlog-server");

    AxumTestRequest::get("/ready")
        .send(app)
        .await
        .assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = create_test_app().await;

    let generated = AxumTestRequest::get("/health").send(app.clone()).await;
    assert!(generated.header("x-request-id").is_some());

    let supplied = AxumTestRequest::get("/health")
        .header("x-request-id", "lift-123")
        .send(app)
        .await;
    assert_eq!(supplied.header("x-request-id").as_deref(), Some("lift-123"));
}

#[tokio::test]
async fn test_register_login_me() {
    let app = create_test_app().await;

    let response = AxumTestRequest::post("/api/auth/register")
        .json(&json!({
            "email": "  Lifter@Example.com ",
            "password": "correct-horse-battery",
            "display_name": "Lifter"
        }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED);
    let cookie = response.header("set-cookie").unwrap();
    assert!(cookie.starts_with("setlog_session="));
    assert!(cookie.contains("HttpOnly"));
    let body: Value = response.json();
    assert_eq!(body["user"]["email"], "lifter@example.com");
    assert!(body["user"].get("password_hash").is_none());
    assert!(body["expires_in"].as_i64().unwrap() > 0);

    let login: Value = AxumTestRequest::post("/api/auth/login")
        .json(&json!({
            "email": "LIFTER@example.com",
            "password": "correct-horse-battery"
        }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    let token = login["token"].as_str().unwrap();

    let me: Value = AxumTestRequest::get("/api/auth/me")
        .bearer(token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(me["display_name"], "Lifter");

    // The cookie alone authenticates too
    let cookie_pair = cookie.split(';').next().unwrap();
    AxumTestRequest::get("/api/auth/me")
        .header("cookie", cookie_pair)
        .send(app)
        .await
        .assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let app = create_test_app().await;
    register_user(&app, "dup@example.com").await;

    AxumTestRequest::post("/api/auth/register")
        .json(&json!({
            "email": "DUP@example.com",
            "password": "another-password",
            "display_name": "Copy"
        }))
        .send(app)
        .await
        .assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_registration_validation() {
    let app = create_test_app().await;

    AxumTestRequest::post("/api/auth/register")
        .json(&json!({
            "email": "short@example.com",
            "password": "short",
            "display_name": "Short"
        }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    AxumTestRequest::post("/api/auth/register")
        .json(&json!({
            "email": "not-an-email",
            "password": "long-enough-password",
            "display_name": "Nobody"
        }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    AxumTestRequest::post("/api/auth/register")
        .raw_json("{not json")
        .send(app)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_bad_credentials_are_unauthorized() {
    let app = create_test_app().await;
    register_user(&app, "creds@example.com").await;

    let body: Value = AxumTestRequest::post("/api/auth/login")
        .json(&json!({
            "email": "creds@example.com",
            "password": "wrong-password"
        }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::UNAUTHORIZED)
        .json();
    assert_eq!(body["error"]["message"], "Invalid email or password");

    AxumTestRequest::post("/api/auth/login")
        .json(&json!({
            "email": "nobody@example.com",
            "password": "wrong-password"
        }))
        .send(app)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_routes_require_authentication() {
    let app = create_test_app().await;

    for uri in [
        "/api/exercises",
        "/api/circuits",
        "/api/templates",
        "/api/schedule",
        "/api/sessions",
        "/api/sessions/active",
        "/api/supplements",
        "/api/body-weight",
        "/api/analytics/overview",
    ] {
        AxumTestRequest::get(uri)
            .send(app.clone())
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    AxumTestRequest::get("/api/templates")
        .bearer("not.a.jwt")
        .send(app)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_expires_cookie() {
    let app = create_test_app().await;

    let response = AxumTestRequest::post("/api/auth/logout")
        .send(app)
        .await
        .assert_status(StatusCode::NO_CONTENT);
    let cookie = response.header("set-cookie").unwrap();
    assert!(cookie.contains("Max-Age=0"));
}
