//! Integration tests for registration, login, and the refresh-token flow.

mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, register_and_login, send};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../db/migrations")]
async fn register_then_login_returns_token_pair(pool: PgPool) {
    let app = common::build_test_app(pool);

    let (user_id, access_token, refresh_token) =
        register_and_login(&app, "alice", "member").await;
    assert!(user_id > 0);
    assert!(!access_token.is_empty());
    assert!(!refresh_token.is_empty());

    // The access token works against a protected endpoint.
    let response = send(&app, Method::GET, "/api/v1/auth/me", Some(&access_token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let me = body_json(response).await;
    assert_eq!(me["username"], "alice");
    // The password hash must never be serialized.
    assert!(me.get("password_hash").is_none());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn login_with_wrong_password_returns_401(pool: PgPool) {
    let app = common::build_test_app(pool);
    register_and_login(&app, "bob", "member").await;

    let response = send(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({ "username": "bob", "password": "not-the-password" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Invalid username or password");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn weak_password_is_rejected_at_registration(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = send(
        &app,
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(json!({
            "username": "carol",
            "email": "carol@example.com",
            "password": "short",
        })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn refresh_rotates_the_token(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_, _, refresh_token) = register_and_login(&app, "dave", "member").await;

    // First refresh succeeds and returns a new pair.
    let response = send(
        &app,
        Method::POST,
        "/api/v1/auth/refresh",
        None,
        Some(json!({ "refresh_token": refresh_token })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let tokens = body_json(response).await;
    let new_refresh = tokens["refresh_token"].as_str().unwrap();
    assert_ne!(new_refresh, refresh_token);

    // The presented token was revoked, so replaying it fails.
    let response = send(
        &app,
        Method::POST,
        "/api/v1/auth/refresh",
        None,
        Some(json!({ "refresh_token": refresh_token })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn change_password_revokes_outstanding_refresh_tokens(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_, access_token, refresh_token) = register_and_login(&app, "erin", "member").await;

    let response = send(
        &app,
        Method::POST,
        "/api/v1/auth/change-password",
        Some(&access_token),
        Some(json!({
            "old_password": "correct-horse-battery",
            "new_password": "staple-gun-sunrise",
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // The refresh token issued before the change no longer works.
    let response = send(
        &app,
        Method::POST,
        "/api/v1/auth/refresh",
        None,
        Some(json!({ "refresh_token": refresh_token })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // And the new password logs in.
    let response = send(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({ "username": "erin", "password": "staple-gun-sunrise" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn logout_revokes_the_refresh_token(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_, access_token, refresh_token) = register_and_login(&app, "frank", "member").await;

    let response = send(
        &app,
        Method::POST,
        "/api/v1/auth/logout",
        Some(&access_token),
        Some(json!({ "refresh_token": refresh_token })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(
        &app,
        Method::POST,
        "/api/v1/auth/refresh",
        None,
        Some(json!({ "refresh_token": refresh_token })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
