//! API integration tests.

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;

mod common;
use common::{access_token_for, test_app, test_app_with_state};

const ADMIN: &str = "admin@example.com";

/// Send a request with an optional bearer token and JSON body.
async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().uri(uri).method(method);

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    // Framework-level rejections (bad path/query parameters) come back as
    // plain text rather than JSON.
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, json)
}

fn user_body(email: &str, mobile: &str) -> Value {
    json!({
        "firstName": "Dev",
        "lastName": "Mukherjee",
        "email": email,
        "mobilePhone": mobile,
        "verified": true,
    })
}

/// Test that health endpoint works without authentication.
#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app().await;

    let (status, json) = send(&app, Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

/// Test that protected endpoints require authentication.
#[tokio::test]
async fn test_users_requires_auth() {
    let app = test_app().await;

    let (status, _) = send(&app, Method::GET, "/api/users", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

/// Test that a malformed authorization header is rejected.
#[tokio::test]
async fn test_users_rejects_bad_token() {
    let app = test_app().await;

    let (status, _) = send(
        &app,
        Method::GET,
        "/api/users",
        Some("not-a-real-token"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

/// Full account lifecycle: create, conflict, get, delete, gone.
#[tokio::test]
async fn test_user_crud_scenario() {
    let (app, state) = test_app_with_state().await;
    let token = access_token_for(&state, ADMIN);

    // Create succeeds with a generated id.
    let (status, created) = send(
        &app,
        Method::POST,
        "/api/users",
        Some(&token),
        Some(user_body("a@x.com", "111")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().expect("id assigned").to_string();
    assert_eq!(created["firstName"], "Dev");
    assert_eq!(created["email"], "a@x.com");
    assert_eq!(created["mobilePhone"], "111");
    assert_eq!(created["verified"], true);
    assert!(created["createdAt"].is_string());
    assert!(created["updatedAt"].is_string());
    // The internal shape never leaks.
    assert!(created.get("first_name").is_none());
    assert!(created.get("passwordHash").is_none());

    // Creating the same email again conflicts.
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/users",
        Some(&token),
        Some(user_body("a@x.com", "222")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");

    // Get returns the same record.
    let (status, fetched) = send(
        &app,
        Method::GET,
        &format!("/api/users/{id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    // Delete succeeds with no content.
    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/api/users/{id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    // The record is gone.
    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/api/users/{id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/// Test that an existing mobile number also conflicts.
#[tokio::test]
async fn test_create_conflict_on_mobile() {
    let (app, state) = test_app_with_state().await;
    let token = access_token_for(&state, ADMIN);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/users",
        Some(&token),
        Some(user_body("a@x.com", "111")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/users",
        Some(&token),
        Some(user_body("b@x.com", "111")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

/// Test that snake_case request bodies are accepted as well.
#[tokio::test]
async fn test_create_accepts_snake_case() {
    let (app, state) = test_app_with_state().await;
    let token = access_token_for(&state, ADMIN);

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/users",
        Some(&token),
        Some(json!({
            "first_name": "Dev",
            "last_name": "Mukherjee",
            "email": "snake@x.com",
            "mobile_phone": "333",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["firstName"], "Dev");
    assert_eq!(created["mobilePhone"], "333");
    assert_eq!(created["verified"], false);
}

/// Pagination bounds and page contents.
#[tokio::test]
async fn test_list_users_pagination() {
    let (app, state) = test_app_with_state().await;
    let token = access_token_for(&state, ADMIN);

    // Empty store lists fine.
    let (status, body) = send(&app, Method::GET, "/api/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 0);

    for i in 0..3 {
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/users",
            Some(&token),
            Some(user_body(&format!("user{i}@x.com"), &format!("{i}{i}"))),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, all) = send(&app, Method::GET, "/api/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let all = all.as_array().unwrap().clone();
    assert_eq!(all.len(), 3);

    let (status, page) = send(
        &app,
        Method::GET,
        "/api/users?offset=1&limit=2",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let page = page.as_array().unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0], all[1]);
    assert_eq!(page[1], all[2]);

    // Out-of-range limits are rejected before reaching the store.
    let (status, _) = send(
        &app,
        Method::GET,
        "/api/users?limit=0",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::GET,
        "/api/users?limit=101",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

/// Partial update touches only the supplied fields.
#[tokio::test]
async fn test_partial_update() {
    let (app, state) = test_app_with_state().await;
    let token = access_token_for(&state, ADMIN);

    let (_, created) = send(
        &app,
        Method::POST,
        "/api/users",
        Some(&token),
        Some(user_body("patch@x.com", "444")),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();

    let (status, updated) = send(
        &app,
        Method::PATCH,
        &format!("/api/users/{id}"),
        Some(&token),
        Some(json!({"firstName": "Renamed"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["firstName"], "Renamed");
    assert_eq!(updated["lastName"], created["lastName"]);
    assert_eq!(updated["email"], created["email"]);
    assert_eq!(updated["mobilePhone"], created["mobilePhone"]);
    assert_eq!(updated["createdAt"], created["createdAt"]);
    assert_ne!(updated["updatedAt"], created["updatedAt"]);
}

/// Updating a missing user is a 404.
#[tokio::test]
async fn test_update_missing_user() {
    let (app, state) = test_app_with_state().await;
    let token = access_token_for(&state, ADMIN);

    let (status, _) = send(
        &app,
        Method::PATCH,
        "/api/users/00000000-0000-0000-0000-000000000000",
        Some(&token),
        Some(json!({"firstName": "Ghost"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/// A non-UUID path parameter is rejected at the boundary.
#[tokio::test]
async fn test_get_user_invalid_id() {
    let (app, state) = test_app_with_state().await;
    let token = access_token_for(&state, ADMIN);

    let (status, _) = send(
        &app,
        Method::GET,
        "/api/users/not-a-uuid",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// Authentication Tests
// ============================================================================

/// Seed a user with a password through the API and return its id.
async fn seed_login_user(app: &Router, token: &str, email: &str, password: &str) -> String {
    let mut body = user_body(email, "042-1234567");
    body["password"] = json!(password);

    let (status, created) = send(app, Method::POST, "/api/users", Some(token), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    created["id"].as_str().unwrap().to_string()
}

/// Login issues a bearer token pair.
#[tokio::test]
async fn test_login_success() {
    let (app, state) = test_app_with_state().await;
    let admin_token = access_token_for(&state, ADMIN);
    seed_login_user(&app, &admin_token, "hello@example.com", "devpassword123").await;

    let (status, tokens) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({"username": "hello@example.com", "password": "devpassword123"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(tokens["accessToken"].is_string());
    assert!(tokens["refreshToken"].is_string());
    assert_eq!(tokens["tokenType"], "Bearer");
    assert_eq!(tokens["expiresIn"], 900);
}

/// Login with an unknown email issues nothing.
#[tokio::test]
async fn test_login_unknown_email() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({"username": "nobody@example.com", "password": "whatever"})),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.get("accessToken").is_none());
}

/// Login with the wrong password fails the same way.
#[tokio::test]
async fn test_login_wrong_password() {
    let (app, state) = test_app_with_state().await;
    let admin_token = access_token_for(&state, ADMIN);
    seed_login_user(&app, &admin_token, "hello@example.com", "devpassword123").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({"username": "hello@example.com", "password": "wrong"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

/// The access token from login works against protected routes and /auth/me
/// resolves to the caller's own record.
#[tokio::test]
async fn test_me_returns_caller() {
    let (app, state) = test_app_with_state().await;
    let admin_token = access_token_for(&state, ADMIN);
    let id = seed_login_user(&app, &admin_token, "hello@example.com", "devpassword123").await;

    let (_, tokens) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({"username": "hello@example.com", "password": "devpassword123"})),
    )
    .await;
    let access = tokens["accessToken"].as_str().unwrap();

    let (status, me) = send(&app, Method::GET, "/auth/me", Some(access), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["id"], json!(id));
    assert_eq!(me["email"], "hello@example.com");
}

/// A token whose subject no longer exists resolves to 401, not a profile.
#[tokio::test]
async fn test_me_unknown_subject() {
    let (app, state) = test_app_with_state().await;
    let token = access_token_for(&state, "ghost@example.com");

    let (status, _) = send(&app, Method::GET, "/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

/// Refresh rotates the pair; the spent token stops working.
#[tokio::test]
async fn test_refresh_rotation() {
    let (app, state) = test_app_with_state().await;
    let admin_token = access_token_for(&state, ADMIN);
    seed_login_user(&app, &admin_token, "hello@example.com", "devpassword123").await;

    let (_, tokens) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({"username": "hello@example.com", "password": "devpassword123"})),
    )
    .await;
    let refresh = tokens["refreshToken"].as_str().unwrap().to_string();

    let (status, rotated) = send(
        &app,
        Method::POST,
        "/auth/refresh",
        None,
        Some(json!({"refreshToken": refresh})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(rotated["accessToken"].is_string());

    // The new access token is valid for protected routes.
    let new_access = rotated["accessToken"].as_str().unwrap();
    let (status, _) = send(&app, Method::GET, "/auth/me", Some(new_access), None).await;
    assert_eq!(status, StatusCode::OK);

    // The presented refresh token was single-use.
    let (status, _) = send(
        &app,
        Method::POST,
        "/auth/refresh",
        None,
        Some(json!({"refreshToken": refresh})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

/// Refresh rejects an access token.
#[tokio::test]
async fn test_refresh_rejects_access_token() {
    let (app, state) = test_app_with_state().await;
    let admin_token = access_token_for(&state, ADMIN);
    seed_login_user(&app, &admin_token, "hello@example.com", "devpassword123").await;

    let (_, tokens) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({"username": "hello@example.com", "password": "devpassword123"})),
    )
    .await;
    let access = tokens["accessToken"].as_str().unwrap();

    let (status, _) = send(
        &app,
        Method::POST,
        "/auth/refresh",
        None,
        Some(json!({"refreshToken": access})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

/// Logout revokes the refresh token; doing it twice stays 204.
#[tokio::test]
async fn test_logout_revokes_refresh() {
    let (app, state) = test_app_with_state().await;
    let admin_token = access_token_for(&state, ADMIN);
    seed_login_user(&app, &admin_token, "hello@example.com", "devpassword123").await;

    let (_, tokens) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({"username": "hello@example.com", "password": "devpassword123"})),
    )
    .await;
    let refresh = tokens["refreshToken"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        Method::POST,
        "/auth/logout",
        None,
        Some(json!({"refreshToken": refresh})),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app,
        Method::POST,
        "/auth/refresh",
        None,
        Some(json!({"refreshToken": refresh})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        Method::POST,
        "/auth/logout",
        None,
        Some(json!({"refreshToken": refresh})),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}
