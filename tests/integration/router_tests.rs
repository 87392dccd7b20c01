//! Router tests against the in-memory store, no server or database needed

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use library_catalog::{
    api, config::AppConfig, repository::Repository, services::Services, AppState,
};

const ADMIN: (&str, &str) = ("admin", "admin-password");

async fn app() -> Router {
    let config = AppConfig::default();
    let services = Services::new(Repository::in_memory(), config.auth.clone());
    services
        .auth
        .ensure_admin(ADMIN.0, ADMIN.1)
        .await
        .expect("admin account");

    api::router(AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    })
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .expect("request");

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

async fn login(app: &Router, username: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/v1/login",
        None,
        Some(json!({ "username": username, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["token_type"], "Bearer");
    body["token"].as_str().expect("token").to_string()
}

async fn register(app: &Router, username: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/v1/register",
        None,
        Some(json!({ "username": username, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["role"], "user");
    assert!(body.get("password").is_none());
    login(app, username, password).await
}

async fn add_book(app: &Router, admin: &str, id: &str, amount: i64) {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/v1/books",
        Some(admin),
        Some(json!({ "id": id, "title": "X", "author": "Y", "amount": amount })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
}

#[tokio::test]
async fn health_needs_no_token() {
    let app = app().await;

    let (status, body) = send(&app, Method::GET, "/api/v1/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, Method::GET, "/api/v1/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn missing_or_bad_token_is_unauthorized() {
    let app = app().await;

    let (status, body) = send(&app, Method::GET, "/api/v1/books", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Missing or Malformed token");

    let (status, body) = send(&app, Method::GET, "/api/v1/books", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid token");
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let app = app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/login",
        None,
        Some(json!({ "username": ADMIN.0, "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "invalid username/password");
}

#[tokio::test]
async fn admin_routes_are_forbidden_to_users() {
    let app = app().await;
    let alice = register(&app, "alice", "secret").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/books",
        Some(&alice),
        Some(json!({ "id": "b1", "title": "X", "author": "Y", "amount": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "your role user is not matching admin");

    for (method, uri) in [
        (Method::GET, "/api/v1/users"),
        (Method::GET, "/api/v1/users/alice"),
        (Method::DELETE, "/api/v1/books/b1"),
    ] {
        let (status, _) = send(&app, method, uri, Some(&alice), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
    }
}

#[tokio::test]
async fn borrow_and_release_round_trip() {
    let app = app().await;
    let admin = login(&app, ADMIN.0, ADMIN.1).await;
    let alice = register(&app, "alice", "secret").await;
    add_book(&app, &admin, "b1", 1).await;

    let (status, book) = send(&app, Method::PATCH, "/api/v1/books/b1/borrow", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK, "{book}");
    assert_eq!(book["amount"], 0);
    assert_eq!(book["owned_by"], json!(["alice"]));

    let (status, body) = send(&app, Method::PATCH, "/api/v1/books/b1/borrow", Some(&alice), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "You can't borrow X because you already have the book");

    let (status, user) = send(&app, Method::GET, "/api/v1/users/alice", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["borrowed_book_ids"], json!(["b1"]));

    let (status, body) = send(&app, Method::DELETE, "/api/v1/books/b1", Some(&admin), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "cannot delete X because it is still borrowed");

    let (status, book) = send(&app, Method::PATCH, "/api/v1/books/b1/release", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(book["amount"], 1);
    assert_eq!(book["owned_by"], json!([]));

    let (status, _) = send(&app, Method::DELETE, "/api/v1/books/b1", Some(&admin), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, Method::GET, "/api/v1/books/b1", Some(&alice), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "No Book With Id b1");
}

#[tokio::test]
async fn invalid_book_lists_every_violation() {
    let app = app().await;
    let admin = login(&app, ADMIN.0, ADMIN.1).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/books",
        Some(&admin),
        Some(json!({ "id": "b1", "author": "Y", "amount": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["details"],
        json!(["title is empty", "amount is less than or equal to zero"])
    );

    let (status, books) = send(&app, Method::GET, "/api/v1/books", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(books, json!([]));
}

#[tokio::test]
async fn update_changes_details_only() {
    let app = app().await;
    let admin = login(&app, ADMIN.0, ADMIN.1).await;
    add_book(&app, &admin, "b1", 2).await;

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/v1/books/b1",
        Some(&admin),
        Some(json!({ "id": "b2", "title": "T", "author": "A", "amount": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"], json!(["book id is not empty"]));

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/v1/books/b1",
        Some(&admin),
        Some(json!({ "title": "T", "author": "A", "amount": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, book) = send(&app, Method::GET, "/api/v1/books/b1", Some(&admin), None).await;
    assert_eq!(
        book,
        json!({ "id": "b1", "title": "T", "author": "A", "amount": 3, "owned_by": [] })
    );
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let app = app().await;
    register(&app, "alice", "secret").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/register",
        None,
        Some(json!({ "username": "alice", "password": "other" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "alice already exists");
}
