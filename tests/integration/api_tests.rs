//! Live server tests
//!
//! Expect a server on localhost:8000 started with the bootstrap admin
//! `admin`/`admin` configured.

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8000/api/v1";

/// Helper to get a token for the given account
async fn get_auth_token(client: &Client, username: &str, password: &str) -> String {
    let response = client
        .post(format!("{}/login", BASE_URL))
        .json(&json!({
            "username": username,
            "password": password
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_login() {
    let client = Client::new();

    let response = client
        .post(format!("{}/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "admin"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["token_type"], "Bearer");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_borrow_and_release() {
    let client = Client::new();
    let admin = get_auth_token(&client, "admin", "admin").await;

    let suffix = chrono::Utc::now().timestamp_millis();
    let book_id = format!("it-book-{}", suffix);
    let username = format!("it-user-{}", suffix);

    let response = client
        .post(format!("{}/register", BASE_URL))
        .json(&json!({ "username": username, "password": "secret" }))
        .send()
        .await
        .expect("Failed to register");
    assert_eq!(response.status(), 201);
    let user = get_auth_token(&client, &username, "secret").await;

    let response = client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(&admin)
        .json(&json!({ "id": book_id, "title": "Dune", "author": "Herbert", "amount": 1 }))
        .send()
        .await
        .expect("Failed to add book");
    assert_eq!(response.status(), 201);

    let response = client
        .patch(format!("{}/books/{}/borrow", BASE_URL, book_id))
        .bearer_auth(&user)
        .send()
        .await
        .expect("Failed to borrow");
    assert!(response.status().is_success());
    let book: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(book["amount"], 0);

    let response = client
        .patch(format!("{}/books/{}/release", BASE_URL, book_id))
        .bearer_auth(&user)
        .send()
        .await
        .expect("Failed to release");
    assert!(response.status().is_success());

    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to delete book");
    assert_eq!(response.status(), 204);
}

#[tokio::test]
#[ignore]
async fn test_unauthorized_access() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}
