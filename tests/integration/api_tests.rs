//! API integration tests
//!
//! These run against a live server backed by a migrated database:
//! `cargo run` in one shell, then `cargo test -- --ignored`.

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8888";

fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4().simple())
}

async fn register(client: &Client, username: &str, password: &str) -> reqwest::Response {
    client
        .post(format!("{}/register", BASE_URL))
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await
        .expect("Failed to send register request")
}

async fn login(client: &Client, username: &str, password: &str) -> reqwest::Response {
    client
        .post(format!("{}/login", BASE_URL))
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await
        .expect("Failed to send login request")
}

/// Register a fresh user, log in, and return (username, token)
async fn logged_in_user(client: &Client) -> (String, String) {
    let username = unique("user");
    assert!(register(client, &username, "secret").await.status().is_success());

    let body: Value = login(client, &username, "secret")
        .await
        .json()
        .await
        .expect("Failed to parse login response");
    let token = body["token"].as_str().expect("No token in response").to_string();
    (username, token)
}

async fn create_book(client: &Client, token: &str, body: Value) -> reqwest::Response {
    client
        .post(format!("{}/api/v1/book", BASE_URL))
        .header("Authorization", token)
        .json(&body)
        .send()
        .await
        .expect("Failed to send create request")
}

async fn get_book(client: &Client, token: &str, id: i64) -> reqwest::Response {
    client
        .get(format!("{}/api/v1/book/{}", BASE_URL, id))
        .header("Authorization", token)
        .send()
        .await
        .expect("Failed to send get request")
}

async fn update_book(client: &Client, token: &str, body: Value) -> reqwest::Response {
    client
        .put(format!("{}/api/v1/book", BASE_URL))
        .header("Authorization", token)
        .json(&body)
        .send()
        .await
        .expect("Failed to send update request")
}

fn usernames(book: &Value) -> Vec<String> {
    book["users"]
        .as_array()
        .expect("users is not an array")
        .iter()
        .map(|u| u["username"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/api/v1/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_register_duplicate_username() {
    let client = Client::new();
    let username = unique("dup");

    assert_eq!(register(&client, &username, "pw").await.status(), StatusCode::OK);
    assert_eq!(register(&client, &username, "pw").await.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore]
async fn test_register_missing_password() {
    let client = Client::new();

    let response = client
        .post(format!("{}/register", BASE_URL))
        .json(&json!({ "username": unique("nopw") }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore]
async fn test_login() {
    let client = Client::new();
    let username = unique("login");
    register(&client, &username, "secret").await;

    let response = login(&client, &username, "secret").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(!body["token"].as_str().unwrap().is_empty());
}

#[tokio::test]
#[ignore]
async fn test_login_unknown_user() {
    let client = Client::new();
    let response = login(&client, &unique("ghost"), "secret").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();
    let username = unique("badpw");
    register(&client, &username, "secret").await;

    let response = login(&client, &username, "wrong").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_each_login_issues_new_token() {
    let client = Client::new();
    let username = unique("relogin");
    register(&client, &username, "secret").await;

    let first: Value = login(&client, &username, "secret").await.json().await.unwrap();
    let second: Value = login(&client, &username, "secret").await.json().await.unwrap();
    assert_ne!(first["token"], second["token"]);

    // The superseded token no longer authenticates
    let response = client
        .get(format!("{}/api/v1/test", BASE_URL))
        .header("Authorization", first["token"].as_str().unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore]
async fn test_gate_rejects_missing_empty_and_unknown_tokens() {
    let client = Client::new();
    // A registered user who never logged in must not make an empty token valid
    register(&client, &unique("fresh"), "secret").await;

    let url = format!("{}/api/v1/test", BASE_URL);
    let missing = client.get(&url).send().await.unwrap();
    let empty = client.get(&url).header("Authorization", "").send().await.unwrap();
    let unknown = client
        .get(&url)
        .header("Authorization", uuid::Uuid::new_v4().to_string())
        .send()
        .await
        .unwrap();

    assert_eq!(missing.status(), StatusCode::FORBIDDEN);
    assert_eq!(empty.status(), StatusCode::FORBIDDEN);
    assert_eq!(unknown.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore]
async fn test_liveness_with_token() {
    let client = Client::new();
    let (_, token) = logged_in_user(&client).await;

    for header in [token.clone(), format!("Bearer {}", token)] {
        let response = client
            .get(format!("{}/api/v1/test", BASE_URL))
            .header("Authorization", header)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

#[tokio::test]
#[ignore]
async fn test_create_book_requires_users() {
    let client = Client::new();
    let (_, token) = logged_in_user(&client).await;

    let response = create_book(&client, &token, json!({ "name": unique("book") })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = create_book(&client, &token, json!({ "name": unique("book"), "users": [] })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore]
async fn test_round_trip_register_login_create_get() {
    let client = Client::new();
    let (username, token) = logged_in_user(&client).await;
    let name = unique("dune");

    let response = create_book(
        &client,
        &token,
        json!({ "name": name, "desc": "spice", "users": [{ "username": username }] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let created: Value = response.json().await.unwrap();
    let id = created["id"].as_i64().expect("No book ID");

    let response = get_book(&client, &token, id).await;
    assert_eq!(response.status(), StatusCode::OK);
    let book: Value = response.json().await.unwrap();

    assert_eq!(book["name"], name.as_str());
    assert_eq!(book["desc"], "spice");
    assert_eq!(usernames(&book), vec![username]);
    assert!(book["users"][0].get("password").is_none());
    assert!(book["users"][0].get("token").is_none());
}

#[tokio::test]
#[ignore]
async fn test_create_drops_unknown_users() {
    let client = Client::new();
    let (alice, token) = logged_in_user(&client).await;

    let response = create_book(
        &client,
        &token,
        json!({
            "name": unique("partial"),
            "users": [{ "username": alice }, { "username": unique("nonexistent") }]
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let created: Value = response.json().await.unwrap();
    let book: Value = get_book(&client, &token, created["id"].as_i64().unwrap())
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(usernames(&book), vec![alice]);
}

#[tokio::test]
#[ignore]
async fn test_same_user_by_name_and_id_linked_once() {
    let client = Client::new();
    let (alice, token) = logged_in_user(&client).await;

    let first: Value = create_book(
        &client,
        &token,
        json!({ "name": unique("probe"), "users": [{ "username": alice }] }),
    )
    .await
    .json()
    .await
    .unwrap();
    let alice_id = first["users"][0]["id"].as_i64().unwrap();

    let created: Value = create_book(
        &client,
        &token,
        json!({
            "name": unique("dedup"),
            "users": [{ "username": alice }, { "id": alice_id }]
        }),
    )
    .await
    .json()
    .await
    .unwrap();

    let book: Value = get_book(&client, &token, created["id"].as_i64().unwrap())
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(usernames(&book), vec![alice]);
}

#[tokio::test]
#[ignore]
async fn test_update_with_unknown_user_changes_nothing() {
    let client = Client::new();
    let (alice, token) = logged_in_user(&client).await;
    let name = unique("stable");

    let created: Value = create_book(
        &client,
        &token,
        json!({ "name": name, "desc": "before", "users": [{ "username": alice }] }),
    )
    .await
    .json()
    .await
    .unwrap();
    let id = created["id"].as_i64().unwrap();

    let response = update_book(
        &client,
        &token,
        json!({ "id": id, "desc": "after", "users": [{ "username": unique("nonexistent") }] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let book: Value = get_book(&client, &token, id).await.json().await.unwrap();
    assert_eq!(book["desc"], "before");
    assert_eq!(usernames(&book), vec![alice]);
}

#[tokio::test]
#[ignore]
async fn test_update_without_users_keeps_links() {
    let client = Client::new();
    let (alice, token) = logged_in_user(&client).await;
    let name = unique("partial-update");

    let created: Value = create_book(
        &client,
        &token,
        json!({ "name": name, "desc": "before", "users": [{ "username": alice }] }),
    )
    .await
    .json()
    .await
    .unwrap();
    let id = created["id"].as_i64().unwrap();

    let response = update_book(
        &client,
        &token,
        json!({ "id": id, "name": "", "desc": "after", "users": [] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let book: Value = get_book(&client, &token, id).await.json().await.unwrap();
    assert_eq!(book["name"], name.as_str());
    assert_eq!(book["desc"], "after");
    assert_eq!(usernames(&book), vec![alice]);
}

#[tokio::test]
#[ignore]
async fn test_update_replaces_user_set() {
    let client = Client::new();
    let (alice, token) = logged_in_user(&client).await;
    let (bob, _) = logged_in_user(&client).await;

    let created: Value = create_book(
        &client,
        &token,
        json!({ "name": unique("swap"), "users": [{ "username": alice }] }),
    )
    .await
    .json()
    .await
    .unwrap();
    let id = created["id"].as_i64().unwrap();

    let response = update_book(&client, &token, json!({ "id": id, "users": [{ "username": bob }] })).await;
    assert_eq!(response.status(), StatusCode::OK);

    let book: Value = get_book(&client, &token, id).await.json().await.unwrap();
    assert_eq!(usernames(&book), vec![bob]);
}

#[tokio::test]
#[ignore]
async fn test_update_renames_and_relinks_together() {
    let client = Client::new();
    let (alice, token) = logged_in_user(&client).await;
    let (bob, _) = logged_in_user(&client).await;
    let original = unique("before-rename");

    let created: Value = create_book(
        &client,
        &token,
        json!({ "name": original, "users": [{ "username": alice }] }),
    )
    .await
    .json()
    .await
    .unwrap();
    let id = created["id"].as_i64().unwrap();

    // A rejected user set must not let the rename through
    let response = update_book(
        &client,
        &token,
        json!({ "id": id, "name": unique("lost-rename"), "users": [{ "username": unique("ghost") }] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let book: Value = get_book(&client, &token, id).await.json().await.unwrap();
    assert_eq!(book["name"], original.as_str());
    assert_eq!(usernames(&book), vec![alice.clone()]);

    let renamed = unique("after-rename");
    let response = update_book(
        &client,
        &token,
        json!({ "id": id, "name": renamed, "users": [{ "username": bob }, { "username": alice }] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let updated: Value = response.json().await.unwrap();
    assert_eq!(updated["name"], renamed.as_str());
    assert_eq!(usernames(&updated), vec![bob, alice]);
}

#[tokio::test]
#[ignore]
async fn test_update_unknown_book() {
    let client = Client::new();
    let (_, token) = logged_in_user(&client).await;

    let response = update_book(&client, &token, json!({ "id": i64::MAX, "name": "x" })).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore]
async fn test_list_books_includes_users() {
    let client = Client::new();
    let (alice, token) = logged_in_user(&client).await;
    let name = unique("listed");

    create_book(&client, &token, json!({ "name": name, "users": [{ "username": alice }] })).await;

    let response = client
        .get(format!("{}/api/v1/book", BASE_URL))
        .header("Authorization", &token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    let book = body["books"]
        .as_array()
        .unwrap()
        .iter()
        .find(|b| b["name"] == name.as_str())
        .expect("created book missing from list");
    assert_eq!(usernames(book), vec![alice]);
}

#[tokio::test]
#[ignore]
async fn test_delete_book_is_idempotent() {
    let client = Client::new();
    let (alice, token) = logged_in_user(&client).await;

    let created: Value = create_book(
        &client,
        &token,
        json!({ "name": unique("doomed"), "users": [{ "username": alice }] }),
    )
    .await
    .json()
    .await
    .unwrap();
    let id = created["id"].as_i64().unwrap();

    let delete = |id: i64| {
        client
            .delete(format!("{}/api/v1/book/{}", BASE_URL, id))
            .header("Authorization", &token)
            .send()
    };

    assert_eq!(delete(id).await.unwrap().status(), StatusCode::OK);
    assert_eq!(get_book(&client, &token, id).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(delete(id).await.unwrap().status(), StatusCode::OK);
}

#[tokio::test]
#[ignore]
async fn test_non_numeric_book_id_is_bad_request() {
    let client = Client::new();
    let (_, token) = logged_in_user(&client).await;

    let get = client
        .get(format!("{}/api/v1/book/abc", BASE_URL))
        .header("Authorization", &token)
        .send()
        .await
        .unwrap();
    assert_eq!(get.status(), StatusCode::BAD_REQUEST);

    let delete = client
        .delete(format!("{}/api/v1/book/abc", BASE_URL))
        .header("Authorization", &token)
        .send()
        .await
        .unwrap();
    assert_eq!(delete.status(), StatusCode::BAD_REQUEST);

    let body: Value = delete.json().await.expect("error body is not JSON");
    assert_eq!(body["code"], 7);
    assert_eq!(body["error"], "BadValue");
}

#[tokio::test]
#[ignore]
async fn test_login_moves_updated_at_past_created_at() {
    let client = Client::new();
    let (alice, token) = logged_in_user(&client).await;

    let created: Value = create_book(
        &client,
        &token,
        json!({ "name": unique("timestamps"), "users": [{ "username": alice }] }),
    )
    .await
    .json()
    .await
    .unwrap();

    let user = &created["users"][0];
    assert_eq!(user["username"], alice.as_str());
    assert!(user["created_at"].is_string());
    assert_ne!(user["created_at"], user["updated_at"]);

    // A second login keeps the two apart
    let body: Value = login(&client, &alice, "secret").await.json().await.unwrap();
    let token = body["token"].as_str().unwrap();

    let book: Value = get_book(&client, token, created["id"].as_i64().unwrap())
        .await
        .json()
        .await
        .unwrap();
    let user = &book["users"][0];
    assert_ne!(user["created_at"], user["updated_at"]);
}

#[tokio::test]
#[ignore]
async fn test_register_overlong_email_is_bad_request() {
    let client = Client::new();
    let email = format!("{}@{}.{}.com", "a".repeat(64), "b".repeat(40), "c".repeat(40));

    let response = client
        .post(format!("{}/register", BASE_URL))
        .json(&json!({ "username": unique("long-email"), "password": "pw", "email": email }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
