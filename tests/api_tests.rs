//! API integration tests.
//!
//! These run against a live server and database. Run with:
//! `cargo test -- --ignored`

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Unique username per run so tests can be repeated against one database
fn unique_username(prefix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos();
    format!("{}_{}", prefix, nanos)
}

/// Helper to create an account, returning its user_id
async fn create_user(client: &Client, username: &str, password: &str) -> i32 {
    let response = client
        .post(format!("{}/users", BASE_URL))
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await
        .expect("Failed to send create-user request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    body["user_id"].as_i64().expect("No user_id in response") as i32
}

/// Helper to create a book, returning its book_id
async fn create_book(client: &Client, title: &str) -> i32 {
    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({
            "title": title,
            "author": "Test Author",
            "genre": "Testing",
            "publisher": "Test House",
            "publication_date": "2023-10-25"
        }))
        .send()
        .await
        .expect("Failed to send create-book request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    body["book_id"].as_i64().expect("No book_id in response") as i32
}

async fn delete_book(client: &Client, book_id: i32) {
    client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send delete-book request");
}

async fn delete_user(client: &Client, user_id: i32) {
    client
        .delete(format!("{}/users/{}?force=true", BASE_URL, user_id))
        .send()
        .await
        .expect("Failed to send delete-user request");
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
async fn test_book_crud() {
    let client = Client::new();
    let book_id = create_book(&client, "CRUD Book").await;

    // Created books start available
    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["title"], "CRUD Book");
    assert_eq!(body["is_available"], true);

    // Partial update leaves other fields alone
    let response = client
        .patch(format!("{}/books/{}", BASE_URL, book_id))
        .json(&json!({ "genre": "Updated Genre" }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["genre"], "Updated Genre");
    assert_eq!(body["title"], "CRUD Book");

    // Delete, then the book is gone
    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_invalid_publication_dates_rejected() {
    let client = Client::new();

    for bad_date in ["2023-02-30", "2023/10/25", "2023-13-01"] {
        let response = client
            .post(format!("{}/books", BASE_URL))
            .json(&json!({
                "title": "Bad Date Book",
                "author": "A",
                "genre": "G",
                "publisher": "P",
                "publication_date": bad_date
            }))
            .send()
            .await
            .expect("Failed to send request");

        assert_eq!(response.status(), 400, "date {} should be rejected", bad_date);
    }
}

#[tokio::test]
#[ignore]
async fn test_duplicate_username_conflict() {
    let client = Client::new();
    let username = unique_username("dup");
    let user_id = create_user(&client, &username, "secret").await;

    let response = client
        .post(format!("{}/users", BASE_URL))
        .json(&json!({ "username": username, "password": "other" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 409);

    delete_user(&client, user_id).await;
}

#[tokio::test]
#[ignore]
async fn test_login() {
    let client = Client::new();
    let username = unique_username("login");
    let user_id = create_user(&client, &username, "hunter2").await;

    let response = client
        .post(format!("{}/users/login", BASE_URL))
        .json(&json!({ "username": username, "password": "hunter2" }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    // Wrong password and unknown user produce the same status
    let response = client
        .post(format!("{}/users/login", BASE_URL))
        .json(&json!({ "username": username, "password": "wrong" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);

    let response = client
        .post(format!("{}/users/login", BASE_URL))
        .json(&json!({ "username": unique_username("nobody"), "password": "wrong" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);

    delete_user(&client, user_id).await;
}

#[tokio::test]
#[ignore]
async fn test_borrow_and_return_cycle() {
    let client = Client::new();
    let user_id = create_user(&client, &unique_username("borrower"), "secret").await;
    let first = create_book(&client, "Borrow Cycle One").await;
    let second = create_book(&client, "Borrow Cycle Two").await;

    // Borrow both
    let response = client
        .patch(format!("{}/books/borrow", BASE_URL))
        .json(&json!({ "user_id": user_id, "book_ids": [first, second] }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["count"], 2);

    // Both flagged unavailable
    for id in [first, second] {
        let body: Value = client
            .get(format!("{}/books/{}", BASE_URL, id))
            .send()
            .await
            .expect("Failed to send request")
            .json()
            .await
            .expect("Failed to parse response");
        assert_eq!(body["is_available"], false);
    }

    // Both listed in the user's borrowed books
    let body: Value = client
        .get(format!("{}/users/borrowedBooks/{}", BASE_URL, user_id))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    let borrowed: Vec<i64> = body
        .as_array()
        .expect("Expected array")
        .iter()
        .map(|b| b["book_id"].as_i64().unwrap())
        .collect();
    assert_eq!(borrowed, vec![first as i64, second as i64]);

    // Borrowing the same batch again reports the whole subset
    let response = client
        .patch(format!("{}/books/borrow", BASE_URL))
        .json(&json!({ "user_id": user_id, "book_ids": [first, second] }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["book_ids"], json!([first, second]));

    // Return both
    let response = client
        .patch(format!("{}/books/return", BASE_URL))
        .json(&json!({ "user_id": user_id, "book_ids": [first, second] }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = client
        .get(format!("{}/books/{}", BASE_URL, first))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(body["is_available"], true);

    delete_book(&client, first).await;
    delete_book(&client, second).await;
    delete_user(&client, user_id).await;
}

#[tokio::test]
#[ignore]
async fn test_return_not_borrowed_reports_mismatch() {
    let client = Client::new();
    let user_id = create_user(&client, &unique_username("returner"), "secret").await;
    let held = create_book(&client, "Held Book").await;
    let loose = create_book(&client, "Never Borrowed").await;

    let response = client
        .patch(format!("{}/books/borrow", BASE_URL))
        .json(&json!({ "user_id": user_id, "book_ids": held }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    // Only the book the user does not hold is reported
    let response = client
        .patch(format!("{}/books/return", BASE_URL))
        .json(&json!({ "user_id": user_id, "book_ids": [held, loose] }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["book_ids"], json!([loose]));

    // The rejection changed nothing: the held book is still out
    let body: Value = client
        .get(format!("{}/books/{}", BASE_URL, held))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(body["is_available"], false);

    delete_user(&client, user_id).await;
    delete_book(&client, held).await;
    delete_book(&client, loose).await;
}

#[tokio::test]
#[ignore]
async fn test_borrowed_book_cannot_be_deleted() {
    let client = Client::new();
    let user_id = create_user(&client, &unique_username("keeper"), "secret").await;
    let book_id = create_book(&client, "Protected Book").await;

    let response = client
        .patch(format!("{}/books/borrow", BASE_URL))
        .json(&json!({ "user_id": user_id, "book_ids": [book_id] }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);

    delete_user(&client, user_id).await;
    delete_book(&client, book_id).await;
}

#[tokio::test]
#[ignore]
async fn test_delete_user_with_borrowed_books() {
    let client = Client::new();
    let user_id = create_user(&client, &unique_username("holder"), "secret").await;
    let book_id = create_book(&client, "Outstanding Book").await;

    let response = client
        .patch(format!("{}/books/borrow", BASE_URL))
        .json(&json!({ "user_id": user_id, "book_ids": [book_id] }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    // Blocked while books are outstanding
    let response = client
        .delete(format!("{}/users/{}", BASE_URL, user_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);

    // force=true auto-returns and deletes
    let response = client
        .delete(format!("{}/users/{}?force=true", BASE_URL, user_id))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(body["is_available"], true);

    delete_book(&client, book_id).await;
}

#[tokio::test]
#[ignore]
async fn test_bulk_update_and_delete() {
    let client = Client::new();
    let first = create_book(&client, "Bulk One").await;
    let second = create_book(&client, "Bulk Two").await;

    let response = client
        .patch(format!("{}/books", BASE_URL))
        .json(&json!({ "book_ids": [first, second], "publisher": "New House" }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["matched"], 2);

    let body: Value = client
        .get(format!("{}/books/{}", BASE_URL, second))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(body["publisher"], "New House");
    assert_eq!(body["title"], "Bulk Two");

    let response = client
        .delete(format!("{}/books", BASE_URL))
        .json(&json!({ "book_ids": [first, second] }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["deleted"], 2);
}

#[tokio::test]
#[ignore]
async fn test_bulk_delete_requires_ids() {
    let client = Client::new();

    let response = client
        .delete(format!("{}/books", BASE_URL))
        .json(&json!({ "book_ids": [] }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_username_markup_is_stripped() {
    let client = Client::new();
    let suffix = unique_username("x");
    let response = client
        .post(format!("{}/users", BASE_URL))
        .json(&json!({
            "username": format!("<b>{}</b>", suffix),
            "password": "secret"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["username"], suffix);

    delete_user(&client, body["user_id"].as_i64().unwrap() as i32).await;
}

#[tokio::test]
#[ignore]
async fn test_markup_only_username_is_rejected() {
    let client = Client::new();

    // Strips to an empty string, so creation must fail validation
    let response = client
        .post(format!("{}/users", BASE_URL))
        .json(&json!({ "username": "<br>", "password": "secret" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_nonpositive_book_id_is_rejected() {
    let client = Client::new();

    for id in [-5, 0] {
        let response = client
            .post(format!("{}/books", BASE_URL))
            .json(&json!({
                "book_id": id,
                "title": "Test Book",
                "author": "Test Author",
                "genre": "Testing",
                "publisher": "Test House",
                "publication_date": "2023-10-25"
            }))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), 400);
    }
}

#[tokio::test]
#[ignore]
async fn test_missing_user_and_book_carry_distinct_codes() {
    let client = Client::new();

    let response = client
        .get(format!("{}/users/999999", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "NoSuchUser");

    let response = client
        .get(format!("{}/books/999999", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "NoSuchBook");
}

#[tokio::test]
#[ignore]
async fn test_duplicate_borrow_ids_collapse_in_response() {
    let client = Client::new();
    let username = unique_username("dedup");
    let user_id = create_user(&client, &username, "secret").await;
    let book_id = create_book(&client, "Borrowed Once").await;

    let response = client
        .patch(format!("{}/books/borrow", BASE_URL))
        .json(&json!({ "user_id": user_id, "book_ids": [book_id, book_id] }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["count"], 1);
    assert_eq!(body["book_ids"], json!([book_id]));

    delete_user(&client, user_id).await;
    delete_book(&client, book_id).await;
}
