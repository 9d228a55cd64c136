//! E2E tests for the contact form

mod common;

use common::TestServer;
use serde_json::{Value, json};

#[tokio::test]
async fn test_submit_is_public_and_listing_is_admin_only() {
    let server = TestServer::new().await;

    let response = server
        .client
        .post(server.url("/api/contact"))
        .json(&json!({
            "name": "Asha",
            "email": "asha@example.com",
            "subject": "Sponsorship",
            "message": "We'd like to sponsor your next event.",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Contact form submitted successfully!");

    let user = server.register("Ravi", "ravi@example.com").await;
    let response = server
        .client
        .get(server.url("/api/contact/messages"))
        .bearer_auth(&user.token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    let admin = server.login_admin().await;
    let messages: Value = server
        .client
        .get(server.url("/api/contact/messages"))
        .bearer_auth(&admin.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(messages.as_array().unwrap().len(), 1);
    assert_eq!(messages[0]["subject"], "Sponsorship");
}

#[tokio::test]
async fn test_submit_rejects_invalid_input() {
    let server = TestServer::new().await;

    for body in [
        json!({ "name": "Asha", "email": "bad", "message": "hi" }),
        json!({ "name": " ", "email": "asha@example.com", "message": "hi" }),
        json!({ "name": "Asha", "email": "asha@example.com", "message": "x".repeat(5001) }),
    ] {
        let response = server
            .client
            .post(server.url("/api/contact"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 400);
    }
}
