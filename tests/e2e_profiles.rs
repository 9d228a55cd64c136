//! E2E tests for athlete profiles

mod common;

use common::TestServer;
use serde_json::{Value, json};

#[tokio::test]
async fn test_create_and_read_own_profile() {
    let server = TestServer::new().await;
    let user = server.register("Asha", "asha@example.com").await;

    let response = server
        .client
        .post(server.url("/api/profiles/create-profile"))
        .bearer_auth(&user.token)
        .json(&json!({
            "fullName": "Asha Runner",
            "location": "Pune",
            "primarySport": "athletics",
            "currentLevel": "semi-professional",
            "email": "contact@asha.example.com",
            "achievements": [{ "title": "State 400m gold", "date": "2024" }],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let created: Value = response.json().await.unwrap();
    assert_eq!(created["message"], "Profile created successfully");
    assert_eq!(created["profile"]["user"], user.id.as_str());
    assert_eq!(
        created["profile"]["athleticInfo"]["currentLevel"],
        "semi-professional"
    );
    assert_eq!(created["profile"]["contact"]["email"], "contact@asha.example.com");
    assert_eq!(created["profile"]["achievements"][0]["title"], "State 400m gold");

    let own: Value = server
        .client
        .get(server.url("/api/profiles"))
        .bearer_auth(&user.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(own["id"], created["profile"]["id"]);
    assert_eq!(own["location"], "Pune");
}

#[tokio::test]
async fn test_one_profile_per_account() {
    let server = TestServer::new().await;
    let user = server.register("Asha", "asha@example.com").await;
    server.create_profile(&user, "Asha").await;

    let response = server
        .client
        .post(server.url("/api/profiles/create-profile"))
        .bearer_auth(&user.token)
        .json(&json!({ "fullName": "Asha Again" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 409);
}

#[tokio::test]
async fn test_create_profile_validation() {
    let server = TestServer::new().await;
    let user = server.register("Asha", "asha@example.com").await;

    let missing_name = server
        .client
        .post(server.url("/api/profiles/create-profile"))
        .bearer_auth(&user.token)
        .json(&json!({ "location": "Pune" }))
        .send()
        .await
        .unwrap();
    assert_eq!(missing_name.status(), 400);

    let projection_field = server
        .client
        .post(server.url("/api/profiles/create-profile"))
        .bearer_auth(&user.token)
        .json(&json!({ "fullName": "Asha", "followers": ["someone"] }))
        .send()
        .await
        .unwrap();
    assert!(projection_field.status().is_client_error());

    let bad_level = server
        .client
        .post(server.url("/api/profiles/create-profile"))
        .bearer_auth(&user.token)
        .json(&json!({ "fullName": "Asha", "currentLevel": "legendary" }))
        .send()
        .await
        .unwrap();
    assert!(bad_level.status().is_client_error());
}

#[tokio::test]
async fn test_partial_update() {
    let server = TestServer::new().await;
    let user = server.register("Asha", "asha@example.com").await;
    server.create_profile(&user, "Asha").await;

    let response = server
        .client
        .put(server.url("/api/profiles"))
        .bearer_auth(&user.token)
        .json(&json!({ "bio": "400m specialist", "primarySport": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let updated: Value = response.json().await.unwrap();
    assert_eq!(updated["fullName"], "Asha");
    assert_eq!(updated["athleticInfo"]["bio"], "400m specialist");
    assert_eq!(updated["athleticInfo"]["primarySport"], Value::Null);
    assert_eq!(updated["athleticInfo"]["currentLevel"], "intermediate");
}

#[tokio::test]
async fn test_update_without_profile() {
    let server = TestServer::new().await;
    let user = server.register("Asha", "asha@example.com").await;

    let response = server
        .client
        .put(server.url("/api/profiles"))
        .bearer_auth(&user.token)
        .json(&json!({ "bio": "hello" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    let own = server
        .client
        .get(server.url("/api/profiles"))
        .bearer_auth(&user.token)
        .send()
        .await
        .unwrap();
    assert_eq!(own.status(), 404);
}

#[tokio::test]
async fn test_list_profiles() {
    let server = TestServer::new().await;
    let asha = server.register("Asha", "asha@example.com").await;
    let ravi = server.register("Ravi", "ravi@example.com").await;
    server.create_profile(&asha, "Asha").await;
    let ravi_profile = server.create_profile(&ravi, "Ravi").await;

    let all: Vec<Value> = server
        .client
        .get(server.url("/api/profiles/all"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(all.len(), 2);

    let others: Vec<Value> = server
        .client
        .get(server.url("/api/profiles/all-except-me"))
        .bearer_auth(&asha.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(others.len(), 1);
    assert_eq!(others[0]["id"], ravi_profile.as_str());
}

#[tokio::test]
async fn test_profile_details_include_posts() {
    let server = TestServer::new().await;
    let asha = server.register("Asha", "asha@example.com").await;
    let profile = server.create_profile(&asha, "Asha").await;

    let response = server
        .client
        .post(server.url("/api/blogs/create-blog"))
        .bearer_auth(&asha.token)
        .json(&json!({
            "title": "Race day",
            "summary": "Notes",
            "content": "<p>Went well</p>",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);

    let details: Value = server
        .client
        .get(server.url(&format!("/api/profiles/{profile}")))
        .bearer_auth(&asha.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(details["user"]["id"], asha.id.as_str());
    assert_eq!(details["user"]["email"], "asha@example.com");
    assert_eq!(details["posts"].as_array().unwrap().len(), 1);
    assert_eq!(details["posts"][0]["title"], "Race day");

    let missing = server
        .client
        .get(server.url("/api/profiles/missing"))
        .bearer_auth(&asha.token)
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), 404);
}

#[tokio::test]
async fn test_delete_profile() {
    let server = TestServer::new().await;
    let asha = server.register("Asha", "asha@example.com").await;
    let ravi = server.register("Ravi", "ravi@example.com").await;
    let asha_profile = server.create_profile(&asha, "Asha").await;
    let ravi_profile = server.create_profile(&ravi, "Ravi").await;

    server
        .client
        .post(server.url("/api/follow"))
        .bearer_auth(&asha.token)
        .json(&json!({ "followeeId": ravi_profile }))
        .send()
        .await
        .unwrap();

    let forbidden = server
        .client
        .delete(server.url(&format!("/api/profiles/profile/{asha_profile}")))
        .bearer_auth(&ravi.token)
        .send()
        .await
        .unwrap();
    assert_eq!(forbidden.status(), 403);

    let deleted = server
        .client
        .delete(server.url(&format!("/api/profiles/profile/{asha_profile}")))
        .bearer_auth(&asha.token)
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status(), 200);

    let ravi_view: Value = server
        .client
        .get(server.url(&format!("/api/profiles/{ravi_profile}")))
        .bearer_auth(&ravi.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(ravi_view["followers"], json!([]));

    // The account-level edge is kept
    assert_eq!(server.stats(&ravi.id).await["followersCount"], 1);

    let again = server
        .client
        .delete(server.url(&format!("/api/profiles/profile/{asha_profile}")))
        .bearer_auth(&asha.token)
        .send()
        .await
        .unwrap();
    assert_eq!(again.status(), 404);
}
