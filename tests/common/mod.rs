//! Common test utilities for E2E tests

#![allow(dead_code)]

use growathlete::{AppState, config};
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::net::TcpListener;

pub const ADMIN_EMAIL: &str = "admin@test.example.com";
pub const ADMIN_PASSWORD: &str = "admin-password-123";
pub const TEST_PASSWORD: &str = "password123";
pub const ALLOWED_ORIGIN: &str = "https://app.test.example.com";

/// A registered account as seen by the tests
pub struct TestUser {
    pub id: String,
    pub token: String,
}

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub _temp_dir: TempDir,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Create a new test server instance
    pub async fn new() -> Self {
        // Create temporary directory for test database
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        // Create test configuration
        let config = config::AppConfig {
            server: config::ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Let OS assign port
                allowed_origins: vec![ALLOWED_ORIGIN.to_string()],
            },
            database: config::DatabaseConfig {
                path: db_path.clone(),
            },
            auth: config::AuthConfig {
                session_secret: "test-secret-key-that-is-32-bytes-long!!".to_string(),
                session_max_age: 604800,
                secure_cookies: false,
            },
            admin: config::AdminConfig {
                email: Some(ADMIN_EMAIL.to_string()),
                password: Some(ADMIN_PASSWORD.to_string()),
                full_name: "Test Admin".to_string(),
            },
            graph: config::GraphConfig {
                exact_counts: false,
                reconcile_on_startup: true,
            },
            logging: config::LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        };

        growathlete::metrics::init_metrics();

        // Initialize app state
        let state = AppState::new(config).await.unwrap();

        // Create HTTP client
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let addr_str = format!("http://{}", addr);

        let app = growathlete::build_router(state.clone());

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait a bit for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Self {
            addr: addr_str,
            state,
            _temp_dir: temp_dir,
            client,
        }
    }

    /// Get base URL for API requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    /// Register an athlete through the API and return its ID and token
    pub async fn register(&self, full_name: &str, email: &str) -> TestUser {
        let response = self
            .client
            .post(self.url("/api/auth/register"))
            .json(&json!({
                "fullName": full_name,
                "email": email,
                "password": TEST_PASSWORD,
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 201, "registration of {email} failed");

        let body: Value = response.json().await.unwrap();
        TestUser {
            id: body["user"]["id"].as_str().unwrap().to_string(),
            token: body["token"].as_str().unwrap().to_string(),
        }
    }

    /// Log in as the bootstrap admin
    pub async fn login_admin(&self) -> TestUser {
        let response = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);

        let body: Value = response.json().await.unwrap();
        TestUser {
            id: body["user"]["id"].as_str().unwrap().to_string(),
            token: body["token"].as_str().unwrap().to_string(),
        }
    }

    /// Create a profile for the user and return its ID
    pub async fn create_profile(&self, user: &TestUser, full_name: &str) -> String {
        let response = self
            .client
            .post(self.url("/api/profiles/create-profile"))
            .bearer_auth(&user.token)
            .json(&json!({
                "fullName": full_name,
                "primarySport": "athletics",
                "currentLevel": "intermediate",
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 201);

        let body: Value = response.json().await.unwrap();
        body["profile"]["id"].as_str().unwrap().to_string()
    }

    /// GET /api/users/:id/profile-stats
    pub async fn stats(&self, account_id: &str) -> Value {
        let response = self
            .client
            .get(self.url(&format!("/api/users/{account_id}/profile-stats")))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        response.json().await.unwrap()
    }
}
