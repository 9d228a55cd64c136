//! GrowAthlete - A REST backend for athlete networking
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      API Layer (Axum)                        │
//! │  - Accounts, profiles, blog posts, membership plans          │
//! │  - Account- and profile-addressed follow endpoints           │
//! │  - Communities, feed, resumes, contact form                  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Service Layer                            │
//! │  - Graph consistency (edges + projections, one transaction)  │
//! │  - Account, profile, blog and plan logic                     │
//! │  - Community feed with set-membership likes                  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Data Layer                              │
//! │  - SQLite (sqlx)                                             │
//! │  - Follow edges and their derived projections                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - `api`: HTTP handlers
//! - `service`: Business logic layer
//! - `data`: Database layer
//! - `auth`: Passwords, session tokens and extractors
//! - `config`: Configuration management
//! - `error`: Error types
//! - `metrics`: Prometheus instruments

pub mod api;
pub mod auth;
pub mod config;
pub mod data;
pub mod error;
pub mod metrics;
pub mod service;

use std::sync::Arc;

/// Application state shared across all handlers
///
/// Cloned for each request; everything inside is reference counted.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<config::AppConfig>,

    /// Database connection pool
    pub db: Arc<data::Database>,

    /// Follow graph (the only writer of edges and projections)
    pub graph: Arc<service::GraphService>,

    pub accounts: Arc<service::AccountService>,
    pub profiles: Arc<service::ProfileService>,
    pub blogs: Arc<service::BlogService>,
    pub membership: Arc<service::MembershipService>,
    pub communities: Arc<service::CommunityService>,
    pub resumes: Arc<service::ResumeService>,
    pub contact: Arc<service::ContactService>,
}

impl AppState {
    /// Initialize application state
    ///
    /// # Steps
    /// 1. Connect to SQLite database (runs migrations)
    /// 2. Build services
    /// 3. Ensure the configured admin account
    /// 4. Optionally reconcile graph projections
    ///
    /// # Errors
    /// Returns error if any initialization step fails
    pub async fn new(config: config::AppConfig) -> Result<Self, error::AppError> {
        tracing::info!("Initializing application state...");

        // 1. Connect to SQLite database
        let db = Arc::new(data::Database::connect(&config.database.path).await?);
        tracing::info!(path = %config.database.path.display(), "Database connected");

        // 2. Build services
        let graph = Arc::new(service::GraphService::new(
            db.clone(),
            config.graph.exact_counts,
        ));
        let accounts = Arc::new(service::AccountService::new(db.clone()));
        let profiles = Arc::new(service::ProfileService::new(db.clone()));
        let blogs = Arc::new(service::BlogService::new(db.clone()));
        let membership = Arc::new(service::MembershipService::new(db.clone()));
        let communities = Arc::new(service::CommunityService::new(db.clone()));
        let resumes = Arc::new(service::ResumeService::new(db.clone()));
        let contact = Arc::new(service::ContactService::new(db.clone()));

        // 3. Initialize admin user
        accounts.ensure_admin(&config.admin).await?;

        // 4. Reconcile projections
        if config.graph.reconcile_on_startup {
            let drifted = graph.reconcile_all().await?;
            if drifted > 0 {
                tracing::warn!(drifted, "Reconciled drifted follow projections on startup");
            } else {
                tracing::info!("Follow projections consistent");
            }
        }

        tracing::info!("Application state initialized successfully");

        Ok(Self {
            config: Arc::new(config),
            db,
            graph,
            accounts,
            profiles,
            blogs,
            membership,
            communities,
            resumes,
            contact,
        })
    }
}

/// Build the Axum router with all routes.
///
/// This is shared by the binary and integration tests to keep route
/// composition consistent across environments.
pub fn build_router(state: AppState) -> axum::Router {
    use axum::Router;
    use tower_http::{compression::CompressionLayer, trace::TraceLayer};

    let cors_layer = build_cors_layer(&state.config.server);

    Router::new()
        .route("/health", axum::routing::get(health_check))
        .nest("/api/auth", api::auth_router())
        .nest("/api/users", api::users_router())
        .nest("/api/follow", api::follow_router())
        .nest("/api/profiles", api::profiles_router())
        .nest("/api/blogs", api::blogs_router())
        .nest("/api/membership", api::membership_router())
        .nest("/api/communities", api::communities_router())
        .nest("/api/community-posts", api::community_posts_router())
        .nest("/api/resumes", api::resumes_router())
        .nest("/api/contact", api::contact_router())
        .merge(api::metrics_router())
        .layer(axum::middleware::from_fn(api::track_http_metrics))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

fn build_cors_layer(server: &config::ServerConfig) -> tower_http::cors::CorsLayer {
    use axum::http::{HeaderValue, Method, header};
    use tower_http::cors::CorsLayer;

    if server.allowed_origins.is_empty() {
        tracing::warn!("server.allowed_origins is empty; cross-origin requests will be refused");
    }

    let origins: Vec<HeaderValue> = server
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::error!(%error, origin = %origin, "Ignoring unparsable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

async fn health_check() -> &'static str {
    "OK"
}
