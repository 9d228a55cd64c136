//! Error types for GrowAthlete
//!
//! All errors in the application are converted to `AppError`,
//! which implements `IntoResponse` for proper HTTP error responses.
//! Follow-graph rejections live in `GraphError` and are wrapped by
//! `AppError::Graph`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Application-wide error type
///
/// This enum represents all possible errors that can occur
/// in the application. It implements `IntoResponse` to
/// automatically convert errors to appropriate HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Resource not found (404)
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Authentication required (401)
    #[error("Authentication required")]
    Unauthorized,

    /// Invalid credentials on login (401)
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Access denied (403)
    #[error("Access denied")]
    Forbidden,

    /// Validation error (400)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Uniqueness conflict (409)
    #[error("{0}")]
    Conflict(String),

    /// Follow graph rejection or failure
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Database error (500)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Signature verification failed (401)
    #[error("Invalid signature")]
    InvalidSignature,

    /// Configuration error (500)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Encryption/hashing error (500)
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Internal server error (500)
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Follow graph error taxonomy
///
/// Everything except `Storage` and `StorageUnavailable` is a business-rule
/// rejection that is reported to the caller as a declined request.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("You cannot follow yourself")]
    SelfFollow,

    /// Edge endpoints are identical (repository level)
    #[error("An account cannot be linked to itself")]
    SelfReference,

    #[error("User not found")]
    TargetNotFound,

    #[error("You are already following this user")]
    AlreadyFollowing,

    #[error("You are not following this user")]
    NotFollowing,

    /// Unique constraint hit on edge insert; callers map this to `AlreadyFollowing`
    #[error("Follow relationship already exists")]
    DuplicateEdge,

    /// Edge delete found nothing; callers map this to `NotFollowing`
    #[error("Follow relationship not found")]
    NotFound,

    /// Cached projection disagrees with the edge table
    #[error(
        "Projection drift on account {account_id}: {field} stored {stored}, edges say {actual}"
    )]
    InconsistentState {
        account_id: String,
        field: &'static str,
        stored: i64,
        actual: i64,
    },

    /// Transient storage failure persisted after a retry
    #[error("Storage temporarily unavailable")]
    StorageUnavailable,

    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl GraphError {
    fn status_and_type(&self) -> (StatusCode, &'static str) {
        match self {
            GraphError::SelfFollow => (StatusCode::BAD_REQUEST, "self_follow"),
            GraphError::SelfReference => (StatusCode::BAD_REQUEST, "self_reference"),
            GraphError::TargetNotFound => (StatusCode::NOT_FOUND, "target_not_found"),
            GraphError::AlreadyFollowing | GraphError::DuplicateEdge => {
                (StatusCode::CONFLICT, "already_following")
            }
            GraphError::NotFollowing | GraphError::NotFound => {
                (StatusCode::CONFLICT, "not_following")
            }
            GraphError::InconsistentState { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "inconsistent_state")
            }
            GraphError::StorageUnavailable => {
                (StatusCode::SERVICE_UNAVAILABLE, "storage_unavailable")
            }
            GraphError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database"),
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl IntoResponse for AppError {
    /// Convert error to HTTP response
    ///
    /// Maps each error variant to appropriate HTTP status code
    /// and JSON error body.
    fn into_response(self) -> Response {
        use axum::Json;

        let (status, error_message, error_type) = match &self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string(), "not_found"),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string(), "unauthorized"),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                self.to_string(),
                "invalid_credentials",
            ),
            AppError::InvalidSignature => (
                StatusCode::UNAUTHORIZED,
                self.to_string(),
                "invalid_signature",
            ),
            AppError::Forbidden => (StatusCode::FORBIDDEN, self.to_string(), "forbidden"),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone(), "validation"),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone(), "conflict"),
            AppError::Graph(GraphError::Storage(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error".to_string(),
                "database",
            ),
            AppError::Graph(graph) => {
                let (status, error_type) = graph.status_and_type();
                (status, graph.to_string(), error_type)
            }
            AppError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error".to_string(),
                "database",
            ),
            AppError::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone(), "config"),
            AppError::Encryption(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                "encryption",
            ),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                "internal",
            ),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, error_type, "Request failed");
        }

        // Record error metric
        use crate::metrics::ERRORS_TOTAL;
        ERRORS_TOTAL.with_label_values(&[error_type]).inc();

        let body = Json(serde_json::json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
