//! Contact form endpoints

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
};

use super::converters::contact_message_to_response;
use super::dto::{ContactMessageResponse, MessageResponse};
use crate::AppState;
use crate::auth::AdminUser;
use crate::error::AppError;
use crate::service::NewContactMessage;

/// Create contact router
///
/// Routes:
/// - POST /api/contact - Public form submission
/// - GET /api/contact/messages - Admin only
pub fn contact_router() -> Router<AppState> {
    Router::new()
        .route("/", post(submit_message))
        .route("/messages", get(list_messages))
}

async fn submit_message(
    State(state): State<AppState>,
    Json(req): Json<NewContactMessage>,
) -> Result<impl IntoResponse, AppError> {
    state.contact.submit(req).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Contact form submitted successfully!")),
    ))
}

async fn list_messages(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<Vec<ContactMessageResponse>>, AppError> {
    let messages = state.contact.list_messages().await?;
    Ok(Json(messages.iter().map(contact_message_to_response).collect()))
}
