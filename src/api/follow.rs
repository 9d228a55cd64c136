//! Profile-addressed follow endpoints
//!
//! Targets are profile IDs; the graph itself is account-to-account.

use axum::{
    Router,
    extract::{Path, State},
    response::Json,
    routing::{delete, post},
};

use super::dto::{FollowProfileRequest, MessageResponse};
use crate::AppState;
use crate::auth::CurrentUser;
use crate::error::AppError;

/// Create follow router
///
/// Routes:
/// - POST /api/follow - Follow the owner of `followeeId`
/// - DELETE /api/follow/:id - Unfollow the owner of profile `id`
pub fn follow_router() -> Router<AppState> {
    Router::new()
        .route("/", post(follow_profile))
        .route("/:id", delete(unfollow_profile))
}

async fn follow_profile(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Json(req): Json<FollowProfileRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    state
        .graph
        .follow_profile(&session.account_id, &req.followee_id)
        .await?;
    Ok(Json(MessageResponse::new("User followed successfully.")))
}

async fn unfollow_profile(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    state.graph.unfollow_profile(&session.account_id, &id).await?;
    Ok(Json(MessageResponse::new("User unfollowed successfully.")))
}
