//! Profile endpoints

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{delete, get, post},
};

use super::converters::{profile_details_to_response, profile_to_response};
use super::dto::*;
use crate::AppState;
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::service::ProfilePatch;

/// Create profiles router
///
/// Routes:
/// - GET/PUT /api/profiles - Own profile
/// - POST /api/profiles/create-profile
/// - GET /api/profiles/all
/// - GET /api/profiles/all-except-me
/// - GET /api/profiles/:id
/// - POST /api/profiles/:id/follow, /api/profiles/:id/unfollow
/// - DELETE /api/profiles/profile/:id
pub fn profiles_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_own_profile).put(update_own_profile))
        .route("/create-profile", post(create_profile))
        .route("/all", get(list_profiles))
        .route("/all-except-me", get(list_other_profiles))
        .route("/:id", get(get_profile))
        .route("/:id/follow", post(follow_profile))
        .route("/:id/unfollow", post(unfollow_profile))
        .route("/profile/:id", delete(delete_profile))
}

/// POST /api/profiles/create-profile
async fn create_profile(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Json(req): Json<ProfilePatch>,
) -> Result<impl IntoResponse, AppError> {
    let profile = state.profiles.create(&session.account_id, req).await?;
    Ok((
        StatusCode::CREATED,
        Json(ProfileCreatedResponse {
            message: "Profile created successfully".to_string(),
            profile: profile_to_response(&profile),
        }),
    ))
}

/// GET /api/profiles
async fn get_own_profile(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
) -> Result<Json<ProfileResponse>, AppError> {
    let profile = state.profiles.get_own(&session.account_id).await?;
    Ok(Json(profile_to_response(&profile)))
}

/// PUT /api/profiles
async fn update_own_profile(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Json(req): Json<ProfilePatch>,
) -> Result<Json<ProfileResponse>, AppError> {
    let profile = state.profiles.update(&session.account_id, req).await?;
    Ok(Json(profile_to_response(&profile)))
}

/// GET /api/profiles/all
async fn list_profiles(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProfileResponse>>, AppError> {
    let profiles = state.profiles.list_all().await?;
    Ok(Json(profiles.iter().map(profile_to_response).collect()))
}

/// GET /api/profiles/all-except-me
async fn list_other_profiles(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
) -> Result<Json<Vec<ProfileResponse>>, AppError> {
    let profiles = state.profiles.list_except(&session.account_id).await?;
    Ok(Json(profiles.iter().map(profile_to_response).collect()))
}

/// GET /api/profiles/:id
async fn get_profile(
    State(state): State<AppState>,
    CurrentUser(_session): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<ProfileDetailsResponse>, AppError> {
    let details = state.profiles.get_details(&id).await?;
    Ok(Json(profile_details_to_response(&details)))
}

/// POST /api/profiles/:id/follow
///
/// Returns the followed profile with refreshed lists.
async fn follow_profile(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<ProfileDetailsResponse>, AppError> {
    state.graph.follow_profile(&session.account_id, &id).await?;
    let details = state.profiles.get_details(&id).await?;
    Ok(Json(profile_details_to_response(&details)))
}

/// POST /api/profiles/:id/unfollow
async fn unfollow_profile(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<ProfileDetailsResponse>, AppError> {
    state.graph.unfollow_profile(&session.account_id, &id).await?;
    let details = state.profiles.get_details(&id).await?;
    Ok(Json(profile_details_to_response(&details)))
}

/// DELETE /api/profiles/profile/:id
async fn delete_profile(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    state.profiles.delete(&session.account_id, &id).await?;
    Ok(Json(MessageResponse::new("Profile deleted successfully")))
}
