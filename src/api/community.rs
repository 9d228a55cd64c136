//! Community and community feed endpoints

use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post, put},
};

use super::converters::*;
use super::dto::*;
use crate::AppState;
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::service::{CommunityPatch, NewCommunityPost, PageRequest};

/// Create communities router
///
/// Routes:
/// - GET /api/communities - Alphabetical list
/// - POST /api/communities
/// - GET/PUT/DELETE /api/communities/:id - Changes by creator or admin
pub fn communities_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_communities).post(create_community))
        .route(
            "/:id",
            get(get_community)
                .put(update_community)
                .delete(delete_community),
        )
}

/// Create community posts router
///
/// Routes:
/// - GET /api/community-posts?page=&limit=&community= - Newest first
/// - POST /api/community-posts
/// - GET/DELETE /api/community-posts/:id - Delete by author or admin
/// - PUT /api/community-posts/:id/like - Toggle the caller's like
/// - POST /api/community-posts/:id/comment
pub fn community_posts_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_posts).post(create_post))
        .route("/:id", get(get_post).delete(delete_post))
        .route("/:id/like", put(toggle_like))
        .route("/:id/comment", post(add_comment))
}

async fn list_communities(
    State(state): State<AppState>,
) -> Result<Json<Vec<CommunityResponse>>, AppError> {
    let communities = state.communities.list_communities().await?;
    Ok(Json(communities.iter().map(community_to_response).collect()))
}

async fn create_community(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Json(req): Json<CommunityPatch>,
) -> Result<impl IntoResponse, AppError> {
    let community = state
        .communities
        .create_community(&session.account_id, req)
        .await?;
    Ok((StatusCode::CREATED, Json(community_to_response(&community))))
}

async fn get_community(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CommunityDetailsResponse>, AppError> {
    let details = state.communities.get_community_details(&id).await?;
    Ok(Json(community_details_to_response(&details)))
}

async fn update_community(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<CommunityPatch>,
) -> Result<Json<CommunityResponse>, AppError> {
    let community = state.communities.update_community(&id, &session, req).await?;
    Ok(Json(community_to_response(&community)))
}

async fn delete_community(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    state.communities.delete_community(&id, &session).await?;
    Ok(Json(MessageResponse::new("Community removed")))
}

async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<CommunityFeedQuery>,
) -> Result<Json<CommunityFeedResponse>, AppError> {
    let page = state
        .communities
        .list_posts(
            query.community.as_deref(),
            PageRequest {
                page: query.page,
                limit: query.limit,
            },
        )
        .await?;

    Ok(Json(CommunityFeedResponse {
        posts: page.posts.iter().map(post_thread_to_response).collect(),
        current_page: page.current_page,
        total_pages: page.total_pages,
        total_posts: page.total_posts,
    }))
}

async fn create_post(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Json(req): Json<NewCommunityPost>,
) -> Result<impl IntoResponse, AppError> {
    let thread = state.communities.create_post(&session.account_id, req).await?;
    Ok((StatusCode::CREATED, Json(post_thread_to_response(&thread))))
}

async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CommunityPostResponse>, AppError> {
    let thread = state.communities.get_post(&id).await?;
    Ok(Json(post_thread_to_response(&thread)))
}

async fn delete_post(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    state.communities.delete_post(&id, &session).await?;
    Ok(Json(MessageResponse::new("Post removed")))
}

async fn toggle_like(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<LikesResponse>, AppError> {
    let toggle = state
        .communities
        .toggle_like(&id, &session.account_id)
        .await?;
    Ok(Json(like_toggle_to_response(toggle)))
}

async fn add_comment(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<CommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let comment = state
        .communities
        .add_comment(&id, &session.account_id, &req.text)
        .await?;
    Ok((StatusCode::CREATED, Json(comment_to_response(&comment))))
}
