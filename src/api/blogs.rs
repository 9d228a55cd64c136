//! Blog post endpoints

use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
};

use super::converters::blog_post_to_response;
use super::dto::*;
use crate::AppState;
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::service::BlogPatch;

/// Create blogs router
///
/// Routes:
/// - GET /api/blogs?category= - Published public posts
/// - POST /api/blogs/create-blog
/// - GET /api/blogs/categories
/// - GET/PUT/DELETE /api/blogs/blog/:id
/// - GET /api/blogs/user/:user_id
pub fn blogs_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_public_posts))
        .route("/create-blog", post(create_post))
        .route("/categories", get(list_categories))
        .route(
            "/blog/:id",
            get(get_post).put(update_post).delete(delete_post),
        )
        .route("/user/:user_id", get(list_author_posts))
}

async fn create_post(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Json(req): Json<BlogPatch>,
) -> Result<impl IntoResponse, AppError> {
    let post = state.blogs.create(&session.account_id, req).await?;
    Ok((
        StatusCode::CREATED,
        Json(BlogCreatedResponse {
            message: "Blog post created successfully".to_string(),
            blog: blog_post_to_response(&post),
        }),
    ))
}

async fn list_public_posts(
    State(state): State<AppState>,
    Query(query): Query<BlogListQuery>,
) -> Result<Json<BlogListResponse>, AppError> {
    let posts = state.blogs.list_public(query.category.as_deref()).await?;
    Ok(Json(BlogListResponse {
        total_blogs: posts.len(),
        blogs: posts.iter().map(blog_post_to_response).collect(),
    }))
}

async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(state.blogs.categories().await?))
}

async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BlogPostResponse>, AppError> {
    let post = state.blogs.get(&id).await?;
    Ok(Json(blog_post_to_response(&post)))
}

async fn update_post(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<BlogPatch>,
) -> Result<Json<BlogPostResponse>, AppError> {
    let post = state.blogs.update(&id, &session.account_id, req).await?;
    Ok(Json(blog_post_to_response(&post)))
}

async fn delete_post(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    state.blogs.delete(&id, &session.account_id).await?;
    Ok(Json(MessageResponse::new("Blog post deleted")))
}

async fn list_author_posts(
    State(state): State<AppState>,
    CurrentUser(_session): CurrentUser,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<BlogPostResponse>>, AppError> {
    let posts = state.blogs.list_by_author(&user_id).await?;
    Ok(Json(posts.iter().map(blog_post_to_response).collect()))
}
