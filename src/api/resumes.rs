//! Resume endpoints

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
};

use super::converters::resume_to_response;
use super::dto::ResumeResponse;
use crate::AppState;
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::service::ResumePatch;

/// Create resumes router
///
/// Routes:
/// - GET /api/resumes - Caller's resume
/// - POST /api/resumes
/// - GET /api/resumes/:id - Owner or admin
/// - PUT /api/resumes/:id - Owner only
pub fn resumes_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_own_resume).post(create_resume))
        .route("/:id", get(get_resume).put(update_resume))
}

async fn create_resume(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Json(req): Json<ResumePatch>,
) -> Result<impl IntoResponse, AppError> {
    state.resumes.create(&session.account_id, req).await?;
    let details = state.resumes.get_own(&session.account_id).await?;
    Ok((StatusCode::CREATED, Json(resume_to_response(&details))))
}

async fn get_own_resume(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
) -> Result<Json<ResumeResponse>, AppError> {
    let details = state.resumes.get_own(&session.account_id).await?;
    Ok(Json(resume_to_response(&details)))
}

async fn get_resume(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<ResumeResponse>, AppError> {
    let details = state.resumes.get(&id, &session).await?;
    Ok(Json(resume_to_response(&details)))
}

async fn update_resume(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<ResumePatch>,
) -> Result<Json<ResumeResponse>, AppError> {
    let details = state.resumes.update(&id, &session.account_id, req).await?;
    Ok(Json(resume_to_response(&details)))
}
