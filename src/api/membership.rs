//! Membership plan endpoints

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
};

use super::converters::plan_to_response;
use super::dto::{MembershipPlanResponse, PlanCreatedResponse};
use crate::AppState;
use crate::auth::AdminUser;
use crate::error::AppError;
use crate::service::NewPlan;

/// Create membership router
///
/// Routes:
/// - GET /api/membership/plans
/// - POST /api/membership/plans - Admin only
pub fn membership_router() -> Router<AppState> {
    Router::new().route("/plans", get(list_plans).post(create_plan))
}

async fn list_plans(
    State(state): State<AppState>,
) -> Result<Json<Vec<MembershipPlanResponse>>, AppError> {
    let plans = state.membership.list_plans().await?;
    Ok(Json(plans.iter().map(plan_to_response).collect()))
}

async fn create_plan(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Json(req): Json<NewPlan>,
) -> Result<impl IntoResponse, AppError> {
    let plan = state.membership.create_plan(req).await?;
    Ok((
        StatusCode::CREATED,
        Json(PlanCreatedResponse {
            message: "Membership plan created successfully".to_string(),
            plan: plan_to_response(&plan),
        }),
    ))
}
