//! Account and account-level follow endpoints

use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{delete, get, post},
};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};

use super::converters::{account_to_response, account_to_summary};
use super::dto::*;
use crate::AppState;
use crate::auth::{AdminUser, CurrentUser, SESSION_COOKIE, Session, create_session_token};
use crate::data::{Account, Role};
use crate::error::AppError;
use crate::service::{AccountStats, NewAccount, ReconcileReport};

/// Create auth router
///
/// Routes:
/// - POST /api/auth/register
/// - POST /api/auth/login
/// - POST /api/auth/logout
pub fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
}

/// Create users router
///
/// Routes:
/// - POST /api/users/register, /api/users/login
/// - GET /api/users/profile - Current account
/// - POST /api/users/:id/follow
/// - DELETE /api/users/:id/unfollow
/// - GET /api/users/:id/profile-stats
/// - GET /api/users/:id/following/:following_id - Follow check
/// - GET /api/users/:id/followers, /api/users/:id/following
/// - POST /api/users/:id/reconcile - Admin only
pub fn users_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/profile", get(current_account))
        .route("/:id/follow", post(follow_account))
        .route("/:id/unfollow", delete(unfollow_account))
        .route("/:id/profile-stats", get(profile_stats))
        .route("/:id/following/:following_id", get(is_following))
        .route("/:id/followers", get(list_followers))
        .route("/:id/following", get(list_following))
        .route("/:id/reconcile", post(reconcile_account))
}

fn session_response(
    state: &AppState,
    jar: CookieJar,
    account: &Account,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    let session = Session::new(
        account.id.clone(),
        Role::from_stored(&account.role),
        state.config.auth.session_max_age,
    );
    let token = create_session_token(&session, &state.config.auth.session_secret)?;

    let cookie = Cookie::build((SESSION_COOKIE, token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.config.auth.secure_cookies);

    Ok((
        jar.add(cookie),
        Json(AuthResponse {
            token,
            user: account_to_response(account),
        }),
    ))
}

/// POST /api/auth/register
async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let account = state
        .accounts
        .register(NewAccount {
            full_name: req.full_name,
            email: req.email,
            password: req.password,
            role: req.role,
        })
        .await?;

    let (jar, body) = session_response(&state, jar, &account)?;
    Ok((StatusCode::CREATED, jar, body))
}

/// POST /api/auth/login
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let account = state.accounts.authenticate(&req.email, &req.password).await?;
    tracing::info!(account = %account.id, "Login succeeded");
    session_response(&state, jar, &account)
}

/// POST /api/auth/logout
///
/// Clears the session cookie. Bearer tokens stay valid until they expire.
async fn logout(jar: CookieJar) -> impl IntoResponse {
    (
        jar.remove(Cookie::build(SESSION_COOKIE).path("/")),
        Json(MessageResponse::new("Logged out")),
    )
}

/// GET /api/users/profile
async fn current_account(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
) -> Result<Json<AccountResponse>, AppError> {
    let account = state.accounts.get_account(&session.account_id).await?;
    Ok(Json(account_to_response(&account)))
}

/// POST /api/users/:id/follow
async fn follow_account(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    state.graph.follow(&session.account_id, &id).await?;
    Ok(Json(MessageResponse::new("User followed successfully.")))
}

/// DELETE /api/users/:id/unfollow
async fn unfollow_account(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    state.graph.unfollow(&session.account_id, &id).await?;
    Ok(Json(MessageResponse::new("User unfollowed successfully.")))
}

/// GET /api/users/:id/profile-stats
async fn profile_stats(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<AccountStats>, AppError> {
    Ok(Json(state.graph.get_stats(&id, query.exact).await?))
}

/// GET /api/users/:id/following/:following_id
async fn is_following(
    State(state): State<AppState>,
    CurrentUser(_session): CurrentUser,
    Path((follower_id, following_id)): Path<(String, String)>,
) -> Result<Json<FollowStatusResponse>, AppError> {
    let is_following = state.graph.is_following(&follower_id, &following_id).await?;
    Ok(Json(FollowStatusResponse { is_following }))
}

/// GET /api/users/:id/followers
async fn list_followers(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<AccountSummary>>, AppError> {
    if !state.db.account_exists(&id).await? {
        return Err(AppError::NotFound("User"));
    }
    let followers = state.db.get_followers(&id).await?;
    Ok(Json(followers.iter().map(account_to_summary).collect()))
}

/// GET /api/users/:id/following
async fn list_following(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<AccountSummary>>, AppError> {
    if !state.db.account_exists(&id).await? {
        return Err(AppError::NotFound("User"));
    }
    let following = state.db.get_following(&id).await?;
    Ok(Json(following.iter().map(account_to_summary).collect()))
}

/// POST /api/users/:id/reconcile
async fn reconcile_account(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
) -> Result<Json<ReconcileReport>, AppError> {
    let report = state.graph.reconcile(&id).await?;
    tracing::info!(admin = %admin.account_id, account = %id, drifted = report.drifted, "Reconcile requested");
    Ok(Json(report))
}
