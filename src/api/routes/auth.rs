//! Auth Routes
//!
//! - POST /api/auth - Log in, setting the `auth_token` cookie
//! - GET /api/auth - Current user
//! - PUT /api/auth - Create or update an account
//! - DELETE /api/auth - Log out
//! - GET /api/auth/check - Session summary

use axum::{
    extract::State,
    http::header::SET_COOKIE,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::api::dto::{
    parse_optional_scope, parse_role, AccountRequest, LoginRequest, LoginResponse,
    SessionCheckResponse, SuccessResponse, UserResponse,
};
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::ApiJson;
use crate::api::state::AppState;
use crate::auth::session::{clear_cookie, session_cookie};
use crate::auth::{OptionalSession, Permission, Session};
use crate::store::AccountUpsert;

/// POST /api/auth
///
/// Check credentials and start a session.
pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let registry = state.store.read().await;

    let Some(account) = registry.accounts.authenticate(&req.username, &req.password) else {
        tracing::info!(username = %req.username, "Login failed");
        return Err(ApiError::Unauthorized(
            "Неверное имя пользователя или пароль".to_string(),
        ));
    };

    let token = state.tokens.issue(account)?;
    let cookie = session_cookie(
        &token,
        state.tokens.ttl_seconds(),
        state.config.auth.secure_cookies,
    )?;

    tracing::info!(username = %account.username, role = %account.role, "Login succeeded");

    Ok((
        [(SET_COOKIE, cookie)],
        Json(LoginResponse {
            user: UserResponse::from(account),
            token,
        }),
    ))
}

/// GET /api/auth
pub async fn current_user(Session(claims): Session) -> Json<UserResponse> {
    Json(UserResponse::from(&claims))
}

/// GET /api/auth/check
pub async fn check(Session(claims): Session) -> Json<SessionCheckResponse> {
    Json(SessionCheckResponse {
        id: claims.id,
        username: claims.username,
        role: claims.role,
    })
}

/// PUT /api/auth
///
/// Create an account, or update the one with this username.
pub async fn upsert_account(
    State(state): State<Arc<AppState>>,
    session: OptionalSession,
    ApiJson(req): ApiJson<AccountRequest>,
) -> ApiResult<Json<UserResponse>> {
    state.authorize(&session, Permission::Administer)?;

    let upsert = AccountUpsert {
        role: parse_role(req.role.as_deref())?,
        hospital: parse_optional_scope(req.hospital.as_deref())?,
        assigned_hospital: parse_optional_scope(req.assigned_hospital.as_deref())?,
        username: req.username,
        password: req.password,
    };

    let mut registry = state.store.write().await;
    let account = registry.accounts.upsert(upsert)?;

    tracing::info!(username = %account.username, role = %account.role, "Account saved");
    Ok(Json(UserResponse::from(&account)))
}

/// DELETE /api/auth
pub async fn logout(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let cookie = clear_cookie(state.config.auth.secure_cookies)?;
    Ok(([(SET_COOKIE, cookie)], Json(SuccessResponse::ok())))
}
