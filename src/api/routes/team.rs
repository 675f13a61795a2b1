//! Team Routes
//!
//! - GET /api/team?hospital= - Leader, deputies and minister
//! - POST /api/team - Appoint a leader, minister or deputy
//! - DELETE /api/team?hospital=&role=&position= - Remove a member

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::api::dto::{
    parse_int, parse_scope, HospitalQuery, SuccessResponse, TeamDeleteQuery, TeamRequest,
};
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::{ApiJson, ApiQuery};
use crate::api::state::AppState;
use crate::auth::{OptionalSession, Permission, SessionClaims};
use crate::store::{Hospital, HospitalScope, LeaderDraft, MemberDraft, Role, StoreError, TeamView};

const BAD_HOSPITAL: &str = "Неверная больница";

/// GET /api/team
pub async fn get_team(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<HospitalQuery>,
) -> Json<TeamView> {
    let registry = state.store.read().await;
    let hospital = query.hospital.as_deref().and_then(|h| h.parse::<Hospital>().ok());
    Json(registry.team_view(hospital))
}

/// POST /api/team
pub async fn appoint_member(
    State(state): State<Arc<AppState>>,
    session: OptionalSession,
    ApiJson(req): ApiJson<TeamRequest>,
) -> ApiResult<Response> {
    let scope = parse_scope(req.hospital.as_deref(), BAD_HOSPITAL)?;

    let role = req.role.clone().unwrap_or_default();
    match role.as_str() {
        "leader" => {
            state.authorize(&session, Permission::Administer)?;
            let hospital = single_hospital(scope)?;
            let draft = LeaderDraft {
                nickname: req.name,
                vk: req.vk,
                email: req.email,
                discord: req.discord,
                forum_link: req.forum_link,
                goal: req.goal,
                login: req.login,
                password: Some(req.password),
            };

            let mut registry = state.store.write().await;
            let leader = registry.appoint_leader(hospital, draft)?;
            Ok((StatusCode::CREATED, Json(leader)).into_response())
        }
        "minister" => {
            state.authorize(&session, Permission::Administer)?;
            let draft = member_draft(req.name, req.vk, req.login, req.password);

            let mut registry = state.store.write().await;
            let minister = registry.appoint_minister(draft)?;
            Ok((StatusCode::CREATED, Json(minister)).into_response())
        }
        "deputy" => {
            let claims = state.authorize(&session, Permission::AppointDeputy)?;
            let hospital = single_hospital(scope)?;
            ensure_own_hospital(claims, hospital)?;
            let position = req
                .position
                .as_ref()
                .and_then(|p| p.as_i64())
                .ok_or_else(|| ApiError::Validation("Не указана позиция заместителя".to_string()))?;
            let draft = member_draft(req.name, req.vk, req.login, req.password);

            let mut registry = state.store.write().await;
            let deputy = registry.appoint_deputy(hospital, position, draft)?;
            Ok((StatusCode::CREATED, Json(deputy)).into_response())
        }
        _ => Err(ApiError::Validation("Неверная роль".to_string())),
    }
}

/// DELETE /api/team
///
/// Removing a member who is not there still succeeds.
pub async fn remove_member(
    State(state): State<Arc<AppState>>,
    session: OptionalSession,
    ApiQuery(query): ApiQuery<TeamDeleteQuery>,
) -> ApiResult<Json<SuccessResponse>> {
    let scope = parse_scope(query.hospital.as_deref(), BAD_HOSPITAL)?;
    let role: Role = query
        .role
        .as_deref()
        .filter(|r| !r.is_empty())
        .ok_or_else(|| ApiError::Validation("Не указана роль".to_string()))?
        .parse()?;

    match role {
        Role::Leader => {
            state.authorize(&session, Permission::Administer)?;
            if let Some(hospital) = scope.hospital() {
                let mut registry = state.store.write().await;
                match registry.remove_leader(hospital) {
                    Ok(_) | Err(StoreError::NotFound(_)) => {}
                    Err(err) => return Err(err.into()),
                }
            }
        }
        Role::Minister => {
            state.authorize(&session, Permission::Administer)?;
            let mut registry = state.store.write().await;
            if let Some(minister) = registry.remove_minister() {
                tracing::info!(minister_id = minister.id, "Removed minister");
            }
        }
        Role::Deputy => {
            let claims = state.authorize(&session, Permission::AppointDeputy)?;
            let position = query
                .position
                .as_deref()
                .and_then(parse_int)
                .ok_or_else(|| ApiError::Validation("Не указана позиция заместителя".to_string()))?;
            if let Some(hospital) = scope.hospital() {
                ensure_own_hospital(claims, hospital)?;
                let mut registry = state.store.write().await;
                if let Some(deputy) = registry.remove_deputy(hospital, position) {
                    tracing::info!(hospital = %hospital, position, deputy_id = deputy.id, "Removed deputy");
                }
            }
        }
        _ => return Err(ApiError::Validation("Неверная роль".to_string())),
    }

    Ok(Json(SuccessResponse::ok()))
}

/// Leaders and deputies belong to exactly one hospital
fn single_hospital(scope: HospitalScope) -> ApiResult<Hospital> {
    scope
        .hospital()
        .ok_or_else(|| ApiError::Validation(BAD_HOSPITAL.to_string()))
}

/// A leader manages deputies of their own hospital only
fn ensure_own_hospital(claims: Option<&SessionClaims>, hospital: Hospital) -> ApiResult<()> {
    match claims {
        Some(claims) if claims.role == Role::Leader => {
            if claims.scope().is_some_and(|scope| scope.covers(hospital)) {
                Ok(())
            } else {
                Err(ApiError::forbidden())
            }
        }
        _ => Ok(()),
    }
}

fn member_draft(name: String, vk: Option<String>, login: String, password: String) -> MemberDraft {
    MemberDraft {
        name,
        vk,
        login,
        password,
    }
}
