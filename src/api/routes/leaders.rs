//! Leader Routes
//!
//! - GET /api/leaders?id=|hospital= - One leader, a hospital's leader, or both
//! - POST /api/leaders - Appoint (replaces the current leader)
//! - PUT /api/leaders - Edit
//! - DELETE /api/leaders?hospital= - Remove

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::{
    parse_hospital, parse_int, HospitalQuery, LeaderRequest, LeadersQuery, PerHospital,
    SuccessResponse,
};
use crate::api::error::ApiResult;
use crate::api::extract::{ApiJson, ApiQuery};
use crate::api::state::AppState;
use crate::auth::{OptionalSession, Permission};
use crate::store::{Entity, Hospital, Leader, LeaderDraft, StoreError};

/// GET /api/leaders
pub async fn get_leaders(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<LeadersQuery>,
) -> ApiResult<Json<PerHospital<Option<Leader>>>> {
    let registry = state.store.read().await;

    if let Some(id) = query.id.as_deref() {
        let leader = parse_int(id)
            .and_then(|id| u64::try_from(id).ok())
            .and_then(|id| registry.leaders.get(id))
            .cloned()
            .ok_or(StoreError::NotFound(Entity::Leader))?;
        return Ok(Json(PerHospital::One(Some(leader))));
    }

    if query.hospital.is_some() {
        let hospital = parse_hospital(query.hospital.as_deref())?;
        return Ok(Json(PerHospital::One(
            registry.leaders.for_hospital(hospital).cloned(),
        )));
    }

    Ok(Json(PerHospital::Both {
        ls: registry.leaders.for_hospital(Hospital::Ls).cloned(),
        lv: registry.leaders.for_hospital(Hospital::Lv).cloned(),
    }))
}

/// POST /api/leaders
pub async fn appoint_leader(
    State(state): State<Arc<AppState>>,
    session: OptionalSession,
    ApiJson(req): ApiJson<LeaderRequest>,
) -> ApiResult<(StatusCode, Json<Leader>)> {
    state.authorize(&session, Permission::Administer)?;
    let hospital = parse_hospital(req.hospital.as_deref())?;

    let mut registry = state.store.write().await;
    let leader = registry.appoint_leader(hospital, draft_from(req))?;
    Ok((StatusCode::CREATED, Json(leader)))
}

/// PUT /api/leaders
pub async fn update_leader(
    State(state): State<Arc<AppState>>,
    session: OptionalSession,
    ApiJson(req): ApiJson<LeaderRequest>,
) -> ApiResult<Json<Leader>> {
    state.authorize(&session, Permission::Administer)?;
    let hospital = parse_hospital(req.hospital.as_deref())?;
    let id = req
        .id
        .as_ref()
        .and_then(|id| id.as_u64())
        .ok_or(StoreError::NotFound(Entity::Leader))?;

    let mut registry = state.store.write().await;
    let leader = registry.update_leader(hospital, id, draft_from(req))?;
    Ok(Json(leader))
}

/// DELETE /api/leaders
pub async fn remove_leader(
    State(state): State<Arc<AppState>>,
    session: OptionalSession,
    ApiQuery(query): ApiQuery<HospitalQuery>,
) -> ApiResult<Json<SuccessResponse>> {
    state.authorize(&session, Permission::Administer)?;
    let hospital = parse_hospital(query.hospital.as_deref())?;

    let mut registry = state.store.write().await;
    match registry.remove_leader(hospital) {
        // already vacant
        Ok(_) | Err(StoreError::NotFound(_)) => Ok(Json(SuccessResponse::ok())),
        Err(err) => Err(err.into()),
    }
}

fn draft_from(req: LeaderRequest) -> LeaderDraft {
    LeaderDraft {
        nickname: req.nickname,
        vk: req.vk,
        email: req.email,
        discord: req.discord,
        forum_link: req.forum_link,
        goal: req.goal,
        login: req.login,
        password: req.password,
    }
}
