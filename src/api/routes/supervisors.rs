//! Supervisor Routes
//!
//! - GET /api/supervisors?id=|type=&assignedHospital= - One supervisor or a filtered list
//! - POST /api/supervisors - Create
//! - PUT /api/supervisors - Update
//! - DELETE /api/supervisors?id= - Delete

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::api::dto::{
    parse_int, parse_optional_role, parse_optional_scope, parse_role, parse_scope, require_id,
    require_query_id, IdQuery, SuccessResponse, SupervisorRequest, SupervisorsQuery,
};
use crate::api::error::ApiResult;
use crate::api::extract::{ApiJson, ApiQuery};
use crate::api::state::AppState;
use crate::auth::{OptionalSession, Permission};
use crate::store::{Entity, StoreError, Supervisor, SupervisorDraft, SupervisorFilter};

/// GET /api/supervisors
pub async fn get_supervisors(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<SupervisorsQuery>,
) -> ApiResult<Response> {
    let registry = state.store.read().await;

    if let Some(id) = query.id.as_deref() {
        let supervisor = parse_int(id)
            .and_then(|id| u64::try_from(id).ok())
            .and_then(|id| registry.supervisors.get(id))
            .cloned()
            .ok_or(StoreError::NotFound(Entity::Supervisor))?;
        return Ok(Json(supervisor).into_response());
    }

    let filter = SupervisorFilter {
        kind: parse_optional_role(query.kind.as_deref())?,
        assigned_hospital: parse_optional_scope(query.assigned_hospital.as_deref())?,
    };
    Ok(Json(registry.supervisors.list(&filter)).into_response())
}

/// POST /api/supervisors
pub async fn create_supervisor(
    State(state): State<Arc<AppState>>,
    session: OptionalSession,
    ApiJson(req): ApiJson<SupervisorRequest>,
) -> ApiResult<(StatusCode, Json<Supervisor>)> {
    state.authorize(&session, Permission::Administer)?;
    let draft = draft_from(req)?;

    let mut registry = state.store.write().await;
    let supervisor = registry.create_supervisor(draft)?;
    Ok((StatusCode::CREATED, Json(supervisor)))
}

/// PUT /api/supervisors
pub async fn update_supervisor(
    State(state): State<Arc<AppState>>,
    session: OptionalSession,
    ApiJson(req): ApiJson<SupervisorRequest>,
) -> ApiResult<Json<Supervisor>> {
    state.authorize(&session, Permission::Administer)?;
    let id = require_id(req.id.as_ref(), "Не указан ID следящего")?;
    let draft = draft_from(req)?;

    let mut registry = state.store.write().await;
    let supervisor = registry.update_supervisor(id, draft)?;
    Ok(Json(supervisor))
}

/// DELETE /api/supervisors
pub async fn delete_supervisor(
    State(state): State<Arc<AppState>>,
    session: OptionalSession,
    ApiQuery(query): ApiQuery<IdQuery>,
) -> ApiResult<Json<SuccessResponse>> {
    state.authorize(&session, Permission::Administer)?;
    let id = require_query_id(query.id.as_deref(), "Не указан ID следящего")?;

    let mut registry = state.store.write().await;
    registry.delete_supervisor(id)?;
    Ok(Json(SuccessResponse::ok()))
}

fn draft_from(req: SupervisorRequest) -> ApiResult<SupervisorDraft> {
    Ok(SupervisorDraft {
        kind: parse_role(req.kind.as_deref())?,
        assigned_hospital: parse_scope(
            req.assigned_hospital.as_deref(),
            "Неверное назначение больницы",
        )?,
        nickname: req.nickname,
        login: req.login,
        password: req.password,
        vk: req.vk,
    })
}
