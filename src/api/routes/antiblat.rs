//! Antiblat Routes
//!
//! - GET /api/antiblat?hospital= - One hospital's list, or both
//! - POST /api/antiblat - Add an entry
//! - PUT /api/antiblat - Edit an entry
//! - DELETE /api/antiblat?id=&hospital= - Remove an entry

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::{
    parse_hospital, require_id, require_query_id, AntiblatDeleteQuery, AntiblatRequest,
    HospitalQuery, PerHospital, SuccessResponse,
};
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::{ApiJson, ApiQuery};
use crate::api::state::{actor_for, AppState};
use crate::auth::{OptionalSession, Permission};
use crate::store::antiblat::{MAX_RANK, MIN_RANK};
use crate::store::{Actor, AntiblatDraft, AntiblatEntry, AntiblatReason, Hospital};

/// GET /api/antiblat
pub async fn list_entries(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<HospitalQuery>,
) -> Json<PerHospital<Vec<AntiblatEntry>>> {
    let registry = state.store.read().await;
    let hospital = query.hospital.as_deref().and_then(|h| h.parse::<Hospital>().ok());

    Json(match hospital {
        Some(hospital) => PerHospital::One(registry.antiblat.list(hospital).to_vec()),
        None => PerHospital::Both {
            ls: registry.antiblat.list(Hospital::Ls).to_vec(),
            lv: registry.antiblat.list(Hospital::Lv).to_vec(),
        },
    })
}

/// POST /api/antiblat
pub async fn create_entry(
    State(state): State<Arc<AppState>>,
    session: OptionalSession,
    ApiJson(req): ApiJson<AntiblatRequest>,
) -> ApiResult<(StatusCode, Json<AntiblatEntry>)> {
    let claims = state.authorize(&session, Permission::AddAntiblat)?;
    let hospital = parse_hospital(req.hospital.as_deref())?;
    let draft = draft_from(&req)?;

    let mut registry = state.store.write().await;
    let fallback = Actor {
        id: req.added_by_id.as_ref().and_then(|v| v.as_u64()),
        role: req.added_by.clone(),
        name: req.added_by_name.clone(),
    };
    let actor = actor_for(&registry, claims, fallback);
    let entry = registry.antiblat.create(hospital, draft, &actor)?;

    tracing::info!(id = entry.id, hospital = %hospital, nickname = %entry.nickname, "Antiblat entry added");
    Ok((StatusCode::CREATED, Json(entry)))
}

/// PUT /api/antiblat
pub async fn update_entry(
    State(state): State<Arc<AppState>>,
    session: OptionalSession,
    ApiJson(req): ApiJson<AntiblatRequest>,
) -> ApiResult<Json<AntiblatEntry>> {
    state.authorize(&session, Permission::Administer)?;
    let hospital = parse_hospital(req.hospital.as_deref())?;
    let id = require_id(req.id.as_ref(), "Не указан ID записи")?;
    let draft = draft_from(&req)?;

    let mut registry = state.store.write().await;
    let entry = registry.antiblat.update(hospital, id, draft)?;
    Ok(Json(entry))
}

/// DELETE /api/antiblat
pub async fn delete_entry(
    State(state): State<Arc<AppState>>,
    session: OptionalSession,
    ApiQuery(query): ApiQuery<AntiblatDeleteQuery>,
) -> ApiResult<Json<SuccessResponse>> {
    state.authorize(&session, Permission::Administer)?;
    let id = require_query_id(query.id.as_deref(), "Не указан ID записи")?;
    let hospital = parse_hospital(query.hospital.as_deref())?;

    let mut registry = state.store.write().await;
    registry.antiblat.delete(hospital, id)?;

    tracing::info!(id, hospital = %hospital, "Antiblat entry removed");
    Ok(Json(SuccessResponse::ok()))
}

fn draft_from(req: &AntiblatRequest) -> ApiResult<AntiblatDraft> {
    let rank = req.rank.as_ref().and_then(|r| r.as_i64()).ok_or_else(|| {
        ApiError::Validation(format!("Ранг должен быть от {} до {}", MIN_RANK, MAX_RANK))
    })?;
    let reason: AntiblatReason = req
        .reason
        .as_deref()
        .ok_or_else(|| ApiError::Validation("Неверная причина".to_string()))?
        .parse()?;

    Ok(AntiblatDraft {
        nickname: req.nickname.clone(),
        rank,
        vk: req.vk.clone(),
        reason,
        report_link: req.report_link.clone(),
    })
}
