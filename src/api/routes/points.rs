//! Points Routes
//!
//! - GET /api/points?userId=&userRole=&hospital= - Filtered entries and their total
//! - POST /api/points - Award points
//! - DELETE /api/points?id= - Remove an entry

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::{
    parse_optional_scope, parse_role, require_id, require_query_id, AwardPointsRequest,
    IdQuery, PointsResponse, SubjectQuery, SuccessResponse,
};
use crate::api::error::ApiResult;
use crate::api::extract::{ApiJson, ApiQuery};
use crate::api::state::{actor_for, AppState};
use crate::auth::{OptionalSession, Permission};
use crate::store::{Actor, PointEntry, PointLedger, Subject};

/// GET /api/points
pub async fn list_points(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<SubjectQuery>,
) -> ApiResult<Json<PointsResponse>> {
    let filter = query.filter()?;
    let registry = state.store.read().await;

    let points = registry.points.list(&filter);
    let total_points = PointLedger::total(&points);
    Ok(Json(PointsResponse {
        points,
        total_points,
    }))
}

/// POST /api/points
pub async fn award_points(
    State(state): State<Arc<AppState>>,
    session: OptionalSession,
    ApiJson(req): ApiJson<AwardPointsRequest>,
) -> ApiResult<(StatusCode, Json<PointEntry>)> {
    let claims = state.authorize(&session, Permission::Administer)?;

    let subject = Subject {
        user_id: require_id(req.user_id.as_ref(), "Не указан пользователь")?,
        user_role: parse_role(req.user_role.as_deref())?,
        user_hospital: parse_optional_scope(req.user_hospital.as_deref())?,
        user_name: req.user_name,
    };
    let amount = req.amount.as_ref().and_then(|a| a.as_i64()).unwrap_or(0);

    let mut registry = state.store.write().await;
    let fallback = Actor {
        id: None,
        role: req.added_by,
        name: req.added_by_name,
    };
    let actor = actor_for(&registry, claims, fallback);
    let entry = registry.points.award(subject, amount, req.reason, &actor)?;

    tracing::info!(id = entry.id, user_id = entry.user_id, amount, "Points awarded");
    Ok((StatusCode::CREATED, Json(entry)))
}

/// DELETE /api/points
pub async fn delete_points(
    State(state): State<Arc<AppState>>,
    session: OptionalSession,
    ApiQuery(query): ApiQuery<IdQuery>,
) -> ApiResult<Json<SuccessResponse>> {
    state.authorize(&session, Permission::Administer)?;
    let id = require_query_id(query.id.as_deref(), "Не указан ID записи")?;

    let mut registry = state.store.write().await;
    registry.points.delete(id)?;
    Ok(Json(SuccessResponse::ok()))
}
