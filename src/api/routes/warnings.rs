//! Warning Routes
//!
//! - GET /api/warnings?userId=&userRole=&hospital= - Filtered warnings
//! - POST /api/warnings - Issue a warning
//! - DELETE /api/warnings?id= - Withdraw a warning

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::{
    parse_optional_scope, parse_role, require_id, require_query_id, IdQuery, IssueWarningRequest,
    SubjectQuery, SuccessResponse,
};
use crate::api::error::ApiResult;
use crate::api::extract::{ApiJson, ApiQuery};
use crate::api::state::{actor_for, AppState};
use crate::auth::{OptionalSession, Permission};
use crate::store::{Actor, Subject, Warning};

/// GET /api/warnings
pub async fn list_warnings(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<SubjectQuery>,
) -> ApiResult<Json<Vec<Warning>>> {
    let filter = query.filter()?;
    let registry = state.store.read().await;
    Ok(Json(registry.warnings.list(&filter)))
}

/// POST /api/warnings
pub async fn issue_warning(
    State(state): State<Arc<AppState>>,
    session: OptionalSession,
    ApiJson(req): ApiJson<IssueWarningRequest>,
) -> ApiResult<(StatusCode, Json<Warning>)> {
    let claims = state.authorize(&session, Permission::IssueWarnings)?;

    let subject = Subject {
        user_id: require_id(req.user_id.as_ref(), "Не указан пользователь")?,
        user_role: parse_role(req.user_role.as_deref())?,
        user_hospital: parse_optional_scope(req.user_hospital.as_deref())?,
        user_name: req.user_name,
    };

    let mut registry = state.store.write().await;
    let fallback = Actor {
        id: req.issued_by_id.as_ref().and_then(|v| v.as_u64()),
        role: req.issued_by,
        name: req.issued_by_name,
    };
    let actor = actor_for(&registry, claims, fallback);
    let warning = registry.warnings.issue(subject, req.reason, &actor)?;

    tracing::info!(id = warning.id, user_id = warning.user_id, "Warning issued");
    Ok((StatusCode::CREATED, Json(warning)))
}

/// DELETE /api/warnings
pub async fn delete_warning(
    State(state): State<Arc<AppState>>,
    session: OptionalSession,
    ApiQuery(query): ApiQuery<IdQuery>,
) -> ApiResult<Json<SuccessResponse>> {
    state.authorize(&session, Permission::Administer)?;
    let id = require_query_id(query.id.as_deref(), "Не указан ID выговора")?;

    let mut registry = state.store.write().await;
    registry.warnings.delete(id)?;
    Ok(Json(SuccessResponse::ok()))
}
