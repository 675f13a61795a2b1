//! Task Routes
//!
//! - GET /api/tasks?id= - One task
//! - GET /api/tasks?status=submitted&userId= - Submissions
//! - GET /api/tasks - Active tasks
//! - POST /api/tasks - `type` selects create / submit / approve / reject

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::api::dto::{parse_int, parse_role, require_id, TaskActionRequest, TasksQuery};
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::{ApiJson, ApiQuery};
use crate::api::state::{actor_for, AppState};
use crate::auth::{OptionalSession, Permission};
use crate::store::{Actor, Difficulty, Entity, StoreError, SubmissionDraft, TaskDraft};

const REVIEWER_ROLE: &str = "admin";

/// GET /api/tasks
pub async fn get_tasks(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<TasksQuery>,
) -> ApiResult<Response> {
    let registry = state.store.read().await;

    if let Some(id) = query.id.as_deref() {
        let task = parse_int(id)
            .and_then(|id| u64::try_from(id).ok())
            .and_then(|id| registry.tasks.get(id))
            .cloned()
            .ok_or(StoreError::NotFound(Entity::Task))?;
        return Ok(Json(task).into_response());
    }

    if query.status.as_deref() == Some("submitted") {
        let user_id = query
            .user_id
            .as_deref()
            .and_then(parse_int)
            .and_then(|id| u64::try_from(id).ok());
        return Ok(Json(registry.tasks.submissions(user_id)).into_response());
    }

    Ok(Json(registry.tasks.active()).into_response())
}

/// POST /api/tasks
pub async fn task_action(
    State(state): State<Arc<AppState>>,
    session: OptionalSession,
    ApiJson(req): ApiJson<TaskActionRequest>,
) -> ApiResult<Response> {
    let kind = req.kind.clone().unwrap_or_default();
    match kind.as_str() {
        "create" => create(&state, &session, req).await,
        "submit" => submit(&state, &session, req).await,
        "approve" => review(&state, &session, req, true).await,
        "reject" => review(&state, &session, req, false).await,
        _ => Err(ApiError::Validation("Неверный тип запроса".to_string())),
    }
}

async fn create(
    state: &AppState,
    session: &OptionalSession,
    req: TaskActionRequest,
) -> ApiResult<Response> {
    state.authorize(session, Permission::Administer)?;

    let difficulty = match req.difficulty.as_deref() {
        Some(value) => value.parse()?,
        None => Difficulty::Medium,
    };
    let draft = TaskDraft {
        title: req.title,
        description: req.description,
        detailed_description: req.detailed_description,
        points: req.points.as_ref().and_then(|p| p.as_i64()).unwrap_or(0),
        difficulty,
        requirements: req.requirements,
    };

    let mut registry = state.store.write().await;
    let task = registry.tasks.create(draft)?;

    tracing::info!(task_id = task.id, title = %task.title, "Task created");
    Ok((StatusCode::CREATED, Json(task)).into_response())
}

async fn submit(
    state: &AppState,
    session: &OptionalSession,
    req: TaskActionRequest,
) -> ApiResult<Response> {
    let claims = state.authorize(session, Permission::SubmitTasks)?;
    let task_id = req
        .task_id
        .as_ref()
        .and_then(|id| id.as_u64())
        .ok_or(StoreError::NotFound(Entity::Task))?;

    let mut registry = state.store.write().await;
    let (user_id, user_role, user_name) = match claims {
        Some(claims) => (
            claims.id,
            claims.role,
            registry
                .display_name(&claims.username)
                .unwrap_or_else(|| claims.username.clone()),
        ),
        None => (
            require_id(req.user_id.as_ref(), "Не указан пользователь")?,
            parse_role(req.user_role.as_deref())?,
            req.user_name,
        ),
    };

    let draft = SubmissionDraft {
        user_id,
        user_role,
        user_name,
        proof: req.proof,
        comment: req.comment,
    };
    let submission = registry.tasks.submit(task_id, draft)?;

    tracing::info!(
        submission_id = submission.id,
        task_id,
        user_id,
        "Task submitted"
    );
    Ok((StatusCode::CREATED, Json(submission)).into_response())
}

async fn review(
    state: &AppState,
    session: &OptionalSession,
    req: TaskActionRequest,
    approve: bool,
) -> ApiResult<Response> {
    let claims = state.authorize(session, Permission::Administer)?;
    let submission_id = req
        .submission_id
        .as_ref()
        .and_then(|id| id.as_u64())
        .ok_or(StoreError::NotFound(Entity::Submission))?;

    let mut registry = state.store.write().await;
    let fallback = Actor {
        id: req.admin_id.as_ref().and_then(|v| v.as_u64()),
        role: None,
        name: req.admin_name,
    };
    let mut reviewer = actor_for(&registry, claims, fallback);
    reviewer.role = Some(REVIEWER_ROLE.to_string());

    let submission = if approve {
        registry.tasks.approve(submission_id, &reviewer)?
    } else {
        registry.tasks.reject(submission_id, &reviewer, req.reason)?
    };

    tracing::info!(submission_id, status = ?submission.status, "Submission reviewed");
    Ok(Json(submission).into_response())
}
