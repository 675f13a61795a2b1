//! Price Routes
//!
//! - GET /api/prices - Full catalog
//! - GET /api/prices?category= - One category
//! - GET /api/prices?requests=true - Change requests
//! - POST /api/prices - `type` selects request / approve / reject / update

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::api::dto::{
    parse_int, require_id, EmptyCategory, PriceActionRequest, PricesQuery, SuccessResponse,
};
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::{ApiJson, ApiQuery};
use crate::api::state::{actor_for, AppState};
use crate::auth::{OptionalSession, Permission};
use crate::store::{Actor, PriceChange};

/// Reviews are recorded under this role whoever performs them
const REVIEWER_ROLE: &str = "admin";

/// GET /api/prices
pub async fn get_prices(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<PricesQuery>,
) -> Response {
    let registry = state.store.read().await;

    if query.requests.as_deref() == Some("true") {
        return Json(registry.prices.requests().to_vec()).into_response();
    }

    if let Some(category) = query.category.as_deref() {
        return match registry.prices.category(category) {
            Some(category) => Json(category.clone()).into_response(),
            None => Json(EmptyCategory::default()).into_response(),
        };
    }

    Json(registry.prices.catalog().to_vec()).into_response()
}

/// POST /api/prices
pub async fn price_action(
    State(state): State<Arc<AppState>>,
    session: OptionalSession,
    ApiJson(req): ApiJson<PriceActionRequest>,
) -> ApiResult<Response> {
    let kind = req.kind.clone().unwrap_or_default();
    match kind.as_str() {
        "request" => propose(&state, &session, req).await,
        "approve" => review(&state, &session, req, true).await,
        "reject" => review(&state, &session, req, false).await,
        "update" => update(&state, &session, req).await,
        _ => Err(ApiError::Validation("Неверный тип запроса".to_string())),
    }
}

async fn propose(
    state: &AppState,
    session: &OptionalSession,
    req: PriceActionRequest,
) -> ApiResult<Response> {
    let claims = state.authorize(session, Permission::ProposePrices)?;
    let changes = parse_changes(&req)?;

    let mut registry = state.store.write().await;
    let fallback = Actor {
        id: req.requested_by_id.as_ref().and_then(|v| v.as_u64()),
        role: req.requested_by,
        name: req.requested_by_name,
    };
    let requester = actor_for(&registry, claims, fallback);
    let created = registry.prices.propose(&changes, &requester)?;

    tracing::info!(
        count = created.len(),
        requested_by = requester.name.as_deref().unwrap_or("-"),
        "Price change requested"
    );
    Ok((StatusCode::CREATED, Json(created)).into_response())
}

async fn review(
    state: &AppState,
    session: &OptionalSession,
    req: PriceActionRequest,
    approve: bool,
) -> ApiResult<Response> {
    let claims = state.authorize(session, Permission::Administer)?;
    let request_id = require_id(req.request_id.as_ref(), "Не указан ID запроса")?;

    let mut registry = state.store.write().await;
    let fallback = Actor {
        id: req.admin_id.as_ref().and_then(|v| v.as_u64()),
        role: None,
        name: req.admin_name,
    };
    let mut reviewer = actor_for(&registry, claims, fallback);
    reviewer.role = Some(REVIEWER_ROLE.to_string());

    let reviewed = if approve {
        registry.prices.approve(request_id, &reviewer)?
    } else {
        registry.prices.reject(request_id, &reviewer, req.reason)?
    };

    tracing::info!(
        request_id,
        service_id = reviewed.service_id,
        status = ?reviewed.status,
        "Price request reviewed"
    );
    Ok(Json(reviewed).into_response())
}

async fn update(
    state: &AppState,
    session: &OptionalSession,
    req: PriceActionRequest,
) -> ApiResult<Response> {
    state.authorize(session, Permission::Administer)?;
    let changes = parse_changes(&req)?;

    let mut registry = state.store.write().await;
    let updated = registry.prices.update(&changes)?;

    tracing::info!(count = updated, "Prices updated directly");
    Ok(Json(SuccessResponse::with_message("Цены успешно обновлены")).into_response())
}

/// Turn the `changes` map into changes ordered by service id
fn parse_changes(req: &PriceActionRequest) -> ApiResult<Vec<PriceChange>> {
    let Some(map) = req.changes.as_ref() else {
        return Err(ApiError::Validation("Нет изменений цен".to_string()));
    };

    let mut changes = map
        .iter()
        .map(|(key, price)| {
            let service_id = parse_int(key)
                .and_then(|id| u64::try_from(id).ok())
                .ok_or_else(|| ApiError::Validation(format!("Неверный ID услуги: {}", key)))?;
            let new_price = price.as_i64().ok_or_else(|| {
                ApiError::Validation("Цена должна быть положительным числом".to_string())
            })?;
            Ok(PriceChange {
                service_id,
                new_price,
            })
        })
        .collect::<ApiResult<Vec<_>>>()?;

    changes.sort_by_key(|c| c.service_id);
    Ok(changes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::dto::Loose;
    use std::collections::BTreeMap;

    fn request_with(changes: &[(&str, Loose)]) -> PriceActionRequest {
        PriceActionRequest {
            kind: Some("request".to_string()),
            changes: Some(
                changes
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect::<BTreeMap<_, _>>(),
            ),
            ..Default::default()
        }
    }

    #[test]
    fn test_changes_sorted_numerically() {
        let req = request_with(&[
            ("10", Loose::Int(900)),
            ("2", Loose::Text("150".to_string())),
        ]);
        let changes = parse_changes(&req).unwrap();

        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].service_id, 2);
        assert_eq!(changes[0].new_price, 150);
        assert_eq!(changes[1].service_id, 10);
    }

    #[test]
    fn test_bad_key_rejected() {
        let req = request_with(&[("abc", Loose::Int(100))]);
        assert!(matches!(parse_changes(&req), Err(ApiError::Validation(_))));
    }

    #[test]
    fn test_missing_changes_rejected() {
        let req = PriceActionRequest::default();
        assert!(parse_changes(&req).is_err());
    }
}
