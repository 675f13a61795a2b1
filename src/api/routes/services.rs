//! Service Routes
//!
//! - GET /api/services?category= - Flat list of services with live prices

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::CategoryQuery;
use crate::api::extract::ApiQuery;
use crate::api::state::AppState;
use crate::store::Service;

/// GET /api/services
///
/// An unknown category falls back to every service.
pub async fn list_services(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<CategoryQuery>,
) -> Json<Vec<Service>> {
    let registry = state.store.read().await;

    let services = match query.category.as_deref() {
        Some(category) if registry.prices.category(category).is_some() => {
            registry.prices.services_in(category)
        }
        _ => registry.prices.all_services(),
    };
    Json(services)
}
