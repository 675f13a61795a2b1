//! Dashboard Route
//!
//! - GET /api/dashboard - Summary for the signed-in user's rank

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::state::AppState;
use crate::auth::Session;
use crate::store::{Dashboard, Viewer};

/// GET /api/dashboard
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Session(claims): Session,
) -> Json<Dashboard> {
    let viewer = Viewer {
        id: claims.id,
        scope: claims.scope(),
        role: claims.role,
        username: claims.username,
    };

    let registry = state.store.read().await;
    Json(registry.dashboard(&viewer))
}
