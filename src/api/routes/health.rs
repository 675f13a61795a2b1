//! Health Routes
//!
//! Health check endpoints for monitoring and Kubernetes probes.
//!
//! - GET /health/live - Liveness probe (process is alive)
//! - GET /health/ready - Readiness probe (ready to serve traffic)
//! - GET /health - Full health status

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use std::time::Duration;

use crate::api::dto::HealthResponse;
use crate::api::state::AppState;

/// A store lock held longer than this marks the service as not ready
const READY_LOCK_TIMEOUT: Duration = Duration::from_secs(1);

/// GET /health/live
///
/// Kubernetes liveness probe.
/// Returns 200 if the process is alive, no dependency checks.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health/ready
///
/// Kubernetes readiness probe.
/// Returns 200 when the store can be read and holds at least one account.
pub async fn readiness(State(state): State<Arc<AppState>>) -> StatusCode {
    match check_store_health(&state).await {
        true => StatusCode::OK,
        false => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// GET /health
///
/// Full health status with store counters.
pub async fn full_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let (status, accounts, pending) =
        match tokio::time::timeout(READY_LOCK_TIMEOUT, state.store.read()).await {
            Ok(registry) => {
                let accounts = registry.accounts.all().len();
                let status = if accounts > 0 { "healthy" } else { "degraded" };
                (status, accounts, registry.prices.pending_count())
            }
            Err(_) => ("unhealthy", 0, 0),
        };

    Json(HealthResponse {
        status: status.to_string(),
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        accounts,
        pending_price_requests: pending,
    })
}

/// Check the store answers reads and someone can log in
async fn check_store_health(state: &AppState) -> bool {
    match tokio::time::timeout(READY_LOCK_TIMEOUT, state.store.read()).await {
        Ok(registry) => !registry.accounts.all().is_empty(),
        Err(_) => {
            tracing::warn!("Store read lock timed out during readiness check");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::store::Store;

    #[tokio::test]
    async fn test_liveness() {
        let status = liveness().await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_empty_store_not_ready() {
        let state = Arc::new(AppState::new(Arc::new(Store::empty()), Config::default()));
        assert_eq!(readiness(State(state)).await, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_full_health_counts() {
        let state = Arc::new(AppState::seeded(Config::default()));
        let Json(health) = full_health(State(state)).await;

        assert_eq!(health.status, "healthy");
        assert_eq!(health.accounts, 11);
        assert_eq!(health.pending_price_requests, 0);
    }
}
