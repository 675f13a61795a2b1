//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::Instant;

use crate::api::{ApiError, ApiResult};
use crate::auth::{OptionalSession, Permission, SessionClaims, TokenCodec};
use crate::config::Config;
use crate::store::{Actor, Registry, Store};

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// In-memory registry
    pub store: Arc<Store>,
    pub config: Arc<Config>,
    /// Issues and checks session tokens
    pub tokens: TokenCodec,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    pub fn new(store: Arc<Store>, config: Config) -> Self {
        let tokens = TokenCodec::new(config.auth.token_secret.clone(), config.auth.token_ttl_days);
        Self {
            store,
            config: Arc::new(config),
            tokens,
            start_time: Instant::now(),
        }
    }

    /// State over the start-up data
    pub fn seeded(config: Config) -> Self {
        Self::new(Arc::new(Store::seeded()), config)
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Check the caller may perform an operation.
    ///
    /// With role enforcement off every caller passes, and the session is
    /// only used for audit fields.
    pub fn authorize<'a>(
        &self,
        session: &'a OptionalSession,
        permission: Permission,
    ) -> ApiResult<Option<&'a SessionClaims>> {
        if !self.config.auth.enforce_roles {
            return Ok(session.claims());
        }

        let claims = session.require()?;
        if !claims.role.allows(permission) {
            tracing::warn!(
                username = %claims.username,
                role = %claims.role,
                ?permission,
                "Permission denied"
            );
            return Err(ApiError::forbidden());
        }
        Ok(Some(claims))
    }
}

/// Audit identity: the session when present, otherwise what the body says
pub fn actor_for(
    registry: &Registry,
    claims: Option<&SessionClaims>,
    fallback: Actor,
) -> Actor {
    match claims {
        Some(claims) => Actor::new(
            claims.id,
            claims.role.as_str(),
            registry
                .display_name(&claims.username)
                .unwrap_or_else(|| claims.username.clone()),
        ),
        None => fallback,
    }
}
