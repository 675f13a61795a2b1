//! Session extractors and the `auth_token` cookie

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{
        header::{AUTHORIZATION, COOKIE},
        request::Parts,
        HeaderMap, HeaderValue,
    },
};
use std::sync::Arc;

use crate::api::{ApiError, ApiResult, AppState};
use crate::auth::token::{SessionClaims, TokenError};

/// Cookie holding the session token
pub const AUTH_COOKIE: &str = "auth_token";

const NOT_AUTHORIZED: &str = "Не авторизован";

/// Signed-in caller; rejects with 401 otherwise
#[derive(Debug, Clone)]
pub struct Session(pub SessionClaims);

/// Caller that may be anonymous. A bad token is remembered so handlers that
/// do require a session can report why.
#[derive(Debug, Clone, Default)]
pub struct OptionalSession {
    claims: Option<SessionClaims>,
    rejected: Option<TokenError>,
}

impl OptionalSession {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn signed(claims: SessionClaims) -> Self {
        Self {
            claims: Some(claims),
            rejected: None,
        }
    }

    pub fn claims(&self) -> Option<&SessionClaims> {
        self.claims.as_ref()
    }

    /// The claims, or the 401 a [`Session`] extractor would have returned
    pub fn require(&self) -> ApiResult<&SessionClaims> {
        match (&self.claims, &self.rejected) {
            (Some(claims), _) => Ok(claims),
            (None, Some(err)) => Err(ApiError::from(err.clone())),
            (None, None) => Err(ApiError::Unauthorized(NOT_AUTHORIZED.to_string())),
        }
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = token_from_headers(&parts.headers)
            .ok_or_else(|| ApiError::Unauthorized(NOT_AUTHORIZED.to_string()))?;
        let claims = state.tokens.decode(&token)?;
        Ok(Session(claims))
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for OptionalSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = token_from_headers(&parts.headers) else {
            return Ok(OptionalSession::anonymous());
        };

        Ok(match state.tokens.decode(&token) {
            Ok(claims) => OptionalSession::signed(claims),
            Err(err) => {
                tracing::debug!(error = %err, "Ignoring invalid session token");
                OptionalSession {
                    claims: None,
                    rejected: Some(err),
                }
            }
        })
    }
}

/// Token from the `auth_token` cookie, falling back to a bearer header
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    let from_cookie = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == AUTH_COOKIE)
        .map(|(_, value)| value.trim().to_string());

    from_cookie.filter(|t| !t.is_empty()).or_else(|| {
        headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|token| token.trim().to_string())
            .filter(|t| !t.is_empty())
    })
}

/// `Set-Cookie` value carrying a fresh session token
pub fn session_cookie(token: &str, max_age_secs: i64, secure: bool) -> ApiResult<HeaderValue> {
    cookie_header(token, max_age_secs, secure)
}

/// `Set-Cookie` value that removes the session cookie
pub fn clear_cookie(secure: bool) -> ApiResult<HeaderValue> {
    cookie_header("", 0, secure)
}

fn cookie_header(value: &str, max_age_secs: i64, secure: bool) -> ApiResult<HeaderValue> {
    let mut cookie = format!(
        "{}={}; Path=/; Max-Age={}; SameSite=Lax; HttpOnly",
        AUTH_COOKIE, value, max_age_secs
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
        .map_err(|e| ApiError::Internal(format!("Invalid cookie header: {}", e)))
}
