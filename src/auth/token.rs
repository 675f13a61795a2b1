//! Session tokens
//!
//! A token is the standard base64 encoding of the JSON claims:
//!
//! ```text
//! base64({"id":1,"username":"admin","role":"main_supervisor",
//!         "hospital":null,"assignedHospital":"both","exp":1700000000000})
//! ```
//!
//! When a secret is configured, `.` and the unpadded URL-safe base64 of
//! `HMAC-SHA256(secret, payload)` are appended, and decoding verifies it.

use base64::{
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
    Engine as _,
};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

use crate::store::{Account, HospitalScope, Role};

type HmacSha256 = Hmac<Sha256>;

/// Default token lifetime
pub const DEFAULT_TTL_DAYS: i64 = 30;

/// Longest accepted token lifetime
pub const MAX_TTL_DAYS: i64 = 3650;

/// Claims carried by a session token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
    pub id: u64,
    pub username: String,
    pub role: Role,
    pub hospital: Option<HospitalScope>,
    pub assigned_hospital: Option<HospitalScope>,
    /// Expiry as Unix milliseconds
    pub exp: i64,
}

impl SessionClaims {
    pub fn is_expired(&self) -> bool {
        self.exp < Utc::now().timestamp_millis()
    }

    /// Hospital the session acts for: own hospital first, then the assignment
    pub fn scope(&self) -> Option<HospitalScope> {
        self.hospital.or(self.assigned_hospital)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Недействительный токен")]
    Malformed,

    #[error("Срок действия токена истек")]
    Expired,

    #[error("Недействительный токен")]
    BadSignature,
}

/// Issues and checks session tokens
#[derive(Debug, Clone)]
pub struct TokenCodec {
    secret: Option<String>,
    ttl: Duration,
}

impl Default for TokenCodec {
    fn default() -> Self {
        Self::new(None, DEFAULT_TTL_DAYS)
    }
}

impl TokenCodec {
    pub fn new(secret: Option<String>, ttl_days: i64) -> Self {
        Self {
            secret: secret.filter(|s| !s.is_empty()),
            ttl: Duration::days(ttl_days.clamp(1, MAX_TTL_DAYS)),
        }
    }

    /// Token lifetime in seconds, for the cookie's Max-Age
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl.num_seconds()
    }

    pub fn claims_for(&self, account: &Account) -> SessionClaims {
        SessionClaims {
            id: account.id,
            username: account.username.clone(),
            role: account.role,
            hospital: account.hospital,
            assigned_hospital: account.assigned_hospital,
            exp: (Utc::now() + self.ttl).timestamp_millis(),
        }
    }

    pub fn issue(&self, account: &Account) -> Result<String, TokenError> {
        self.encode(&self.claims_for(account))
    }

    pub fn encode(&self, claims: &SessionClaims) -> Result<String, TokenError> {
        let json = serde_json::to_vec(claims).map_err(|_| TokenError::Malformed)?;
        let payload = STANDARD.encode(json);
        Ok(match &self.secret {
            Some(secret) => {
                let tag = mac(secret, &payload)?.finalize().into_bytes();
                let signature = URL_SAFE_NO_PAD.encode(tag);
                format!("{}.{}", payload, signature)
            }
            None => payload,
        })
    }

    pub fn decode(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let payload = match &self.secret {
            Some(secret) => {
                let (payload, signature) =
                    token.split_once('.').ok_or(TokenError::BadSignature)?;
                let signature = URL_SAFE_NO_PAD
                    .decode(signature)
                    .map_err(|_| TokenError::BadSignature)?;
                mac(secret, payload)?
                    .verify_slice(&signature)
                    .map_err(|_| TokenError::BadSignature)?;
                payload
            }
            None => token,
        };

        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|_| TokenError::Malformed)?;
        let claims: SessionClaims =
            serde_json::from_slice(&bytes).map_err(|_| TokenError::Malformed)?;

        if claims.is_expired() {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }
}

fn mac(secret: &str, payload: &str) -> Result<HmacSha256, TokenError> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| TokenError::BadSignature)?;
    mac.update(payload.as_bytes());
    Ok(mac)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> Account {
        Account {
            id: 1,
            username: "admin".to_string(),
            password_hash: String::new(),
            role: Role::MainSupervisor,
            hospital: None,
            assigned_hospital: Some(HospitalScope::Both),
        }
    }

    #[test]
    fn test_issue_and_decode() {
        let codec = TokenCodec::default();
        let token = codec.issue(&account()).unwrap();
        let claims = codec.decode(&token).unwrap();
        assert_eq!(claims.id, 1);
        assert_eq!(claims.role, Role::MainSupervisor);
        assert_eq!(claims.scope(), Some(HospitalScope::Both));
        assert!(claims.exp > Utc::now().timestamp_millis() + 29 * 24 * 3600 * 1000);
    }

    #[test]
    fn test_unsigned_token_is_plain_base64_json() {
        let codec = TokenCodec::default();
        let token = codec.issue(&account()).unwrap();
        let json: serde_json::Value =
            serde_json::from_slice(&STANDARD.decode(&token).unwrap()).unwrap();
        assert_eq!(json["username"], "admin");
        assert_eq!(json["assignedHospital"], "both");
        assert!(json["hospital"].is_null());
    }

    #[test]
    fn test_expired() {
        let codec = TokenCodec::default();
        let mut claims = codec.claims_for(&account());
        claims.exp = Utc::now().timestamp_millis() - 1;
        let token = codec.encode(&claims).unwrap();
        assert_eq!(codec.decode(&token).unwrap_err(), TokenError::Expired);
    }

    #[test]
    fn test_malformed() {
        let codec = TokenCodec::default();
        assert_eq!(codec.decode("%%%").unwrap_err(), TokenError::Malformed);
        let not_claims = STANDARD.encode(r#"{"hello":"world"}"#);
        assert_eq!(codec.decode(&not_claims).unwrap_err(), TokenError::Malformed);
    }

    #[test]
    fn test_signed_tokens() {
        let codec = TokenCodec::new(Some("s3cret".to_string()), 30);
        let token = codec.issue(&account()).unwrap();
        assert!(token.contains('.'));
        assert!(codec.decode(&token).is_ok());

        let (payload, _) = token.split_once('.').unwrap();
        assert_eq!(codec.decode(payload).unwrap_err(), TokenError::BadSignature);

        let other = TokenCodec::new(Some("other".to_string()), 30);
        assert_eq!(other.decode(&token).unwrap_err(), TokenError::BadSignature);
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let codec = TokenCodec::new(Some("s3cret".to_string()), 30);
        let token = codec.issue(&account()).unwrap();
        let (_, signature) = token.split_once('.').unwrap();

        let mut forged = codec.claims_for(&account());
        forged.role = Role::Minister;
        let payload = TokenCodec::default().encode(&forged).unwrap();
        let tampered = format!("{}.{}", payload, signature);
        assert_eq!(codec.decode(&tampered).unwrap_err(), TokenError::BadSignature);

        assert_eq!(
            codec.decode(&format!("{}.not base64!", payload)).unwrap_err(),
            TokenError::BadSignature
        );
    }

    #[test]
    fn test_ttl_is_clamped() {
        let huge = TokenCodec::new(None, i64::MAX);
        assert_eq!(huge.ttl_seconds(), MAX_TTL_DAYS * 24 * 3600);
        assert!(huge.issue(&account()).is_ok());

        let zero = TokenCodec::new(None, 0);
        assert_eq!(zero.ttl_seconds(), 24 * 3600);
    }
}
