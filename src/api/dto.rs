//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.
//!
//! Request fields are loose: most are optional, and numbers may arrive as
//! strings. Handlers validate them into store types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::api::error::{ApiError, ApiResult};
use crate::auth::SessionClaims;
use crate::store::{Account, Hospital, HospitalScope, Role, Service, SubjectFilter};

// ============================================
// SHARED
// ============================================

/// A number that may be sent as a JSON number or a numeric string
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Loose {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Loose {
    /// Integer value, truncating decimals
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Loose::Int(n) => Some(*n),
            Loose::Float(f) => float_to_i64(*f),
            Loose::Text(s) => parse_int(s),
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        self.as_i64().and_then(|n| u64::try_from(n).ok())
    }
}

/// Integer from text, accepting a decimal part
pub fn parse_int(text: &str) -> Option<i64> {
    let text = text.trim();
    text.parse::<i64>()
        .ok()
        .or_else(|| text.parse::<f64>().ok().and_then(float_to_i64))
}

/// Truncated value, or `None` when it does not fit an i64
fn float_to_i64(f: f64) -> Option<i64> {
    let f = f.trunc();
    // i64::MAX as f64 rounds up to 2^63
    if f.is_finite() && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

pub fn parse_hospital(value: Option<&str>) -> ApiResult<Hospital> {
    value
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| ApiError::Validation("Неверная больница".to_string()))
}

pub fn parse_scope(value: Option<&str>, message: &str) -> ApiResult<HospitalScope> {
    value
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| ApiError::Validation(message.to_string()))
}

/// Optional scope; present but unknown values are an error
pub fn parse_optional_scope(value: Option<&str>) -> ApiResult<Option<HospitalScope>> {
    match value.filter(|v| !v.is_empty()) {
        Some(v) => v.parse().map(Some).map_err(ApiError::from),
        None => Ok(None),
    }
}

pub fn parse_role(value: Option<&str>) -> ApiResult<Role> {
    value
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| ApiError::Validation("Неверная роль".to_string()))
}

pub fn parse_optional_role(value: Option<&str>) -> ApiResult<Option<Role>> {
    match value.filter(|v| !v.is_empty()) {
        Some(v) => v.parse().map(Some).map_err(ApiError::from),
        None => Ok(None),
    }
}

/// Id from a body field
pub fn require_id(value: Option<&Loose>, message: &str) -> ApiResult<u64> {
    value
        .and_then(Loose::as_u64)
        .ok_or_else(|| ApiError::Validation(message.to_string()))
}

/// Id from a query parameter
pub fn require_query_id(value: Option<&str>, message: &str) -> ApiResult<u64> {
    value
        .and_then(parse_int)
        .and_then(|n| u64::try_from(n).ok())
        .ok_or_else(|| ApiError::Validation(message.to_string()))
}

/// Either one hospital's value or both, keyed by hospital
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum PerHospital<T> {
    One(T),
    Both { ls: T, lv: T },
}

/// Deletion and bulk-update acknowledgement
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HospitalQuery {
    pub hospital: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CategoryQuery {
    pub category: Option<String>,
}

// ============================================
// AUTH DTOs
// ============================================

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Public view of a signed-in user
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: u64,
    pub username: String,
    pub role: Role,
    pub hospital: Option<HospitalScope>,
    pub assigned_hospital: Option<HospitalScope>,
}

impl From<&Account> for UserResponse {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            username: account.username.clone(),
            role: account.role,
            hospital: account.hospital,
            assigned_hospital: account.assigned_hospital,
        }
    }
}

impl From<&SessionClaims> for UserResponse {
    fn from(claims: &SessionClaims) -> Self {
        Self {
            id: claims.id,
            username: claims.username.clone(),
            role: claims.role,
            hospital: claims.hospital,
            assigned_hospital: claims.assigned_hospital,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct SessionCheckResponse {
    pub id: u64,
    pub username: String,
    pub role: Role,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub role: Option<String>,
    pub hospital: Option<String>,
    pub assigned_hospital: Option<String>,
}

// ============================================
// ANTIBLAT DTOs
// ============================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AntiblatRequest {
    pub id: Option<Loose>,
    pub hospital: Option<String>,
    #[serde(default)]
    pub nickname: String,
    pub rank: Option<Loose>,
    pub vk: Option<String>,
    pub reason: Option<String>,
    pub report_link: Option<String>,
    pub added_by: Option<String>,
    pub added_by_id: Option<Loose>,
    pub added_by_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AntiblatDeleteQuery {
    pub id: Option<String>,
    pub hospital: Option<String>,
}

// ============================================
// LEADER DTOs
// ============================================

#[derive(Debug, Default, Deserialize)]
pub struct LeadersQuery {
    pub id: Option<String>,
    pub hospital: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderRequest {
    pub id: Option<Loose>,
    pub hospital: Option<String>,
    #[serde(default)]
    pub nickname: String,
    pub vk: Option<String>,
    pub email: Option<String>,
    pub discord: Option<String>,
    pub forum_link: Option<String>,
    pub goal: Option<String>,
    #[serde(default)]
    pub login: String,
    pub password: Option<String>,
}

// ============================================
// POINTS / WARNINGS DTOs
// ============================================

/// Filter for points and warnings listings
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectQuery {
    pub user_id: Option<String>,
    pub user_role: Option<String>,
    pub hospital: Option<String>,
}

impl SubjectQuery {
    /// Store filter; unknown roles or hospitals are rejected
    pub fn filter(&self) -> ApiResult<SubjectFilter> {
        Ok(SubjectFilter {
            user_id: self
                .user_id
                .as_deref()
                .and_then(parse_int)
                .and_then(|id| u64::try_from(id).ok()),
            user_role: parse_optional_role(self.user_role.as_deref())?,
            hospital: parse_optional_scope(self.hospital.as_deref())?,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointsResponse {
    pub points: Vec<crate::store::PointEntry>,
    pub total_points: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwardPointsRequest {
    pub user_id: Option<Loose>,
    pub user_role: Option<String>,
    pub user_hospital: Option<String>,
    #[serde(default)]
    pub user_name: String,
    pub amount: Option<Loose>,
    #[serde(default)]
    pub reason: String,
    pub added_by: Option<String>,
    pub added_by_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueWarningRequest {
    pub user_id: Option<Loose>,
    pub user_role: Option<String>,
    pub user_hospital: Option<String>,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub reason: String,
    pub issued_by: Option<String>,
    pub issued_by_id: Option<Loose>,
    pub issued_by_name: Option<String>,
}

// ============================================
// PRICE DTOs
// ============================================

#[derive(Debug, Default, Deserialize)]
pub struct PricesQuery {
    pub category: Option<String>,
    pub requests: Option<String>,
}

/// Body of `POST /api/prices`; `type` selects the action
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceActionRequest {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Service id → new price
    pub changes: Option<BTreeMap<String, Loose>>,
    pub requested_by: Option<String>,
    pub requested_by_id: Option<Loose>,
    pub requested_by_name: Option<String>,
    pub request_id: Option<Loose>,
    pub admin_id: Option<Loose>,
    pub admin_name: Option<String>,
    pub reason: Option<String>,
}

/// Returned for an unknown category
#[derive(Debug, Default, Serialize)]
pub struct EmptyCategory {
    pub services: Vec<Service>,
}

// ============================================
// SUPERVISOR DTOs
// ============================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupervisorsQuery {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub assigned_hospital: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupervisorRequest {
    pub id: Option<Loose>,
    #[serde(default)]
    pub nickname: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub login: String,
    pub password: Option<String>,
    pub vk: Option<String>,
    pub assigned_hospital: Option<String>,
}

// ============================================
// TASK DTOs
// ============================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TasksQuery {
    pub id: Option<String>,
    pub status: Option<String>,
    pub user_id: Option<String>,
}

/// Body of `POST /api/tasks`; `type` selects the action
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskActionRequest {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    // create
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub detailed_description: String,
    pub points: Option<Loose>,
    pub difficulty: Option<String>,
    #[serde(default)]
    pub requirements: String,
    // submit
    pub task_id: Option<Loose>,
    pub user_id: Option<Loose>,
    pub user_role: Option<String>,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub proof: String,
    pub comment: Option<String>,
    // review
    pub submission_id: Option<Loose>,
    pub admin_id: Option<Loose>,
    pub admin_name: Option<String>,
    pub reason: Option<String>,
}

// ============================================
// TEAM DTOs
// ============================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamRequest {
    pub hospital: Option<String>,
    pub role: Option<String>,
    pub position: Option<Loose>,
    #[serde(default)]
    pub name: String,
    pub vk: Option<String>,
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub password: String,
    pub email: Option<String>,
    pub discord: Option<String>,
    pub forum_link: Option<String>,
    pub goal: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TeamDeleteQuery {
    pub hospital: Option<String>,
    pub role: Option<String>,
    pub position: Option<String>,
}

// ============================================
// HEALTH DTOs
// ============================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_seconds: u64,
    pub version: String,
    pub accounts: usize,
    pub pending_price_requests: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loose_numbers() {
        let values: Vec<Loose> = serde_json::from_str(r#"[7, "8", " 12 ", 5.9, "6.5", "abc"]"#).unwrap();
        let parsed: Vec<Option<i64>> = values.iter().map(Loose::as_i64).collect();
        assert_eq!(parsed, vec![Some(7), Some(8), Some(12), Some(5), Some(6), None]);
        assert_eq!(Loose::Int(-1).as_u64(), None);
    }

    #[test]
    fn test_out_of_range_numbers_rejected() {
        assert_eq!(parse_int("1e30"), None);
        assert_eq!(parse_int("-1e30"), None);
        assert_eq!(parse_int("9223372036854775808"), None);
        assert_eq!(parse_int("inf"), None);
        assert_eq!(parse_int("NaN"), None);
        assert_eq!(Loose::Float(1e19).as_i64(), None);
        assert_eq!(Loose::Text("1e3".to_string()).as_i64(), Some(1000));
        assert_eq!(parse_int("9223372036854775807"), Some(i64::MAX));
    }

    #[test]
    fn test_parse_hospital() {
        assert_eq!(parse_hospital(Some("lv")).unwrap(), Hospital::Lv);
        assert!(parse_hospital(Some("both")).is_err());
        assert!(parse_hospital(None).is_err());
    }

    #[test]
    fn test_optional_parsers() {
        assert_eq!(parse_optional_scope(None).unwrap(), None);
        assert_eq!(parse_optional_scope(Some("")).unwrap(), None);
        assert_eq!(parse_optional_scope(Some("both")).unwrap(), Some(HospitalScope::Both));
        assert!(parse_optional_scope(Some("sf")).is_err());
        assert!(parse_optional_role(Some("admin")).is_err());
    }

    #[test]
    fn test_price_changes_accept_strings() {
        let body: PriceActionRequest = serde_json::from_str(
            r#"{"type": "request", "changes": {"1": "65000", "10": 410000}, "requestedById": "4"}"#,
        )
        .unwrap();
        let changes = body.changes.unwrap();
        assert_eq!(changes["1"].as_i64(), Some(65000));
        assert_eq!(changes["10"].as_i64(), Some(410000));
        assert_eq!(body.requested_by_id.and_then(|v| v.as_u64()), Some(4));
    }

    #[test]
    fn test_per_hospital_shapes() {
        let one = serde_json::to_value(PerHospital::One(vec![1])).unwrap();
        assert_eq!(one, serde_json::json!([1]));
        let both = serde_json::to_value(PerHospital::Both { ls: 1, lv: 2 }).unwrap();
        assert_eq!(both, serde_json::json!({"ls": 1, "lv": 2}));
    }
}
