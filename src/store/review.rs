//! Pending → approved / rejected review shared by price requests and task
//! submissions

use serde::Serialize;

use crate::store::error::{Entity, StoreError, StoreResult};
use crate::store::types::{today, Actor};

/// Tag stored in `approvedBy` / `rejectedBy` when the reviewer is unknown
const DEFAULT_REVIEWER: &str = "admin";

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
}

/// Audit fields stamped when a request is reviewed
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewTrail {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_by_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_by_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected_by_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected_by_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

/// Move `status` to approved and stamp the trail
pub fn approve(
    status: &mut ReviewStatus,
    trail: &mut ReviewTrail,
    reviewer: &Actor,
    entity: Entity,
) -> StoreResult<()> {
    ensure_pending(*status, entity)?;
    *status = ReviewStatus::Approved;
    trail.approved_at = Some(today());
    trail.approved_by = Some(reviewer_tag(reviewer));
    trail.approved_by_id = reviewer.id;
    trail.approved_by_name = reviewer.name.clone();
    Ok(())
}

/// Move `status` to rejected, storing the reason
pub fn reject(
    status: &mut ReviewStatus,
    trail: &mut ReviewTrail,
    reviewer: &Actor,
    reason: Option<String>,
    entity: Entity,
) -> StoreResult<()> {
    ensure_pending(*status, entity)?;
    *status = ReviewStatus::Rejected;
    trail.rejected_at = Some(today());
    trail.rejected_by = Some(reviewer_tag(reviewer));
    trail.rejected_by_id = reviewer.id;
    trail.rejected_by_name = reviewer.name.clone();
    trail.rejection_reason = reason;
    Ok(())
}

fn ensure_pending(status: ReviewStatus, entity: Entity) -> StoreResult<()> {
    match status {
        ReviewStatus::Pending => Ok(()),
        _ => Err(StoreError::AlreadyReviewed(entity)),
    }
}

fn reviewer_tag(reviewer: &Actor) -> String {
    reviewer
        .role
        .clone()
        .unwrap_or_else(|| DEFAULT_REVIEWER.to_string())
}
