//! Point ledger for leaders, deputies and the minister

use serde::Serialize;

use crate::store::error::{Entity, StoreError, StoreResult};
use crate::store::types::{next_id, today, Actor, HospitalScope, Role};

/// Largest number of points one entry may award or take away
pub const MAX_AWARD: i64 = 1000;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PointEntry {
    pub id: u64,
    pub user_id: u64,
    pub user_role: Role,
    pub user_hospital: Option<HospitalScope>,
    pub user_name: String,
    pub amount: i64,
    pub reason: String,
    pub added_by: Option<String>,
    pub added_by_name: Option<String>,
    pub date: String,
}

/// Staff member a record is about
#[derive(Debug, Clone)]
pub struct Subject {
    pub user_id: u64,
    pub user_role: Role,
    pub user_hospital: Option<HospitalScope>,
    pub user_name: String,
}

/// Filter shared by the point ledger and the warning log
#[derive(Debug, Clone, Default)]
pub struct SubjectFilter {
    pub user_id: Option<u64>,
    pub user_role: Option<Role>,
    pub hospital: Option<HospitalScope>,
}

impl SubjectFilter {
    pub fn matches(&self, user_id: u64, role: Role, hospital: Option<HospitalScope>) -> bool {
        self.user_id.map_or(true, |id| id == user_id)
            && self.user_role.map_or(true, |r| r == role)
            && self.hospital.map_or(true, |h| hospital == Some(h))
    }
}

#[derive(Debug, Default)]
pub struct PointLedger {
    entries: Vec<PointEntry>,
}

impl PointLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list(&self, filter: &SubjectFilter) -> Vec<PointEntry> {
        self.entries
            .iter()
            .filter(|e| filter.matches(e.user_id, e.user_role, e.user_hospital))
            .cloned()
            .collect()
    }

    /// Sum of amounts, saturating at the i64 bounds
    pub fn total(entries: &[PointEntry]) -> i64 {
        entries
            .iter()
            .fold(0i64, |total, e| total.saturating_add(e.amount))
    }

    pub fn award(
        &mut self,
        subject: Subject,
        amount: i64,
        reason: String,
        actor: &Actor,
    ) -> StoreResult<PointEntry> {
        if amount == 0 {
            return Err(StoreError::invalid("Количество баллов не может быть нулевым"));
        }
        if !(-MAX_AWARD..=MAX_AWARD).contains(&amount) {
            return Err(StoreError::invalid(format!(
                "Количество баллов не может превышать {}",
                MAX_AWARD
            )));
        }
        if reason.trim().is_empty() {
            return Err(StoreError::invalid("Не указана причина"));
        }

        let entry = PointEntry {
            id: next_id(self.entries.iter().map(|e| e.id)),
            user_id: subject.user_id,
            user_role: subject.user_role,
            user_hospital: subject.user_hospital,
            user_name: subject.user_name,
            amount,
            reason,
            added_by: actor.role.clone(),
            added_by_name: actor.name.clone(),
            date: today(),
        };
        self.entries.push(entry.clone());
        Ok(entry)
    }

    pub fn delete(&mut self, id: u64) -> StoreResult<PointEntry> {
        let index = self
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or(StoreError::NotFound(Entity::PointEntry))?;
        Ok(self.entries.remove(index))
    }

    pub(crate) fn insert_seed(&mut self, entry: PointEntry) {
        self.entries.push(entry);
    }
}
