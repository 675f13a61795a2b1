//! Warning log (выговоры)

use serde::Serialize;

use crate::store::error::{Entity, StoreError, StoreResult};
use crate::store::points::{Subject, SubjectFilter};
use crate::store::types::{next_id, today, Actor, HospitalScope, Role};

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Warning {
    pub id: u64,
    pub user_id: u64,
    pub user_role: Role,
    pub user_hospital: Option<HospitalScope>,
    pub user_name: String,
    pub reason: String,
    pub issued_by: Option<String>,
    pub issued_by_id: Option<u64>,
    pub issued_by_name: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Default)]
pub struct WarningLog {
    warnings: Vec<Warning>,
}

impl WarningLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list(&self, filter: &SubjectFilter) -> Vec<Warning> {
        self.warnings
            .iter()
            .filter(|w| filter.matches(w.user_id, w.user_role, w.user_hospital))
            .cloned()
            .collect()
    }

    pub fn issue(&mut self, subject: Subject, reason: String, actor: &Actor) -> StoreResult<Warning> {
        if reason.trim().is_empty() {
            return Err(StoreError::invalid("Не указана причина"));
        }

        let warning = Warning {
            id: next_id(self.warnings.iter().map(|w| w.id)),
            user_id: subject.user_id,
            user_role: subject.user_role,
            user_hospital: subject.user_hospital,
            user_name: subject.user_name,
            reason,
            issued_by: actor.role.clone(),
            issued_by_id: actor.id,
            issued_by_name: actor.name.clone(),
            created_at: today(),
        };
        self.warnings.push(warning.clone());
        Ok(warning)
    }

    pub fn delete(&mut self, id: u64) -> StoreResult<Warning> {
        let index = self
            .warnings
            .iter()
            .position(|w| w.id == id)
            .ok_or(StoreError::NotFound(Entity::Warning))?;
        Ok(self.warnings.remove(index))
    }

    pub(crate) fn insert_seed(&mut self, warning: Warning) {
        self.warnings.push(warning);
    }
}
