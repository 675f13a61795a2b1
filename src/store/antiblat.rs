//! Antiblat registry
//!
//! Per-hospital list of high-rank staff protected from arbitrary demotion.
//! Ids are unique across both hospitals.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::store::error::{Entity, StoreError, StoreResult};
use crate::store::types::{next_id, today, Actor, Hospital};

/// Lowest and highest rank that can be registered
pub const MIN_RANK: i64 = 5;
pub const MAX_RANK: i64 = 8;

/// Why a player is on the list
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AntiblatReason {
    /// Recruited through a call-up
    Call,
    /// Trusted person of the leadership
    Trusted,
    /// Earned through an accepted report
    Report,
}

impl FromStr for AntiblatReason {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "call" => Ok(AntiblatReason::Call),
            "trusted" => Ok(AntiblatReason::Trusted),
            "report" => Ok(AntiblatReason::Report),
            _ => Err(StoreError::invalid("Неверная причина")),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AntiblatEntry {
    pub id: u64,
    pub nickname: String,
    pub rank: i64,
    pub vk: Option<String>,
    pub reason: AntiblatReason,
    /// Only kept for `report` entries
    pub report_link: Option<String>,
    pub added_by: Option<String>,
    pub added_by_id: Option<u64>,
    pub added_by_name: Option<String>,
    pub created_at: String,
    pub hospital: Hospital,
}

/// Editable fields of an entry
#[derive(Debug, Clone)]
pub struct AntiblatDraft {
    pub nickname: String,
    pub rank: i64,
    pub vk: Option<String>,
    pub reason: AntiblatReason,
    pub report_link: Option<String>,
}

impl AntiblatDraft {
    fn validate(&self) -> StoreResult<()> {
        if self.nickname.trim().is_empty() {
            return Err(StoreError::invalid("Не указан никнейм"));
        }
        if !(MIN_RANK..=MAX_RANK).contains(&self.rank) {
            return Err(StoreError::invalid(format!(
                "Ранг должен быть от {} до {}",
                MIN_RANK, MAX_RANK
            )));
        }
        Ok(())
    }

    fn report_link(&self) -> Option<String> {
        match self.reason {
            AntiblatReason::Report => self.report_link.clone(),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct AntiblatRegistry {
    ls: Vec<AntiblatEntry>,
    lv: Vec<AntiblatEntry>,
}

impl AntiblatRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list(&self, hospital: Hospital) -> &[AntiblatEntry] {
        match hospital {
            Hospital::Ls => &self.ls,
            Hospital::Lv => &self.lv,
        }
    }

    fn list_mut(&mut self, hospital: Hospital) -> &mut Vec<AntiblatEntry> {
        match hospital {
            Hospital::Ls => &mut self.ls,
            Hospital::Lv => &mut self.lv,
        }
    }

    pub fn len(&self) -> usize {
        self.ls.len() + self.lv.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn create(
        &mut self,
        hospital: Hospital,
        draft: AntiblatDraft,
        actor: &Actor,
    ) -> StoreResult<AntiblatEntry> {
        draft.validate()?;

        let id = next_id(self.ls.iter().chain(self.lv.iter()).map(|e| e.id));
        let entry = AntiblatEntry {
            id,
            report_link: draft.report_link(),
            nickname: draft.nickname,
            rank: draft.rank,
            vk: draft.vk,
            reason: draft.reason,
            added_by: actor.role.clone(),
            added_by_id: actor.id,
            added_by_name: actor.name.clone(),
            created_at: today(),
            hospital,
        };

        self.list_mut(hospital).push(entry.clone());
        Ok(entry)
    }

    pub fn update(
        &mut self,
        hospital: Hospital,
        id: u64,
        draft: AntiblatDraft,
    ) -> StoreResult<AntiblatEntry> {
        draft.validate()?;

        let entry = self
            .list_mut(hospital)
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(StoreError::NotFound(Entity::AntiblatEntry))?;

        entry.report_link = draft.report_link();
        entry.nickname = draft.nickname;
        entry.rank = draft.rank;
        entry.vk = draft.vk;
        entry.reason = draft.reason;

        Ok(entry.clone())
    }

    pub fn delete(&mut self, hospital: Hospital, id: u64) -> StoreResult<AntiblatEntry> {
        let list = self.list_mut(hospital);
        let index = list
            .iter()
            .position(|e| e.id == id)
            .ok_or(StoreError::NotFound(Entity::AntiblatEntry))?;
        Ok(list.remove(index))
    }

    pub(crate) fn insert_seed(&mut self, entry: AntiblatEntry) {
        self.list_mut(entry.hospital).push(entry);
    }
}
