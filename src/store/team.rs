//! Hospital teams: deputies by position and the shared minister
//!
//! Leaders live in [`crate::store::leaders`]; the team view joins them in.

use serde::Serialize;

use crate::store::error::{StoreError, StoreResult};
use crate::store::leaders::Leader;
use crate::store::types::{today, Hospital, HospitalScope};

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Deputy {
    pub id: u64,
    pub position: i64,
    pub name: String,
    pub vk: Option<String>,
    pub login: String,
    pub appointed_at: String,
    pub hospital: Hospital,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Minister {
    pub id: u64,
    pub name: String,
    pub vk: Option<String>,
    pub login: String,
    pub appointed_at: String,
    /// The minister always serves both hospitals
    pub hospital: HospitalScope,
}

/// Person being appointed as deputy or minister
#[derive(Debug, Clone, Default)]
pub struct MemberDraft {
    pub name: String,
    pub vk: Option<String>,
    pub login: String,
    pub password: String,
}

impl MemberDraft {
    fn validate(&self) -> StoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(StoreError::invalid("Не указано имя"));
        }
        if self.login.trim().is_empty() || self.password.is_empty() {
            return Err(StoreError::invalid("Не указан логин или пароль"));
        }
        Ok(())
    }
}

/// Leader and deputies of one hospital
#[derive(Debug, Clone, Serialize)]
pub struct HospitalTeam {
    pub leader: Option<Leader>,
    pub deputies: Vec<Deputy>,
}

/// Team listing, either for one hospital or for both
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum TeamView {
    Hospital {
        #[serde(flatten)]
        team: HospitalTeam,
        minister: Option<Minister>,
    },
    All {
        ls: HospitalTeam,
        lv: HospitalTeam,
        minister: Option<Minister>,
    },
}

#[derive(Debug, Default)]
pub struct TeamRoster {
    ls_deputies: Vec<Deputy>,
    lv_deputies: Vec<Deputy>,
    minister: Option<Minister>,
    last_id: u64,
}

impl TeamRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deputies(&self, hospital: Hospital) -> &[Deputy] {
        match hospital {
            Hospital::Ls => &self.ls_deputies,
            Hospital::Lv => &self.lv_deputies,
        }
    }

    fn deputies_mut(&mut self, hospital: Hospital) -> &mut Vec<Deputy> {
        match hospital {
            Hospital::Ls => &mut self.ls_deputies,
            Hospital::Lv => &mut self.lv_deputies,
        }
    }

    pub fn minister(&self) -> Option<&Minister> {
        self.minister.as_ref()
    }

    fn allocate_id(&mut self) -> u64 {
        self.last_id += 1;
        self.last_id
    }

    /// Appoint a deputy; an existing deputy at the same position is replaced
    /// and returned.
    pub fn appoint_deputy(
        &mut self,
        hospital: Hospital,
        position: i64,
        draft: MemberDraft,
    ) -> StoreResult<(Deputy, Option<Deputy>)> {
        draft.validate()?;
        if position < 1 {
            return Err(StoreError::invalid("Неверная позиция заместителя"));
        }

        let deputy = Deputy {
            id: self.allocate_id(),
            position,
            name: draft.name,
            vk: draft.vk,
            login: draft.login,
            appointed_at: today(),
            hospital,
        };

        let deputies = self.deputies_mut(hospital);
        let replaced = match deputies.iter_mut().find(|d| d.position == position) {
            Some(existing) => Some(std::mem::replace(existing, deputy.clone())),
            None => {
                deputies.push(deputy.clone());
                deputies.sort_by_key(|d| d.position);
                None
            }
        };

        Ok((deputy, replaced))
    }

    /// Replace the minister, returning the new one and the predecessor
    pub fn appoint_minister(&mut self, draft: MemberDraft) -> StoreResult<(Minister, Option<Minister>)> {
        draft.validate()?;

        let minister = Minister {
            id: self.allocate_id(),
            name: draft.name,
            vk: draft.vk,
            login: draft.login,
            appointed_at: today(),
            hospital: HospitalScope::Both,
        };

        let replaced = self.minister.replace(minister.clone());
        Ok((minister, replaced))
    }

    pub fn remove_deputy(&mut self, hospital: Hospital, position: i64) -> Option<Deputy> {
        let deputies = self.deputies_mut(hospital);
        let index = deputies.iter().position(|d| d.position == position)?;
        Some(deputies.remove(index))
    }

    pub fn remove_minister(&mut self) -> Option<Minister> {
        self.minister.take()
    }

    /// Find the deputy or minister signed in under this login
    pub fn member_name(&self, login: &str) -> Option<&str> {
        self.ls_deputies
            .iter()
            .chain(self.lv_deputies.iter())
            .find(|d| d.login == login)
            .map(|d| d.name.as_str())
            .or_else(|| {
                self.minister
                    .as_ref()
                    .filter(|m| m.login == login)
                    .map(|m| m.name.as_str())
            })
    }

    pub(crate) fn insert_seed_deputy(&mut self, deputy: Deputy) {
        self.last_id = self.last_id.max(deputy.id);
        let hospital = deputy.hospital;
        self.deputies_mut(hospital).push(deputy);
    }

    pub(crate) fn insert_seed_minister(&mut self, minister: Minister) {
        self.last_id = self.last_id.max(minister.id);
        self.minister = Some(minister);
    }
}
