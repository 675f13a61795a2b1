//! Supervisors (следящие) shared by both hospitals

use serde::Serialize;

use crate::store::error::{Entity, StoreError, StoreResult};
use crate::store::types::{next_id, today, HospitalScope, Role};

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Supervisor {
    pub id: u64,
    pub nickname: String,
    /// One of the supervisor ranks
    #[serde(rename = "type")]
    pub kind: Role,
    pub login: String,
    pub vk: Option<String>,
    pub created_at: String,
    pub assigned_hospital: HospitalScope,
}

#[derive(Debug, Clone)]
pub struct SupervisorDraft {
    pub nickname: String,
    pub kind: Role,
    pub login: String,
    /// Required on creation; on update only replaced when given
    pub password: Option<String>,
    pub vk: Option<String>,
    pub assigned_hospital: HospitalScope,
}

impl SupervisorDraft {
    fn validate(&self) -> StoreResult<()> {
        if self.nickname.trim().is_empty() {
            return Err(StoreError::invalid("Не указан никнейм"));
        }
        if self.login.trim().is_empty() {
            return Err(StoreError::invalid("Не указан логин"));
        }
        if !self.kind.is_supervisor() {
            return Err(StoreError::invalid("Неверный тип следящего"));
        }
        Ok(())
    }
}

/// Listing filter; the hospital filter also matches `both` assignments
#[derive(Debug, Clone, Default)]
pub struct SupervisorFilter {
    pub kind: Option<Role>,
    pub assigned_hospital: Option<HospitalScope>,
}

#[derive(Debug, Default)]
pub struct SupervisorRoster {
    supervisors: Vec<Supervisor>,
}

impl SupervisorRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: u64) -> Option<&Supervisor> {
        self.supervisors.iter().find(|s| s.id == id)
    }

    pub fn list(&self, filter: &SupervisorFilter) -> Vec<Supervisor> {
        self.supervisors
            .iter()
            .filter(|s| filter.kind.map_or(true, |k| s.kind == k))
            .filter(|s| {
                filter.assigned_hospital.map_or(true, |scope| {
                    s.assigned_hospital == scope || s.assigned_hospital == HospitalScope::Both
                })
            })
            .cloned()
            .collect()
    }

    pub fn create(&mut self, draft: SupervisorDraft) -> StoreResult<Supervisor> {
        draft.validate()?;
        if draft.password.as_deref().map_or(true, str::is_empty) {
            return Err(StoreError::invalid("Не указан пароль"));
        }

        if self.supervisors.iter().any(|s| s.login == draft.login) {
            return Err(StoreError::DuplicateLogin(draft.login));
        }

        let supervisor = Supervisor {
            id: next_id(self.supervisors.iter().map(|s| s.id)),
            nickname: draft.nickname,
            kind: draft.kind,
            login: draft.login,
            vk: draft.vk,
            created_at: today(),
            assigned_hospital: draft.assigned_hospital,
        };
        self.supervisors.push(supervisor.clone());
        Ok(supervisor)
    }

    /// Returns the updated supervisor and its previous login
    pub fn update(&mut self, id: u64, draft: SupervisorDraft) -> StoreResult<(Supervisor, String)> {
        draft.validate()?;

        if self
            .supervisors
            .iter()
            .any(|s| s.login == draft.login && s.id != id)
        {
            return Err(StoreError::DuplicateLogin(draft.login));
        }

        let supervisor = self
            .supervisors
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(StoreError::NotFound(Entity::Supervisor))?;

        let previous_login = std::mem::replace(&mut supervisor.login, draft.login);
        supervisor.nickname = draft.nickname;
        supervisor.kind = draft.kind;
        supervisor.vk = draft.vk;
        supervisor.assigned_hospital = draft.assigned_hospital;

        Ok((supervisor.clone(), previous_login))
    }

    pub fn delete(&mut self, id: u64) -> StoreResult<Supervisor> {
        let index = self
            .supervisors
            .iter()
            .position(|s| s.id == id)
            .ok_or(StoreError::NotFound(Entity::Supervisor))?;
        Ok(self.supervisors.remove(index))
    }

    pub(crate) fn insert_seed(&mut self, supervisor: Supervisor) {
        self.supervisors.push(supervisor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(login: &str, kind: Role, scope: HospitalScope) -> SupervisorDraft {
        SupervisorDraft {
            nickname: format!("Nick_{}", login),
            kind,
            login: login.to_string(),
            password: Some("password123".to_string()),
            vk: None,
            assigned_hospital: scope,
        }
    }

    #[test]
    fn test_create_and_filter() {
        let mut roster = SupervisorRoster::new();
        roster.create(draft("main", Role::MainSupervisor, HospitalScope::Both)).unwrap();
        roster.create(draft("sup_ls", Role::Supervisor, HospitalScope::Ls)).unwrap();
        roster.create(draft("sup_lv", Role::Supervisor, HospitalScope::Lv)).unwrap();

        let ls = roster.list(&SupervisorFilter {
            assigned_hospital: Some(HospitalScope::Ls),
            ..Default::default()
        });
        let logins: Vec<&str> = ls.iter().map(|s| s.login.as_str()).collect();
        assert_eq!(logins, vec!["main", "sup_ls"]);

        let plain = roster.list(&SupervisorFilter {
            kind: Some(Role::Supervisor),
            ..Default::default()
        });
        assert_eq!(plain.len(), 2);
    }

    #[test]
    fn test_duplicate_login() {
        let mut roster = SupervisorRoster::new();
        roster.create(draft("a", Role::Supervisor, HospitalScope::Ls)).unwrap();
        assert!(matches!(
            roster.create(draft("a", Role::Supervisor, HospitalScope::Lv)),
            Err(StoreError::DuplicateLogin(_))
        ));
    }

    #[test]
    fn test_kind_must_be_supervisor_rank() {
        let mut roster = SupervisorRoster::new();
        assert!(roster.create(draft("a", Role::Leader, HospitalScope::Ls)).is_err());
    }

    #[test]
    fn test_update_without_password() {
        let mut roster = SupervisorRoster::new();
        let created = roster.create(draft("a", Role::Supervisor, HospitalScope::Ls)).unwrap();

        let mut edit = draft("a", Role::DeputyMainSupervisor, HospitalScope::Lv);
        edit.password = None;
        let (updated, previous) = roster.update(created.id, edit).unwrap();
        assert_eq!(previous, "a");
        assert_eq!(updated.kind, Role::DeputyMainSupervisor);
        assert_eq!(updated.created_at, created.created_at);
    }

    #[test]
    fn test_delete_missing() {
        let mut roster = SupervisorRoster::new();
        assert_eq!(
            roster.delete(42).unwrap_err(),
            StoreError::NotFound(Entity::Supervisor)
        );
    }

    #[test]
    fn test_serialized_as_type() {
        let mut roster = SupervisorRoster::new();
        let s = roster.create(draft("a", Role::Supervisor, HospitalScope::Ls)).unwrap();
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["type"], "supervisor");
        assert_eq!(json["assignedHospital"], "ls");
        assert!(json.get("passwordHash").is_none());
    }
}
