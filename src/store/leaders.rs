//! Hospital leaders
//!
//! Each hospital has at most one leader. Appointing a new one replaces the
//! current leader.

use serde::Serialize;

use crate::store::error::{Entity, StoreError, StoreResult};
use crate::store::types::{today, Hospital};

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Leader {
    pub id: u64,
    pub nickname: String,
    pub vk: Option<String>,
    pub email: Option<String>,
    pub discord: Option<String>,
    pub forum_link: Option<String>,
    pub goal: Option<String>,
    pub login: String,
    pub created_at: String,
    pub hospital: Hospital,
}

/// Editable fields of a leader
#[derive(Debug, Clone, Default)]
pub struct LeaderDraft {
    pub nickname: String,
    pub vk: Option<String>,
    pub email: Option<String>,
    pub discord: Option<String>,
    pub forum_link: Option<String>,
    pub goal: Option<String>,
    pub login: String,
    /// Required on appointment; on update only replaced when given
    pub password: Option<String>,
}

#[derive(Debug, Default)]
pub struct LeaderBoard {
    ls: Option<Leader>,
    lv: Option<Leader>,
    last_id: u64,
}

impl LeaderBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_hospital(&self, hospital: Hospital) -> Option<&Leader> {
        match hospital {
            Hospital::Ls => self.ls.as_ref(),
            Hospital::Lv => self.lv.as_ref(),
        }
    }

    fn slot_mut(&mut self, hospital: Hospital) -> &mut Option<Leader> {
        match hospital {
            Hospital::Ls => &mut self.ls,
            Hospital::Lv => &mut self.lv,
        }
    }

    pub fn get(&self, id: u64) -> Option<&Leader> {
        self.iter().find(|l| l.id == id)
    }

    pub fn by_login(&self, login: &str) -> Option<&Leader> {
        self.iter().find(|l| l.login == login)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Leader> {
        self.ls.iter().chain(self.lv.iter())
    }

    /// Install a new leader, returning it and the leader it replaced
    pub fn appoint(
        &mut self,
        hospital: Hospital,
        draft: LeaderDraft,
    ) -> StoreResult<(Leader, Option<Leader>)> {
        validate(&draft)?;
        if draft.password.as_deref().map_or(true, str::is_empty) {
            return Err(StoreError::invalid("Не указан пароль"));
        }

        // the outgoing leader of this hospital may be re-appointed
        if self
            .by_login(&draft.login)
            .is_some_and(|current| current.hospital != hospital)
        {
            return Err(StoreError::DuplicateLogin(draft.login));
        }

        self.last_id += 1;
        let leader = Leader {
            id: self.last_id,
            nickname: draft.nickname,
            vk: draft.vk,
            email: draft.email,
            discord: draft.discord,
            forum_link: draft.forum_link,
            goal: draft.goal,
            login: draft.login,
            created_at: today(),
            hospital,
        };

        let replaced = self.slot_mut(hospital).replace(leader.clone());
        Ok((leader, replaced))
    }

    /// Edit the current leader of `hospital`, which must have this id.
    ///
    /// Returns the updated leader and its previous login.
    pub fn update(
        &mut self,
        hospital: Hospital,
        id: u64,
        draft: LeaderDraft,
    ) -> StoreResult<(Leader, String)> {
        validate(&draft)?;

        if self.for_hospital(hospital).map(|l| l.id) != Some(id) {
            return Err(StoreError::NotFound(Entity::Leader));
        }
        if self.iter().any(|l| l.login == draft.login && l.id != id) {
            return Err(StoreError::DuplicateLogin(draft.login));
        }

        let leader = self
            .slot_mut(hospital)
            .as_mut()
            .ok_or(StoreError::NotFound(Entity::Leader))?;

        let previous_login = std::mem::replace(&mut leader.login, draft.login);
        leader.nickname = draft.nickname;
        leader.vk = draft.vk;
        leader.email = draft.email;
        leader.discord = draft.discord;
        leader.forum_link = draft.forum_link;
        leader.goal = draft.goal;

        Ok((leader.clone(), previous_login))
    }

    /// Clear the hospital's leader, returning who was removed
    pub fn remove(&mut self, hospital: Hospital) -> Option<Leader> {
        self.slot_mut(hospital).take()
    }

    pub(crate) fn insert_seed(&mut self, leader: Leader) {
        self.last_id = self.last_id.max(leader.id);
        let hospital = leader.hospital;
        *self.slot_mut(hospital) = Some(leader);
    }
}

fn validate(draft: &LeaderDraft) -> StoreResult<()> {
    if draft.nickname.trim().is_empty() {
        return Err(StoreError::invalid("Не указан никнейм"));
    }
    if draft.login.trim().is_empty() {
        return Err(StoreError::invalid("Не указан логин"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(login: &str) -> LeaderDraft {
        LeaderDraft {
            nickname: "Иван Петров".to_string(),
            login: login.to_string(),
            password: Some("password123".to_string()),
            goal: Some("Развитие больницы".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_appoint_replaces_current_leader() {
        let mut board = LeaderBoard::new();
        let (first, replaced) = board.appoint(Hospital::Ls, draft("leader_a")).unwrap();
        assert!(replaced.is_none());

        let (second, replaced) = board.appoint(Hospital::Ls, draft("leader_b")).unwrap();
        assert_eq!(replaced.map(|l| l.id), Some(first.id));
        assert_ne!(second.id, first.id);
        assert_eq!(board.for_hospital(Hospital::Ls).map(|l| l.id), Some(second.id));
        assert!(board.for_hospital(Hospital::Lv).is_none());
    }

    #[test]
    fn test_appoint_rejects_duplicate_login() {
        let mut board = LeaderBoard::new();
        board.appoint(Hospital::Ls, draft("leader_ls")).unwrap();
        let err = board.appoint(Hospital::Lv, draft("leader_ls")).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateLogin(_)));
    }

    #[test]
    fn test_reappoint_same_login() {
        let mut board = LeaderBoard::new();
        let (first, _) = board.appoint(Hospital::Ls, draft("leader_ls")).unwrap();
        let (second, replaced) = board.appoint(Hospital::Ls, draft("leader_ls")).unwrap();
        assert_eq!(replaced.map(|l| l.id), Some(first.id));
        assert_eq!(second.login, "leader_ls");
    }

    #[test]
    fn test_appoint_requires_password() {
        let mut board = LeaderBoard::new();
        let mut d = draft("x");
        d.password = None;
        assert!(board.appoint(Hospital::Ls, d).is_err());
    }

    #[test]
    fn test_update_requires_matching_id_and_hospital() {
        let mut board = LeaderBoard::new();
        let (leader, _) = board.appoint(Hospital::Lv, draft("leader_lv")).unwrap();

        assert_eq!(
            board.update(Hospital::Ls, leader.id, draft("leader_lv")).unwrap_err(),
            StoreError::NotFound(Entity::Leader)
        );

        let mut edit = draft("leader_lv2");
        edit.password = None;
        edit.goal = None;
        let (updated, previous) = board.update(Hospital::Lv, leader.id, edit).unwrap();
        assert_eq!(previous, "leader_lv");
        assert_eq!(updated.login, "leader_lv2");
        assert!(updated.goal.is_none());
        assert_eq!(updated.created_at, leader.created_at);
    }

    #[test]
    fn test_update_wrong_hospital_is_not_found_before_login_check() {
        let mut board = LeaderBoard::new();
        board.appoint(Hospital::Ls, draft("leader_ls")).unwrap();
        let (lv, _) = board.appoint(Hospital::Lv, draft("leader_lv")).unwrap();

        // taken login, but the id is not the LS leader
        assert_eq!(
            board.update(Hospital::Ls, lv.id, draft("leader_ls")).unwrap_err(),
            StoreError::NotFound(Entity::Leader)
        );
        assert!(matches!(
            board.update(Hospital::Lv, lv.id, draft("leader_ls")).unwrap_err(),
            StoreError::DuplicateLogin(_)
        ));
    }

    #[test]
    fn test_remove() {
        let mut board = LeaderBoard::new();
        board.appoint(Hospital::Ls, draft("leader_ls")).unwrap();
        assert!(board.remove(Hospital::Ls).is_some());
        assert!(board.remove(Hospital::Ls).is_none());
    }
}
