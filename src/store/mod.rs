//! Ministry in-memory store
//!
//! Every collection the portal manages, held in one [`Registry`]:
//!
//! - **accounts**: login directory used by authentication
//! - **antiblat**: per-hospital protected staff list
//! - **leaders** / **team** / **supervisors**: who runs what
//! - **points** / **warnings**: rewards and reprimands
//! - **prices**: service catalog and price-change requests
//! - **tasks**: tasks and their submissions
//!
//! # Architecture
//!
//! ```text
//! Handler → Store::write() ──► RwLock<Registry> ──► collection op
//!                                  │
//!                                  └─► account sync (appoint / rename / remove)
//! ```
//!
//! A mutation holds the write guard for its whole read-modify-write, so
//! concurrent requests never lose updates. Nothing is persisted; state is
//! rebuilt from [`seed`] on start.

pub mod accounts;
pub mod antiblat;
pub mod dashboard;
pub mod error;
pub mod leaders;
pub mod points;
pub mod prices;
pub mod review;
pub mod seed;
pub mod supervisors;
pub mod tasks;
pub mod team;
pub mod types;
pub mod warnings;

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};

pub use accounts::{Account, AccountDirectory, AccountUpsert};
pub use antiblat::{AntiblatDraft, AntiblatEntry, AntiblatReason, AntiblatRegistry};
pub use dashboard::{Dashboard, Viewer};
pub use error::{Entity, StoreError, StoreResult};
pub use leaders::{Leader, LeaderBoard, LeaderDraft};
pub use points::{PointEntry, PointLedger, Subject, SubjectFilter};
pub use prices::{PriceBook, PriceChange, PriceChangeRequest, Service, ServiceCategory};
pub use review::{ReviewStatus, ReviewTrail};
pub use supervisors::{Supervisor, SupervisorDraft, SupervisorFilter, SupervisorRoster};
pub use tasks::{Difficulty, SubmissionDraft, Task, TaskBoard, TaskDraft, TaskSubmission};
pub use team::{Deputy, HospitalTeam, MemberDraft, Minister, TeamRoster, TeamView};
pub use types::{Actor, Hospital, HospitalScope, Role};
pub use warnings::{Warning, WarningLog};

/// All collections
#[derive(Debug, Default)]
pub struct Registry {
    pub accounts: AccountDirectory,
    pub antiblat: AntiblatRegistry,
    pub leaders: LeaderBoard,
    pub team: TeamRoster,
    pub supervisors: SupervisorRoster,
    pub points: PointLedger,
    pub warnings: WarningLog,
    pub prices: PriceBook,
    pub tasks: TaskBoard,
}

impl Registry {
    /// Fail when `login` belongs to an account other than `current`
    fn ensure_login_free(&self, login: &str, current: Option<&str>) -> StoreResult<()> {
        if current == Some(login) {
            return Ok(());
        }
        if self.accounts.by_username(login).is_some() {
            return Err(StoreError::DuplicateLogin(login.to_string()));
        }
        Ok(())
    }

    /// Drop the account of a member who left, unless the login was reused
    fn retire_login(&mut self, login: &str, kept: &str) {
        if login != kept && self.accounts.remove(login) {
            debug!(login = %login, "Removed account");
        }
    }

    // ---- leaders ----

    pub fn appoint_leader(&mut self, hospital: Hospital, draft: LeaderDraft) -> StoreResult<Leader> {
        let current = self.leaders.for_hospital(hospital).map(|l| l.login.clone());
        self.ensure_login_free(&draft.login, current.as_deref())?;
        let password = draft.password.clone().unwrap_or_default();

        let (leader, replaced) = self.leaders.appoint(hospital, draft)?;
        if let Some(previous) = replaced {
            self.retire_login(&previous.login, &leader.login);
        }
        self.accounts.upsert(AccountUpsert {
            username: leader.login.clone(),
            password,
            role: Role::Leader,
            hospital: Some(hospital.into()),
            assigned_hospital: None,
        })?;

        info!(hospital = %hospital, leader_id = leader.id, "Appointed leader");
        Ok(leader)
    }

    pub fn update_leader(
        &mut self,
        hospital: Hospital,
        id: u64,
        draft: LeaderDraft,
    ) -> StoreResult<Leader> {
        let current = self
            .leaders
            .for_hospital(hospital)
            .filter(|l| l.id == id)
            .map(|l| l.login.clone())
            .ok_or(StoreError::NotFound(Entity::Leader))?;
        self.ensure_login_free(&draft.login, Some(&current))?;
        let password = draft.password.clone().filter(|p| !p.is_empty());

        let (leader, previous_login) = self.leaders.update(hospital, id, draft)?;
        self.accounts.rename(&previous_login, &leader.login);
        if let Some(password) = password {
            self.accounts.upsert(AccountUpsert {
                username: leader.login.clone(),
                password,
                role: Role::Leader,
                hospital: Some(hospital.into()),
                assigned_hospital: None,
            })?;
        }
        Ok(leader)
    }

    pub fn remove_leader(&mut self, hospital: Hospital) -> StoreResult<Leader> {
        let leader = self
            .leaders
            .remove(hospital)
            .ok_or(StoreError::NotFound(Entity::Leader))?;
        self.accounts.remove(&leader.login);
        info!(hospital = %hospital, leader_id = leader.id, "Removed leader");
        Ok(leader)
    }

    // ---- supervisors ----

    pub fn create_supervisor(&mut self, draft: SupervisorDraft) -> StoreResult<Supervisor> {
        self.ensure_login_free(&draft.login, None)?;
        let password = draft.password.clone().unwrap_or_default();

        let supervisor = self.supervisors.create(draft)?;
        self.accounts.upsert(AccountUpsert {
            username: supervisor.login.clone(),
            password,
            role: supervisor.kind,
            hospital: None,
            assigned_hospital: Some(supervisor.assigned_hospital),
        })?;

        info!(supervisor_id = supervisor.id, kind = %supervisor.kind, "Created supervisor");
        Ok(supervisor)
    }

    pub fn update_supervisor(&mut self, id: u64, draft: SupervisorDraft) -> StoreResult<Supervisor> {
        let current = self
            .supervisors
            .get(id)
            .map(|s| s.login.clone())
            .ok_or(StoreError::NotFound(Entity::Supervisor))?;
        self.ensure_login_free(&draft.login, Some(&current))?;
        let password = draft.password.clone().filter(|p| !p.is_empty());

        let (supervisor, previous_login) = self.supervisors.update(id, draft)?;
        self.accounts.rename(&previous_login, &supervisor.login);
        match password {
            Some(password) => {
                self.accounts.upsert(AccountUpsert {
                    username: supervisor.login.clone(),
                    password,
                    role: supervisor.kind,
                    hospital: None,
                    assigned_hospital: Some(supervisor.assigned_hospital),
                })?;
            }
            None => self.accounts.reassign(
                &supervisor.login,
                supervisor.kind,
                None,
                Some(supervisor.assigned_hospital),
            ),
        }
        Ok(supervisor)
    }

    pub fn delete_supervisor(&mut self, id: u64) -> StoreResult<Supervisor> {
        let supervisor = self.supervisors.delete(id)?;
        self.accounts.remove(&supervisor.login);
        info!(supervisor_id = id, "Deleted supervisor");
        Ok(supervisor)
    }

    // ---- team ----

    pub fn appoint_deputy(
        &mut self,
        hospital: Hospital,
        position: i64,
        draft: MemberDraft,
    ) -> StoreResult<Deputy> {
        let current = self
            .team
            .deputies(hospital)
            .iter()
            .find(|d| d.position == position)
            .map(|d| d.login.clone());
        self.ensure_login_free(&draft.login, current.as_deref())?;
        let password = draft.password.clone();

        let (deputy, replaced) = self.team.appoint_deputy(hospital, position, draft)?;
        if let Some(previous) = replaced {
            self.retire_login(&previous.login, &deputy.login);
        }
        self.accounts.upsert(AccountUpsert {
            username: deputy.login.clone(),
            password,
            role: Role::Deputy,
            hospital: Some(hospital.into()),
            assigned_hospital: None,
        })?;

        info!(hospital = %hospital, position, "Appointed deputy");
        Ok(deputy)
    }

    pub fn appoint_minister(&mut self, draft: MemberDraft) -> StoreResult<Minister> {
        let current = self.team.minister().map(|m| m.login.clone());
        self.ensure_login_free(&draft.login, current.as_deref())?;
        let password = draft.password.clone();

        let (minister, replaced) = self.team.appoint_minister(draft)?;
        if let Some(previous) = replaced {
            self.retire_login(&previous.login, &minister.login);
        }
        self.accounts.upsert(AccountUpsert {
            username: minister.login.clone(),
            password,
            role: Role::Minister,
            hospital: Some(HospitalScope::Both),
            assigned_hospital: None,
        })?;

        info!(minister_id = minister.id, "Appointed minister");
        Ok(minister)
    }

    /// Remove a deputy; a missing position is not an error
    pub fn remove_deputy(&mut self, hospital: Hospital, position: i64) -> Option<Deputy> {
        let deputy = self.team.remove_deputy(hospital, position)?;
        self.accounts.remove(&deputy.login);
        Some(deputy)
    }

    pub fn remove_minister(&mut self) -> Option<Minister> {
        let minister = self.team.remove_minister()?;
        self.accounts.remove(&minister.login);
        Some(minister)
    }

    pub fn hospital_team(&self, hospital: Hospital) -> HospitalTeam {
        HospitalTeam {
            leader: self.leaders.for_hospital(hospital).cloned(),
            deputies: self.team.deputies(hospital).to_vec(),
        }
    }

    /// Team of one hospital with the minister, or both hospitals
    pub fn team_view(&self, hospital: Option<Hospital>) -> TeamView {
        let minister = self.team.minister().cloned();
        match hospital {
            Some(hospital) => TeamView::Hospital {
                team: self.hospital_team(hospital),
                minister,
            },
            None => TeamView::All {
                ls: self.hospital_team(Hospital::Ls),
                lv: self.hospital_team(Hospital::Lv),
                minister,
            },
        }
    }

    /// Display name of whoever holds this login
    pub fn display_name(&self, login: &str) -> Option<String> {
        if let Some(leader) = self.leaders.by_login(login) {
            return Some(leader.nickname.clone());
        }
        if let Some(name) = self.team.member_name(login) {
            return Some(name.to_string());
        }
        self.supervisors
            .list(&SupervisorFilter::default())
            .into_iter()
            .find(|s| s.login == login)
            .map(|s| s.nickname)
    }
}

/// Shared handle to the registry
#[derive(Debug)]
pub struct Store {
    registry: RwLock<Registry>,
}

impl Store {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry: RwLock::new(registry),
        }
    }

    /// Store holding the start-up data
    pub fn seeded() -> Self {
        Self::new(seed::seeded_registry())
    }

    pub fn empty() -> Self {
        Self::new(Registry::default())
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, Registry> {
        self.registry.read().await
    }

    pub async fn write(&self) -> RwLockWriteGuard<'_, Registry> {
        self.registry.write().await
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::seeded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn leader_draft(login: &str) -> LeaderDraft {
        LeaderDraft {
            nickname: "Новый Лидер".to_string(),
            login: login.to_string(),
            password: Some("newpass".to_string()),
            ..Default::default()
        }
    }

    fn member(login: &str) -> MemberDraft {
        MemberDraft {
            name: "Пётр Сидоров".to_string(),
            vk: None,
            login: login.to_string(),
            password: "newpass".to_string(),
        }
    }

    #[test]
    fn test_appoint_leader_swaps_accounts() {
        let mut registry = seed::seeded_registry();
        let leader = registry
            .appoint_leader(Hospital::Ls, leader_draft("leader_ls_new"))
            .unwrap();

        assert_eq!(registry.leaders.for_hospital(Hospital::Ls), Some(&leader));
        assert!(registry.accounts.by_username("leader_ls").is_none());
        let account = registry.accounts.authenticate("leader_ls_new", "newpass").unwrap();
        assert_eq!(account.role, Role::Leader);
        assert_eq!(account.hospital, Some(HospitalScope::Ls));
    }

    #[test]
    fn test_appoint_leader_cannot_take_admin_login() {
        let mut registry = seed::seeded_registry();
        let err = registry
            .appoint_leader(Hospital::Lv, leader_draft("admin"))
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateLogin(_)));
        assert_eq!(
            registry.leaders.for_hospital(Hospital::Lv).map(|l| l.login.as_str()),
            Some("leader_lv")
        );
    }

    #[test]
    fn test_update_leader_renames_account() {
        let mut registry = seed::seeded_registry();
        let mut draft = leader_draft("ivan_ls");
        draft.password = None;
        registry.update_leader(Hospital::Ls, 1, draft).unwrap();

        assert!(registry.accounts.authenticate("ivan_ls", "password123").is_some());
        assert!(registry.accounts.by_username("leader_ls").is_none());
    }

    #[test]
    fn test_update_leader_password_changes_account_only() {
        let mut registry = seed::seeded_registry();
        let updated = registry
            .update_leader(Hospital::Ls, 1, leader_draft("leader_ls"))
            .unwrap();

        assert!(registry.accounts.authenticate("leader_ls", "newpass").is_some());
        assert!(registry.accounts.authenticate("leader_ls", "password123").is_none());
        let json = serde_json::to_value(&updated).unwrap();
        assert!(json.get("password").is_none());
        assert!(json.get("passwordHash").is_none());
    }

    #[test]
    fn test_update_leader_wrong_hospital_not_found() {
        let mut registry = seed::seeded_registry();
        let err = registry
            .update_leader(Hospital::Ls, 2, leader_draft("leader_ls"))
            .unwrap_err();
        assert_eq!(err, StoreError::NotFound(Entity::Leader));
    }

    #[test]
    fn test_remove_leader() {
        let mut registry = seed::seeded_registry();
        registry.remove_leader(Hospital::Lv).unwrap();
        assert!(registry.accounts.by_username("leader_lv").is_none());
        assert_eq!(
            registry.remove_leader(Hospital::Lv).unwrap_err(),
            StoreError::NotFound(Entity::Leader)
        );
    }

    #[test]
    fn test_deputy_replacement_keeps_one_account() {
        let mut registry = seed::seeded_registry();
        registry.appoint_deputy(Hospital::Ls, 1, member("deputy_new")).unwrap();

        assert!(registry.accounts.by_username("deputy1_ls").is_none());
        assert!(registry.accounts.authenticate("deputy_new", "newpass").is_some());
        assert_eq!(registry.team.deputies(Hospital::Ls).len(), 1);
    }

    #[test]
    fn test_reappoint_minister_same_login() {
        let mut registry = seed::seeded_registry();
        let minister = registry.appoint_minister(member("minister")).unwrap();
        assert_eq!(minister.hospital, HospitalScope::Both);
        assert!(registry.accounts.authenticate("minister", "newpass").is_some());
    }

    #[test]
    fn test_supervisor_lifecycle_syncs_accounts() {
        let mut registry = seed::seeded_registry();
        let supervisor = registry
            .create_supervisor(SupervisorDraft {
                nickname: "Supervisor_New".to_string(),
                kind: Role::Supervisor,
                login: "supervisor_new".to_string(),
                password: Some("pass".to_string()),
                vk: None,
                assigned_hospital: HospitalScope::Lv,
            })
            .unwrap();
        let account = registry.accounts.authenticate("supervisor_new", "pass").unwrap();
        assert_eq!(account.assigned_hospital, Some(HospitalScope::Lv));

        registry.delete_supervisor(supervisor.id).unwrap();
        assert!(registry.accounts.by_username("supervisor_new").is_none());
    }

    #[test]
    fn test_team_view_shapes() {
        let registry = seed::seeded_registry();
        let json = serde_json::to_value(registry.team_view(Some(Hospital::Ls))).unwrap();
        assert_eq!(json["leader"]["login"], "leader_ls");
        assert_eq!(json["deputies"][0]["position"], 1);
        assert_eq!(json["minister"]["hospital"], "both");
        assert!(json["leader"].get("passwordHash").is_none());

        let json = serde_json::to_value(registry.team_view(None)).unwrap();
        assert_eq!(json["lv"]["leader"]["nickname"], "Мария Козлова");
        assert_eq!(json["minister"]["name"], "Елена Смирнова");
    }

    #[test]
    fn test_display_name_lookup() {
        let registry = seed::seeded_registry();
        assert_eq!(registry.display_name("leader_ls").as_deref(), Some("Иван Петров"));
        assert_eq!(registry.display_name("minister").as_deref(), Some("Елена Смирнова"));
        assert_eq!(registry.display_name("supervisor_lv").as_deref(), Some("Supervisor_LV"));
        assert!(registry.display_name("nobody").is_none());
    }

    #[tokio::test]
    async fn test_concurrent_awards_are_not_lost() {
        let store = Arc::new(Store::empty());
        let mut handles = Vec::new();

        for i in 0..20 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                let mut registry = store.write().await;
                registry
                    .points
                    .award(
                        Subject {
                            user_id: 2,
                            user_role: Role::Leader,
                            user_hospital: Some(HospitalScope::Ls),
                            user_name: "Иван Петров".to_string(),
                        },
                        1,
                        format!("Задача {}", i),
                        &Actor::anonymous(),
                    )
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let registry = store.read().await;
        let entries = registry.points.list(&SubjectFilter::default());
        assert_eq!(entries.len(), 20);
        let mut ids: Vec<u64> = entries.iter().map(|e| e.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 20);
    }
}
