//! Login directory
//!
//! Every staff member who can sign in has an `Account`. Appointing leaders,
//! supervisors, deputies and ministers registers their login here.

use serde::Serialize;

use crate::auth::password::{hash_password, verify_password};
use crate::store::error::{StoreError, StoreResult};
use crate::store::types::{next_id, HospitalScope, Role};

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: u64,
    pub username: String,
    #[serde(skip)]
    pub password_hash: String,
    pub role: Role,
    /// Hospital of leaders, deputies and the minister
    pub hospital: Option<HospitalScope>,
    /// Hospital a supervisor is assigned to watch
    pub assigned_hospital: Option<HospitalScope>,
}

/// Fields for creating or updating an account by username
#[derive(Debug, Clone)]
pub struct AccountUpsert {
    pub username: String,
    pub password: String,
    pub role: Role,
    pub hospital: Option<HospitalScope>,
    pub assigned_hospital: Option<HospitalScope>,
}

#[derive(Debug, Default)]
pub struct AccountDirectory {
    accounts: Vec<Account>,
}

impl AccountDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Find the account matching both username and password
    pub fn authenticate(&self, username: &str, password: &str) -> Option<&Account> {
        self.accounts
            .iter()
            .find(|a| a.username == username && verify_password(password, &a.password_hash))
    }

    pub fn by_username(&self, username: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.username == username)
    }

    pub fn all(&self) -> &[Account] {
        &self.accounts
    }

    /// Update the account with this username, or create it.
    ///
    /// On update, hospital assignments are only replaced when given.
    pub fn upsert(&mut self, req: AccountUpsert) -> StoreResult<Account> {
        if req.username.trim().is_empty() || req.password.is_empty() {
            return Err(StoreError::invalid("Не указан логин или пароль"));
        }

        let password_hash = hash_password(&req.password)
            .map_err(|err| StoreError::PasswordHash(err.to_string()))?;

        if let Some(existing) = self.accounts.iter_mut().find(|a| a.username == req.username) {
            existing.password_hash = password_hash;
            existing.role = req.role;
            if req.hospital.is_some() {
                existing.hospital = req.hospital;
            }
            if req.assigned_hospital.is_some() {
                existing.assigned_hospital = req.assigned_hospital;
            }
            return Ok(existing.clone());
        }

        let account = Account {
            id: next_id(self.accounts.iter().map(|a| a.id)),
            username: req.username,
            password_hash,
            role: req.role,
            hospital: req.hospital,
            assigned_hospital: req.assigned_hospital,
        };
        self.accounts.push(account.clone());
        Ok(account)
    }

    /// Move an account to a new login, keeping its password
    pub fn rename(&mut self, from: &str, to: &str) -> bool {
        match self.accounts.iter_mut().find(|a| a.username == from) {
            Some(account) => {
                account.username = to.to_string();
                true
            }
            None => false,
        }
    }

    /// Change role and hospitals without touching the password
    pub fn reassign(
        &mut self,
        username: &str,
        role: Role,
        hospital: Option<HospitalScope>,
        assigned_hospital: Option<HospitalScope>,
    ) {
        if let Some(account) = self.accounts.iter_mut().find(|a| a.username == username) {
            account.role = role;
            account.hospital = hospital;
            account.assigned_hospital = assigned_hospital;
        }
    }

    /// Drop the login; returns whether it existed
    pub fn remove(&mut self, username: &str) -> bool {
        let before = self.accounts.len();
        self.accounts.retain(|a| a.username != username);
        self.accounts.len() != before
    }

    /// Insert a seed account with a fixed id and a precomputed hash
    pub(crate) fn insert_seed(
        &mut self,
        id: u64,
        username: &str,
        password_hash: &str,
        role: Role,
        hospital: Option<HospitalScope>,
        assigned_hospital: Option<HospitalScope>,
    ) {
        self.accounts.push(Account {
            id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            role,
            hospital,
            assigned_hospital,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upsert(username: &str, password: &str, role: Role) -> AccountUpsert {
        AccountUpsert {
            username: username.to_string(),
            password: password.to_string(),
            role,
            hospital: None,
            assigned_hospital: None,
        }
    }

    #[test]
    fn test_create_and_authenticate() {
        let mut dir = AccountDirectory::new();
        let account = dir.upsert(upsert("leader_ls", "secret", Role::Leader)).unwrap();
        assert_eq!(account.id, 1);

        assert!(dir.authenticate("leader_ls", "secret").is_some());
        assert!(dir.authenticate("leader_ls", "wrong").is_none());
        assert!(dir.authenticate("nobody", "secret").is_none());
    }

    #[test]
    fn test_upsert_updates_existing() {
        let mut dir = AccountDirectory::new();
        let mut req = upsert("deputy1", "one", Role::Deputy);
        req.hospital = Some(HospitalScope::Ls);
        dir.upsert(req).unwrap();

        let updated = dir.upsert(upsert("deputy1", "two", Role::Leader)).unwrap();
        assert_eq!(updated.id, 1);
        assert_eq!(updated.role, Role::Leader);
        // Hospital kept when not given
        assert_eq!(updated.hospital, Some(HospitalScope::Ls));
        assert!(dir.authenticate("deputy1", "two").is_some());
        assert!(dir.authenticate("deputy1", "one").is_none());
        assert_eq!(dir.all().len(), 1);
    }

    #[test]
    fn test_upsert_requires_credentials() {
        let mut dir = AccountDirectory::new();
        assert!(dir.upsert(upsert("", "x", Role::User)).is_err());
        assert!(dir.upsert(upsert("x", "", Role::User)).is_err());
    }

    #[test]
    fn test_password_never_serialized() {
        let mut dir = AccountDirectory::new();
        let account = dir.upsert(upsert("admin", "admin123", Role::MainSupervisor)).unwrap();
        let json = serde_json::to_value(&account).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["role"], "main_supervisor");
    }

    #[test]
    fn test_rename_keeps_password() {
        let mut dir = AccountDirectory::new();
        dir.upsert(upsert("leader_ls", "secret", Role::Leader)).unwrap();
        assert!(dir.rename("leader_ls", "leader_ls2"));
        assert!(dir.authenticate("leader_ls2", "secret").is_some());
        assert!(dir.by_username("leader_ls").is_none());
        assert!(!dir.rename("missing", "x"));
    }

    #[test]
    fn test_remove() {
        let mut dir = AccountDirectory::new();
        dir.upsert(upsert("a", "b", Role::User)).unwrap();
        assert!(dir.remove("a"));
        assert!(!dir.remove("a"));
    }
}
