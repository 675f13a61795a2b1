//! Core types shared by every collection in the store
//!
//! - `Hospital` / `HospitalScope`: the two in-game branches and assignments
//!   that may span both
//! - `Role`: staff ranks, with the Russian display names used on dashboards
//! - id and date helpers

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::store::error::StoreError;

/// One of the two hospitals the organization operates
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Hospital {
    /// Los-Santos
    Ls,
    /// Las-Venturas
    Lv,
}

impl Hospital {
    pub fn as_str(&self) -> &'static str {
        match self {
            Hospital::Ls => "ls",
            Hospital::Lv => "lv",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Hospital::Ls => "Los-Santos",
            Hospital::Lv => "Las-Venturas",
        }
    }
}

impl fmt::Display for Hospital {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Hospital {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ls" => Ok(Hospital::Ls),
            "lv" => Ok(Hospital::Lv),
            _ => Err(StoreError::invalid("Неверная больница")),
        }
    }
}

/// A hospital assignment that may cover both branches
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum HospitalScope {
    Ls,
    Lv,
    Both,
}

impl HospitalScope {
    /// Whether this assignment covers the given hospital
    pub fn covers(&self, hospital: Hospital) -> bool {
        matches!(
            (self, hospital),
            (HospitalScope::Both, _)
                | (HospitalScope::Ls, Hospital::Ls)
                | (HospitalScope::Lv, Hospital::Lv)
        )
    }

    /// The single hospital, if the scope is not `both`
    pub fn hospital(&self) -> Option<Hospital> {
        match self {
            HospitalScope::Ls => Some(Hospital::Ls),
            HospitalScope::Lv => Some(Hospital::Lv),
            HospitalScope::Both => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HospitalScope::Ls => "ls",
            HospitalScope::Lv => "lv",
            HospitalScope::Both => "both",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            HospitalScope::Ls => Hospital::Ls.display_name(),
            HospitalScope::Lv => Hospital::Lv.display_name(),
            HospitalScope::Both => "Обе больницы",
        }
    }
}

impl From<Hospital> for HospitalScope {
    fn from(hospital: Hospital) -> Self {
        match hospital {
            Hospital::Ls => HospitalScope::Ls,
            Hospital::Lv => HospitalScope::Lv,
        }
    }
}

impl fmt::Display for HospitalScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HospitalScope {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ls" => Ok(HospitalScope::Ls),
            "lv" => Ok(HospitalScope::Lv),
            "both" => Ok(HospitalScope::Both),
            _ => Err(StoreError::invalid("Неверная больница")),
        }
    }
}

/// Staff rank
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    MainSupervisor,
    DeputyMainSupervisor,
    Supervisor,
    Leader,
    Minister,
    Deputy,
    User,
}

impl Role {
    pub fn all() -> &'static [Role] {
        &[
            Role::MainSupervisor,
            Role::DeputyMainSupervisor,
            Role::Supervisor,
            Role::Leader,
            Role::Minister,
            Role::Deputy,
            Role::User,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::MainSupervisor => "main_supervisor",
            Role::DeputyMainSupervisor => "deputy_main_supervisor",
            Role::Supervisor => "supervisor",
            Role::Leader => "leader",
            Role::Minister => "minister",
            Role::Deputy => "deputy",
            Role::User => "user",
        }
    }

    /// Rank title shown on dashboards
    pub fn display_name(&self) -> &'static str {
        match self {
            Role::MainSupervisor => "Главный следящий МЗ",
            Role::DeputyMainSupervisor => "Заместитель главного следящего",
            Role::Supervisor => "Следящий",
            Role::Leader => "Лидер",
            Role::Minister => "Министр",
            Role::Deputy => "Заместитель",
            Role::User => "Сотрудник",
        }
    }

    /// Whether the role is one of the supervisor ranks
    pub fn is_supervisor(&self) -> bool {
        matches!(
            self,
            Role::MainSupervisor | Role::DeputyMainSupervisor | Role::Supervisor
        )
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::all()
            .iter()
            .copied()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| StoreError::invalid("Неверная роль"))
    }
}

/// Who performed a mutation, recorded in audit fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: Option<u64>,
    /// Role tag stored in `*By` fields (e.g. "admin", "minister")
    pub role: Option<String>,
    pub name: Option<String>,
}

impl Actor {
    pub fn new(id: u64, role: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            role: Some(role.into()),
            name: Some(name.into()),
        }
    }

    pub fn anonymous() -> Self {
        Self {
            id: None,
            role: None,
            name: None,
        }
    }
}

/// Next id for a collection: max + 1, or 1 when empty
pub fn next_id(ids: impl Iterator<Item = u64>) -> u64 {
    ids.max().map_or(1, |max| max + 1)
}

/// Today's date in the `YYYY-MM-DD` form used by every record
pub fn today() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hospital() {
        assert_eq!("ls".parse::<Hospital>().unwrap(), Hospital::Ls);
        assert_eq!("lv".parse::<Hospital>().unwrap(), Hospital::Lv);
        assert!("both".parse::<Hospital>().is_err());
        assert!("LS".parse::<Hospital>().is_err());
    }

    #[test]
    fn test_scope_covers() {
        assert!(HospitalScope::Both.covers(Hospital::Ls));
        assert!(HospitalScope::Both.covers(Hospital::Lv));
        assert!(HospitalScope::Ls.covers(Hospital::Ls));
        assert!(!HospitalScope::Ls.covers(Hospital::Lv));
    }

    #[test]
    fn test_role_round_trip_names() {
        for role in Role::all() {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), *role);
        }
        assert!("admin".parse::<Role>().is_err());
        assert_eq!(Role::Minister.display_name(), "Министр");
    }

    #[test]
    fn test_role_serde_matches_as_str() {
        let json = serde_json::to_string(&Role::DeputyMainSupervisor).unwrap();
        assert_eq!(json, "\"deputy_main_supervisor\"");
    }

    #[test]
    fn test_next_id() {
        assert_eq!(next_id(std::iter::empty()), 1);
        assert_eq!(next_id([3, 1, 7].into_iter()), 8);
    }

    #[test]
    fn test_today_format() {
        let date = today();
        assert_eq!(date.len(), 10);
        assert!(chrono::NaiveDate::parse_from_str(&date, "%Y-%m-%d").is_ok());
    }
}
