//! Which ranks may perform which operations

use crate::store::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// Manage staff, accounts, prices and reviews
    Administer,
    AppointDeputy,
    ProposePrices,
    IssueWarnings,
    AddAntiblat,
    SubmitTasks,
}

impl Role {
    pub fn allows(&self, permission: Permission) -> bool {
        let admin = self.is_supervisor();
        match permission {
            Permission::Administer => admin,
            Permission::AppointDeputy => admin || *self == Role::Leader,
            Permission::ProposePrices => *self == Role::Minister,
            Permission::IssueWarnings => admin || *self == Role::Minister,
            Permission::AddAntiblat => admin || matches!(self, Role::Leader | Role::Deputy),
            Permission::SubmitTasks => {
                matches!(self, Role::Leader | Role::Minister | Role::Deputy)
            }
        }
    }
}
