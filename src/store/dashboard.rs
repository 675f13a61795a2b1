//! Per-rank dashboard summary

use serde::Serialize;

use crate::auth::policy::Permission;
use crate::store::points::{PointEntry, PointLedger, SubjectFilter};
use crate::store::tasks::TaskSubmission;
use crate::store::team::TeamView;
use crate::store::types::{HospitalScope, Role};
use crate::store::warnings::Warning;
use crate::store::Registry;

/// Who the dashboard is for
#[derive(Debug, Clone)]
pub struct Viewer {
    pub id: u64,
    pub username: String,
    pub role: Role,
    pub scope: Option<HospitalScope>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Panel {
    Admin,
    Minister,
    Points,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardUser {
    pub id: u64,
    pub username: String,
    pub name: Option<String>,
    pub role: Role,
    pub role_name: &'static str,
    pub hospital: Option<HospitalScope>,
    pub hospital_name: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PointsSummary {
    pub total: i64,
    pub entries: Vec<PointEntry>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingCounts {
    pub price_requests: usize,
    pub submissions: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub user: DashboardUser,
    pub panels: Vec<Panel>,
    pub team: TeamView,
    pub points: PointsSummary,
    pub warnings: Vec<Warning>,
    pub submissions: Vec<TaskSubmission>,
    /// Review queues, only shown to administrators
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending: Option<PendingCounts>,
}

impl Registry {
    pub fn dashboard(&self, viewer: &Viewer) -> Dashboard {
        let role = viewer.role;
        let admin = role.allows(Permission::Administer);

        let mut panels = Vec::new();
        if admin {
            panels.push(Panel::Admin);
        }
        if role == Role::Minister {
            panels.push(Panel::Minister);
        }
        if role.allows(Permission::SubmitTasks) {
            panels.push(Panel::Points);
        }

        let own = SubjectFilter {
            user_id: Some(viewer.id),
            ..Default::default()
        };
        let entries = self.points.list(&own);

        Dashboard {
            user: DashboardUser {
                id: viewer.id,
                username: viewer.username.clone(),
                name: self.display_name(&viewer.username),
                role,
                role_name: role.display_name(),
                hospital: viewer.scope,
                hospital_name: viewer.scope.map(|s| s.display_name()),
            },
            panels,
            team: self.team_view(viewer.scope.and_then(|s| s.hospital())),
            points: PointsSummary {
                total: PointLedger::total(&entries),
                entries,
            },
            warnings: self.warnings.list(&own),
            submissions: self.tasks.submissions(Some(viewer.id)),
            pending: admin.then(|| PendingCounts {
                price_requests: self.prices.pending_count(),
                submissions: self.tasks.pending_submissions(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::seed::seeded_registry;

    fn viewer(id: u64, username: &str, role: Role, scope: HospitalScope) -> Viewer {
        Viewer {
            id,
            username: username.to_string(),
            role,
            scope: Some(scope),
        }
    }

    #[test]
    fn test_admin_dashboard() {
        let registry = seeded_registry();
        let dashboard = registry.dashboard(&viewer(1, "admin", Role::MainSupervisor, HospitalScope::Both));

        assert_eq!(dashboard.panels, vec![Panel::Admin]);
        assert_eq!(dashboard.user.role_name, "Главный следящий МЗ");
        assert_eq!(dashboard.user.hospital_name, Some("Обе больницы"));
        let pending = dashboard.pending.unwrap();
        assert_eq!(pending.price_requests, 0);
        assert_eq!(pending.submissions, 1);
        assert!(matches!(dashboard.team, TeamView::All { .. }));
    }

    #[test]
    fn test_leader_dashboard() {
        let registry = seeded_registry();
        let dashboard = registry.dashboard(&viewer(2, "leader_ls", Role::Leader, HospitalScope::Ls));

        assert_eq!(dashboard.panels, vec![Panel::Points]);
        assert_eq!(dashboard.user.name.as_deref(), Some("Иван Петров"));
        assert_eq!(dashboard.points.total, 25);
        assert_eq!(dashboard.points.entries.len(), 3);
        assert!(dashboard.pending.is_none());
        assert!(matches!(dashboard.team, TeamView::Hospital { .. }));

        let json = serde_json::to_value(&dashboard).unwrap();
        assert!(json.get("pending").is_none());
        assert_eq!(json["user"]["hospitalName"], "Los-Santos");
    }

    #[test]
    fn test_minister_panels() {
        let registry = seeded_registry();
        let dashboard = registry.dashboard(&viewer(4, "minister", Role::Minister, HospitalScope::Both));
        assert_eq!(dashboard.panels, vec![Panel::Minister, Panel::Points]);
    }
}
